//! Built-in format plugins.
//!
//! Each plugin implements [`crate::traits::Formatter`]; [`FormatType`]
//! selects one at configuration time.

pub mod android;
pub mod strings;

use std::fmt::{self, Display};
use std::str::FromStr;

pub use android::AndroidFormat;
pub use strings::AppleStringsFormat;

use crate::error::Error;
use crate::traits::Formatter;

/// All built-in formats, for generic configuration-time handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// Apple `.strings` format.
    Strings,
    /// Android `strings.xml` format.
    Android,
}

impl FormatType {
    /// Returns the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Strings => "strings",
            FormatType::Android => "xml",
        }
    }

    /// Constructs the plugin for this format.
    pub fn formatter(&self) -> Box<dyn Formatter> {
        match self {
            FormatType::Strings => Box::new(AppleStringsFormat::new()),
            FormatType::Android => Box::new(AndroidFormat::new()),
        }
    }
}

impl Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatType::Strings => write!(f, "strings"),
            FormatType::Android => write!(f, "android"),
        }
    }
}

impl FromStr for FormatType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "strings" | "apple" => Ok(FormatType::Strings),
            "android" | "androidstrings" | "xml" => Ok(FormatType::Android),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}
