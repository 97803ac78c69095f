//! All error types for the langweave crate.
//!
//! These are returned from all fallible operations (parsing, merging,
//! rendering, writing).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown format `{0}`")]
    UnknownFormat(String),

    #[error("{}", parse_message(.path, .line, .message))]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        message: String,
    },

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("duplicate key `{0}`")]
    DuplicateKey(String),

    #[error("no languages found at {}", .path.display())]
    NoLanguagesFound { path: PathBuf },

    #[error("format `{format}` does not implement `{operation}`")]
    Unimplemented {
        format: &'static str,
        operation: &'static str,
    },
}

fn parse_message(path: &std::path::Path, line: &Option<usize>, message: &str) -> String {
    match line {
        Some(line) => format!("parse error in {} (line {}): {}", path.display(), line, message),
        None => format!("parse error in {}: {}", path.display(), message),
    }
}

impl Error {
    /// Creates a parse error tied to a file, without line information.
    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            line: None,
            message: message.into(),
        }
    }

    /// Creates a parse error tied to a file and line.
    pub fn parse_error_at(
        path: impl Into<PathBuf>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Error::Parse {
            path: path.into(),
            line: Some(line),
            message: message.into(),
        }
    }
}
