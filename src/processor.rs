//! Output processing boundary.
//!
//! Before serialization the engine hands the repository to an
//! [`OutputProcessor`], which returns the view that actually gets rendered.
//! The engine is agnostic to the processor's policy and treats its output as
//! the authoritative set of rows.

use crate::error::Error;
use crate::types::{Repository, Row, Section};

/// Produces the repository view rendered for one target language.
pub trait OutputProcessor {
    fn process(&self, repo: &Repository, lang: &str) -> Result<Repository, Error>;
}

/// Renders the repository as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl OutputProcessor for Passthrough {
    fn process(&self, repo: &Repository, _lang: &str) -> Result<Repository, Error> {
        Ok(repo.clone())
    }
}

/// Keeps only rows carrying at least one of the requested tags.
#[derive(Debug, Clone, Default)]
pub struct TagFilter {
    tags: Vec<String>,
    include_untagged: bool,
}

impl TagFilter {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TagFilter {
            tags: tags.into_iter().map(Into::into).collect(),
            include_untagged: false,
        }
    }

    /// Also keep rows that carry no tags at all.
    pub fn with_untagged(mut self, include_untagged: bool) -> Self {
        self.include_untagged = include_untagged;
        self
    }

    fn includes(&self, row: &Row) -> bool {
        if row.tags.is_empty() {
            return self.include_untagged;
        }
        row.tags.iter().any(|tag| self.tags.contains(tag))
    }
}

impl OutputProcessor for TagFilter {
    fn process(&self, repo: &Repository, _lang: &str) -> Result<Repository, Error> {
        let mut out = Repository::new();
        for lang in repo.languages() {
            out.add_language(lang);
        }
        for section in repo.sections() {
            let rows: Vec<Row> = section
                .rows()
                .iter()
                .filter(|row| self.includes(row))
                .cloned()
                .collect();
            out.add_section(Section::with_rows(section.name.as_str(), rows))?;
        }
        Ok(out)
    }
}
