//! Merge engine: reconciles parsed input against the repository.
//!
//! This module is the only mutation path into a [`Repository`] after
//! construction. Format plugins feed parsed key/value pairs through
//! [`MergeEngine::set_translation_for_key`] and
//! [`MergeEngine::set_comment_for_key`]; non-fatal conditions accumulate in
//! a [`MergeReport`] and never abort the merge.

use serde::{Deserialize, Serialize};

use crate::types::{Repository, Row, Section};

/// Section that collects keys discovered during a consume-all merge.
pub const DEFAULT_DISCOVERY_SECTION: &str = "Uncategorized";

/// Options controlling merge behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    /// Create rows for keys the repository does not know yet.
    pub consume_all: bool,
    /// Forward comments from input files (consulted by plugin readers).
    pub consume_comments: bool,
    /// Tags attached to every row created by a consume-all merge.
    pub default_tags: Vec<String>,
    /// Name of the section newly discovered rows are placed in.
    pub discovery_section: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            consume_all: false,
            consume_comments: false,
            default_tags: Vec::new(),
            discovery_section: DEFAULT_DISCOVERY_SECTION.to_string(),
        }
    }
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_consume_all(mut self, consume_all: bool) -> Self {
        self.consume_all = consume_all;
        self
    }

    pub fn with_consume_comments(mut self, consume_comments: bool) -> Self {
        self.consume_comments = consume_comments;
        self
    }

    pub fn with_default_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Issue type captured during a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeIssueKind {
    /// Key absent from the repository with auto-create disabled.
    UnknownKey,
    /// Key absent from the repository, created by a consume-all merge.
    AddedKey,
}

/// Per-key merge issue details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeIssue {
    pub kind: MergeIssueKind,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub language: Option<String>,
}

/// Merge report with counters and issues.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MergeReport {
    pub updated: usize,
    pub added: usize,
    pub suppressed: usize,
    pub unknown: usize,
    pub comments_updated: usize,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub issues: Vec<MergeIssue>,
}

/// Applies translations and comments from one input file to a repository.
pub struct MergeEngine<'a> {
    repo: &'a mut Repository,
    options: MergeOptions,
    report: MergeReport,
}

impl<'a> MergeEngine<'a> {
    pub fn new(repo: &'a mut Repository, options: MergeOptions) -> Self {
        MergeEngine {
            repo,
            options,
            report: MergeReport::default(),
        }
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    pub fn report(&self) -> &MergeReport {
        &self.report
    }

    /// Consumes the engine and returns the accumulated report.
    pub fn finish(self) -> MergeReport {
        self.report
    }

    /// Sets the translation of `key` for `lang`.
    ///
    /// Existing rows are updated unless their reference row already holds an
    /// identical translation for `lang`; that write is suppressed so an
    /// inherited value never turns into a spurious divergent entry. Unknown
    /// keys are created in the discovery section when `consume_all` is on,
    /// and reported as warnings otherwise. The language code is registered
    /// in every case, including suppressed and unknown-key calls.
    pub fn set_translation_for_key(&mut self, key: &str, lang: &str, value: &str) {
        // Values keep literal \n sequences, never raw newlines.
        let value = value.replace('\n', "\\n");

        if self.repo.contains_key(key) {
            let inherited = self
                .reference_translation(key, lang)
                .is_some_and(|reference_value| reference_value == value);
            if inherited {
                self.report.suppressed += 1;
            } else if let Some(row) = self.repo.row_mut(key) {
                row.translations.insert(lang.to_string(), value);
                self.report.updated += 1;
            }
        } else if self.options.consume_all {
            let section_idx = match self.repo.section_position(&self.options.discovery_section) {
                Some(idx) => idx,
                None => {
                    self.repo
                        .insert_section_front(Section::new(&self.options.discovery_section));
                    0
                }
            };
            let mut row = Row::new(key);
            row.tags = self.options.default_tags.clone();
            row.translations.insert(lang.to_string(), value);
            self.repo.push_row(section_idx, row);

            self.report.added += 1;
            self.report.issues.push(MergeIssue {
                kind: MergeIssueKind::AddedKey,
                key: key.to_string(),
                language: Some(lang.to_string()),
            });
        } else {
            self.report.unknown += 1;
            self.report.issues.push(MergeIssue {
                kind: MergeIssueKind::UnknownKey,
                key: key.to_string(),
                language: Some(lang.to_string()),
            });
        }

        self.repo.add_language(lang);
    }

    /// Sets the comment of `key`, unless the row's reference row already
    /// carries an identical comment. Unknown keys are reported and skipped.
    pub fn set_comment_for_key(&mut self, key: &str, comment: &str) {
        if !self.repo.contains_key(key) {
            self.report.unknown += 1;
            self.report.issues.push(MergeIssue {
                kind: MergeIssueKind::UnknownKey,
                key: key.to_string(),
                language: None,
            });
            return;
        }

        let inherited = self
            .reference_comment(key)
            .is_some_and(|reference_comment| reference_comment == comment);
        if inherited {
            self.report.suppressed += 1;
        } else if let Some(row) = self.repo.row_mut(key) {
            row.comment = Some(comment.to_string());
            self.report.comments_updated += 1;
        }
    }

    // One hop only: divergence is judged against the referenced row's own
    // values, while render-time lookup resolves the full chain.
    fn reference_translation(&self, key: &str, lang: &str) -> Option<String> {
        let row = self.repo.row(key)?;
        let reference = self.repo.row(row.reference_key.as_deref()?)?;
        reference.translation(lang).map(str::to_string)
    }

    fn reference_comment(&self, key: &str) -> Option<String> {
        let row = self.repo.row(key)?;
        let reference = self.repo.row(row.reference_key.as_deref()?)?;
        reference.comment.clone()
    }
}
