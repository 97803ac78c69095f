//! Core, format-agnostic types for langweave.
//! Format plugins populate these through the merge engine; the render
//! pipeline and directory writer serialize them back out.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

use crate::error::Error;

/// Location of a row inside the section list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowId {
    section: usize,
    row: usize,
}

/// The canonical multi-language string store.
///
/// Owns an ordered list of [`Section`]s and the insertion-ordered set of
/// language codes it knows about. Row keys are unique repository-wide; a
/// flat key index is maintained alongside the section list.
///
/// After construction the repository is read-only to callers; the only
/// mutation path is [`crate::merge::MergeEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "RepositorySnapshot", try_from = "RepositorySnapshot")]
pub struct Repository {
    sections: Vec<Section>,
    languages: Vec<String>,
    index: HashMap<String, RowId>,
}

impl Repository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Repository {
            sections: Vec::new(),
            languages: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Appends a section, indexing its rows.
    ///
    /// Fails with [`Error::DuplicateKey`] if any row key is already present,
    /// either in the repository or twice within the incoming section.
    pub fn add_section(&mut self, section: Section) -> Result<(), Error> {
        let mut seen = std::collections::HashSet::new();
        for row in &section.rows {
            if self.index.contains_key(&row.key) || !seen.insert(row.key.as_str()) {
                return Err(Error::DuplicateKey(row.key.clone()));
            }
        }

        let section_idx = self.sections.len();
        for (row_idx, row) in section.rows.iter().enumerate() {
            self.index.insert(
                row.key.clone(),
                RowId {
                    section: section_idx,
                    row: row_idx,
                },
            );
        }
        self.sections.push(section);
        Ok(())
    }

    /// Registers a language code if it is not yet known.
    /// Insertion order determines output iteration order.
    pub fn add_language(&mut self, code: &str) {
        if !self.languages.iter().any(|l| l == code) {
            self.languages.push(code.to_string());
        }
    }

    /// All known language codes, in registration order.
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// All sections, in order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Looks up a row by key anywhere in the repository.
    pub fn row(&self, key: &str) -> Option<&Row> {
        let id = *self.index.get(key)?;
        self.sections.get(id.section)?.rows.get(id.row)
    }

    /// Whether a row with this key exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Total number of rows across all sections.
    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    /// Resolves a row's translation for `lang`, following its reference
    /// chain when the row itself has no entry for that language.
    pub fn resolved_translation<'a>(&'a self, row: &'a Row, lang: &str) -> Option<&'a str> {
        let mut current = row;
        let mut hops = 0usize;
        loop {
            if let Some(value) = current.translation(lang) {
                return Some(value);
            }
            let reference = current.reference_key.as_deref()?;
            current = self.row(reference)?;
            hops += 1;
            // Reference chains are expected to be short; this bounds cycles.
            if hops > self.index.len() {
                return None;
            }
        }
    }

    /// Resolves a row's comment, following its reference chain.
    pub fn resolved_comment<'a>(&'a self, row: &'a Row) -> Option<&'a str> {
        let mut current = row;
        let mut hops = 0usize;
        loop {
            if let Some(comment) = current.comment.as_deref() {
                return Some(comment);
            }
            let reference = current.reference_key.as_deref()?;
            current = self.row(reference)?;
            hops += 1;
            if hops > self.index.len() {
                return None;
            }
        }
    }

    /// Matches a candidate code against the known languages, returning the
    /// known code. Tries an exact match first, then a base-language match
    /// (`en-US` matches a repository tracking `en`).
    pub fn match_language(&self, candidate: &str) -> Option<&str> {
        if let Some(known) = self.languages.iter().find(|l| l.as_str() == candidate) {
            return Some(known);
        }
        let target: LanguageIdentifier = candidate.parse().ok()?;
        self.languages
            .iter()
            .find(|known| {
                known
                    .parse::<LanguageIdentifier>()
                    .map(|k| k.language == target.language)
                    .unwrap_or(false)
            })
            .map(String::as_str)
    }

    /// Reads a JSON snapshot from any reader.
    pub fn from_reader<R: std::io::BufRead>(reader: R) -> Result<Self, Error> {
        serde_json::from_reader(reader).map_err(Error::Snapshot)
    }

    /// Writes a JSON snapshot to any writer.
    pub fn to_writer<W: std::io::Write>(&self, mut writer: W) -> Result<(), Error> {
        serde_json::to_writer(&mut writer, self).map_err(Error::Snapshot)
    }

    pub(crate) fn row_mut(&mut self, key: &str) -> Option<&mut Row> {
        let id = *self.index.get(key)?;
        self.sections.get_mut(id.section)?.rows.get_mut(id.row)
    }

    pub(crate) fn section_position(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.name == name)
    }

    /// Inserts a section at the front of the section list, shifting the
    /// index of every existing row. Caller ensures its row keys are fresh.
    pub(crate) fn insert_section_front(&mut self, section: Section) {
        for id in self.index.values_mut() {
            id.section += 1;
        }
        for (row_idx, row) in section.rows.iter().enumerate() {
            debug_assert!(!self.index.contains_key(&row.key));
            self.index.insert(
                row.key.clone(),
                RowId {
                    section: 0,
                    row: row_idx,
                },
            );
        }
        self.sections.insert(0, section);
    }

    /// Appends a row to an existing section. Caller ensures the key is fresh.
    pub(crate) fn push_row(&mut self, section_idx: usize, row: Row) {
        debug_assert!(!self.index.contains_key(&row.key));
        let rows = &mut self.sections[section_idx].rows;
        self.index.insert(
            row.key.clone(),
            RowId {
                section: section_idx,
                row: rows.len(),
            },
        );
        rows.push(row);
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialized shape of a [`Repository`]; the key index is rebuilt (and the
/// unique-key invariant revalidated) on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RepositorySnapshot {
    #[serde(default)]
    languages: Vec<String>,
    #[serde(default)]
    sections: Vec<Section>,
}

impl From<Repository> for RepositorySnapshot {
    fn from(repo: Repository) -> Self {
        RepositorySnapshot {
            languages: repo.languages,
            sections: repo.sections,
        }
    }
}

impl TryFrom<RepositorySnapshot> for Repository {
    type Error = Error;

    fn try_from(snapshot: RepositorySnapshot) -> Result<Self, Self::Error> {
        let mut repo = Repository::new();
        for lang in &snapshot.languages {
            repo.add_language(lang);
        }
        for section in snapshot.sections {
            repo.add_section(section)?;
        }
        Ok(repo)
    }
}

/// A named group of rows. The name may be empty for the default section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    rows: Vec<Row>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Section {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn with_rows(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Section {
            name: name.into(),
            rows,
        }
    }

    /// Appends a row. Only usable while the section is still outside a
    /// repository; key uniqueness is checked when the section is added.
    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

/// One translatable key with its per-language translations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Unique key across the whole repository.
    pub key: String,

    /// Language code → translated string.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    #[serde(default)]
    pub translations: BTreeMap<String, String>,

    /// Optional free-text comment for translators.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub comment: Option<String>,

    /// Ordered tags used by output processors for row selection.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub tags: Vec<String>,

    /// Key of another row whose translations and comment this row inherits
    /// unless it explicitly diverges.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub reference_key: Option<String>,
}

impl Row {
    pub fn new(key: impl Into<String>) -> Self {
        Row {
            key: key.into(),
            translations: BTreeMap::new(),
            comment: None,
            tags: Vec::new(),
            reference_key: None,
        }
    }

    pub fn with_translation(mut self, lang: &str, value: &str) -> Self {
        self.translations.insert(lang.to_string(), value.to_string());
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reference(mut self, reference_key: &str) -> Self {
        self.reference_key = Some(reference_key.to_string());
        self
    }

    /// This row's own translation for `lang`, without reference fallback.
    pub fn translation(&self, lang: &str) -> Option<&str> {
        self.translations.get(lang).map(String::as_str)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_repository() -> Repository {
        let mut repo = Repository::new();
        repo.add_language("en");
        repo.add_language("fr");
        repo.add_section(Section::with_rows(
            "General",
            vec![
                Row::new("greeting")
                    .with_translation("en", "Hello")
                    .with_translation("fr", "Bonjour"),
                Row::new("farewell").with_translation("en", "Goodbye"),
            ],
        ))
        .unwrap();
        repo
    }

    #[test]
    fn test_add_section_indexes_rows() {
        let repo = sample_repository();
        assert_eq!(repo.row_count(), 2);
        assert!(repo.contains_key("greeting"));
        assert_eq!(repo.row("greeting").unwrap().translation("fr"), Some("Bonjour"));
        assert!(repo.row("missing").is_none());
    }

    #[test]
    fn test_duplicate_key_across_sections_rejected() {
        let mut repo = sample_repository();
        let err = repo
            .add_section(Section::with_rows(
                "Other",
                vec![Row::new("greeting").with_translation("en", "Hi")],
            ))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(key) if key == "greeting"));
        // Nothing was added.
        assert_eq!(repo.sections().len(), 1);
        assert_eq!(repo.row_count(), 2);
    }

    #[test]
    fn test_duplicate_key_within_section_rejected() {
        let mut repo = Repository::new();
        let err = repo
            .add_section(Section::with_rows(
                "General",
                vec![Row::new("a"), Row::new("a")],
            ))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(_)));
    }

    #[test]
    fn test_add_language_is_idempotent_and_ordered() {
        let mut repo = Repository::new();
        repo.add_language("en");
        repo.add_language("fr");
        repo.add_language("en");
        assert_eq!(repo.languages(), &["en".to_string(), "fr".to_string()]);
    }

    #[test]
    fn test_insert_section_front_keeps_index_valid() {
        let mut repo = sample_repository();
        repo.insert_section_front(Section::with_rows(
            "Uncategorized",
            vec![Row::new("fresh").with_translation("en", "New")],
        ));

        assert_eq!(repo.sections()[0].name, "Uncategorized");
        assert_eq!(repo.row("fresh").unwrap().translation("en"), Some("New"));
        // Pre-existing rows are still reachable after the shift.
        assert_eq!(repo.row("greeting").unwrap().translation("en"), Some("Hello"));
        assert_eq!(repo.row("farewell").unwrap().translation("en"), Some("Goodbye"));
    }

    #[test]
    fn test_resolved_translation_follows_reference() {
        let mut repo = Repository::new();
        repo.add_section(Section::with_rows(
            "",
            vec![
                Row::new("base").with_translation("en", "Value"),
                Row::new("alias").with_reference("base"),
            ],
        ))
        .unwrap();

        let alias = repo.row("alias").unwrap();
        assert_eq!(repo.resolved_translation(alias, "en"), Some("Value"));
        assert_eq!(repo.resolved_translation(alias, "fr"), None);
    }

    #[test]
    fn test_resolved_translation_reference_cycle_terminates() {
        let mut repo = Repository::new();
        repo.add_section(Section::with_rows(
            "",
            vec![
                Row::new("a").with_reference("b"),
                Row::new("b").with_reference("a"),
            ],
        ))
        .unwrap();

        let a = repo.row("a").unwrap();
        assert_eq!(repo.resolved_translation(a, "en"), None);
    }

    #[test]
    fn test_resolved_comment_falls_back_to_reference() {
        let mut repo = Repository::new();
        repo.add_section(Section::with_rows(
            "",
            vec![
                Row::new("base").with_comment("Shared comment"),
                Row::new("alias").with_reference("base"),
            ],
        ))
        .unwrap();

        let alias = repo.row("alias").unwrap();
        assert_eq!(repo.resolved_comment(alias), Some("Shared comment"));
    }

    #[test]
    fn test_match_language_exact_and_base() {
        let repo = sample_repository();
        assert_eq!(repo.match_language("en"), Some("en"));
        assert_eq!(repo.match_language("en-US"), Some("en"));
        assert_eq!(repo.match_language("de"), None);
        assert_eq!(repo.match_language("not a language"), None);
    }

    #[test]
    fn test_snapshot_round_trip_preserves_order() {
        let mut repo = sample_repository();
        repo.add_section(Section::with_rows(
            "Extra",
            vec![Row::new("extra")
                .with_translation("en", "More")
                .with_comment("c")
                .with_tags(["ios"])],
        ))
        .unwrap();

        let mut buffer = Vec::new();
        repo.to_writer(&mut buffer).unwrap();
        let loaded = Repository::from_reader(std::io::Cursor::new(buffer)).unwrap();

        assert_eq!(loaded, repo);
        assert_eq!(loaded.languages(), repo.languages());
        assert_eq!(loaded.sections()[1].name, "Extra");
        assert_eq!(loaded.row("extra").unwrap().tags, vec!["ios".to_string()]);
    }

    #[test]
    fn test_snapshot_rejects_duplicate_keys() {
        let json = r#"{
            "languages": ["en"],
            "sections": [
                {"name": "A", "rows": [{"key": "dup"}]},
                {"name": "B", "rows": [{"key": "dup"}]}
            ]
        }"#;
        let result = Repository::from_reader(std::io::Cursor::new(json));
        assert!(result.is_err());
    }
}
