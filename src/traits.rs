//! The contract every format plugin implements.
//!
//! A plugin supplies its key/value pattern and escaping hooks; the shared
//! pipeline in [`crate::render`] and the fan-out in [`crate::writer`] do the
//! rest. Optional hooks default to identity or no-op, and `read` defaults to
//! [`Error::Unimplemented`] so an incomplete plugin surfaces immediately
//! instead of silently doing nothing.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use encoding_rs::Encoding;

use crate::{
    error::Error,
    merge::MergeEngine,
    processor::OutputProcessor,
    render::{self, DEFAULT_ROW_TEMPLATE, RenderStep},
    types::{Repository, Row, Section},
};

pub trait Formatter {
    /// Short format name used in diagnostics and registry lookups.
    fn name(&self) -> &'static str;

    /// Pattern for one key/value line, with `{key}` and `{value}` markers.
    fn key_value_pattern(&self) -> &'static str;

    /// File name used when the caller does not override it.
    fn default_file_name(&self) -> &'static str;

    /// Transforms a key for output (escaping/quoting).
    fn format_key(&self, key: &str) -> String {
        key.to_string()
    }

    /// Transforms a value for output. Placeholder canonicalization and
    /// target-format escaping both belong here.
    fn format_value(&self, value: &str) -> String {
        value.to_string()
    }

    fn format_header(&self, _lang: &str) -> Option<String> {
        None
    }

    fn format_section_header(&self, _section: &Section) -> Option<String> {
        None
    }

    fn format_comment(&self, _repo: &Repository, _row: &Row) -> Option<String> {
        None
    }

    /// Ordered render steps for one row.
    fn row_template(&self) -> &'static [RenderStep] {
        DEFAULT_ROW_TEMPLATE
    }

    /// Subdirectory a language's file is created in (create layout).
    fn directory_name_for_language(&self, lang: &str) -> String {
        lang.to_string()
    }

    /// Maps an existing subdirectory back to a language code (discover
    /// layout). The default accepts directories named like a language the
    /// repository already knows.
    fn language_for_directory(&self, path: &Path, repo: &Repository) -> Option<String> {
        let name = path.file_name()?.to_str()?;
        repo.match_language(name).map(str::to_string)
    }

    /// Parses `path` and merges its contents for `lang` through `engine`.
    fn read(&self, _path: &Path, _lang: &str, _engine: &mut MergeEngine) -> Result<(), Error> {
        Err(Error::Unimplemented {
            format: self.name(),
            operation: "read",
        })
    }

    /// Renders the full file text for one language. Plugins whose files
    /// need wrapping beyond the shared skeleton override this.
    fn format_file(&self, repo: &Repository, lang: &str) -> String {
        render::format_file(self, repo, lang)
    }

    /// Writes one language's file: processed view, rendered, streamed to
    /// `path` in the given encoding through a single scoped file handle.
    fn write(
        &self,
        path: &Path,
        lang: &str,
        repo: &Repository,
        processor: &dyn OutputProcessor,
        encoding: &'static Encoding,
    ) -> Result<(), Error> {
        let view = processor.process(repo, lang)?;
        let text = self.format_file(&view, lang);
        let (encoded, _, _) = encoding.encode(&text);
        let mut file = File::create(path)?;
        file.write_all(&encoded)?;
        Ok(())
    }
}
