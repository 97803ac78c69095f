//! Fans a repository out across one file per language.

use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};

use crate::error::Error;
use crate::processor::OutputProcessor;
use crate::traits::Formatter;
use crate::types::Repository;

/// How per-language output directories are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryLayout {
    /// Create one subdirectory per known language under the root.
    CreatePerLanguage,
    /// Locate existing subdirectories under the root that map to languages.
    DiscoverExisting,
}

/// Writes one formatted file per language into a directory tree.
///
/// Each language's file is a single open/encode/write/close; a failure
/// mid-run does not roll back files already written for earlier languages.
pub struct DirectoryWriter<'a> {
    formatter: &'a dyn Formatter,
    processor: &'a dyn OutputProcessor,
    layout: DirectoryLayout,
    file_name: Option<String>,
    encoding: &'static Encoding,
}

impl<'a> DirectoryWriter<'a> {
    pub fn new(
        formatter: &'a dyn Formatter,
        processor: &'a dyn OutputProcessor,
        layout: DirectoryLayout,
    ) -> Self {
        DirectoryWriter {
            formatter,
            processor,
            layout,
            file_name: None,
            encoding: UTF_8,
        }
    }

    /// Overrides the plugin's default output file name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Sets the output text encoding (UTF-8 when not set).
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Writes every language's file according to the configured layout.
    pub fn write_all(&self, repo: &Repository, root: &Path) -> Result<(), Error> {
        match self.layout {
            DirectoryLayout::CreatePerLanguage => self.write_created(repo, root),
            DirectoryLayout::DiscoverExisting => self.write_discovered(repo, root),
        }
    }

    fn output_file_name(&self) -> &str {
        self.file_name
            .as_deref()
            .unwrap_or_else(|| self.formatter.default_file_name())
    }

    fn write_created(&self, repo: &Repository, root: &Path) -> Result<(), Error> {
        for lang in repo.languages() {
            let dir = root.join(self.formatter.directory_name_for_language(lang));
            fs::create_dir_all(&dir)?;
            self.formatter.write(
                &dir.join(self.output_file_name()),
                lang,
                repo,
                self.processor,
                self.encoding,
            )?;
        }
        Ok(())
    }

    fn write_discovered(&self, repo: &Repository, root: &Path) -> Result<(), Error> {
        let mut entries: Vec<fs::DirEntry> =
            fs::read_dir(root)?.collect::<Result<_, std::io::Error>>()?;
        entries.sort_by_key(fs::DirEntry::file_name);

        let mut any_written = false;
        for entry in entries {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(lang) = self.formatter.language_for_directory(&path, repo) else {
                continue;
            };
            self.formatter.write(
                &path.join(self.output_file_name()),
                &lang,
                repo,
                self.processor,
                self.encoding,
            )?;
            any_written = true;
        }

        if !any_written {
            return Err(Error::NoLanguagesFound {
                path: root.to_path_buf(),
            });
        }
        Ok(())
    }
}
