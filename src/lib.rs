#![forbid(unsafe_code)]
//! Format-agnostic localization engine for Rust.
//!
//! langweave keeps one canonical multi-language string repository and
//! converts it to and from platform-specific localization files. Format
//! plugins implement the [`Formatter`] contract; everything else is shared:
//! placeholder canonicalization, the merge engine that reconciles incoming
//! files against the repository, the render pipeline, and the per-language
//! directory writer.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use langweave::{
//!     DirectoryLayout, DirectoryWriter, Formatter, MergeEngine, MergeOptions, Passthrough,
//!     Repository, formats::FormatType,
//! };
//! use std::path::Path;
//!
//! let mut repo = Repository::new();
//!
//! // Pull new strings out of a dropped-in translation file.
//! let format = FormatType::Strings.formatter();
//! let mut engine = MergeEngine::new(&mut repo, MergeOptions::new().with_consume_all(true));
//! format.read(Path::new("fr.lproj/Localizable.strings"), "fr", &mut engine)?;
//! let report = engine.finish();
//! println!("added {} new keys", report.added);
//!
//! // Fan the repository out, one file per language.
//! DirectoryWriter::new(&*format, &Passthrough, DirectoryLayout::CreatePerLanguage)
//!     .write_all(&repo, Path::new("out"))?;
//! # Ok::<(), langweave::Error>(())
//! ```
//!
//! # Features
//!
//! - Canonical [`Repository`] model: ordered sections of rows, per-language
//!   translations, comments, tags, and row references
//! - Merge engine with consume-all discovery, reference-aware suppression,
//!   and structured [`MergeReport`] diagnostics
//! - Placeholder canonicalization with positional auto-numbering
//! - Create and discover directory layouts with configurable encodings
//! - Sample plugins for Apple `.strings` and Android `strings.xml`

pub mod error;
pub mod formats;
pub mod merge;
pub mod placeholder;
pub mod processor;
pub mod render;
pub mod traits;
pub mod types;
pub mod writer;

// Re-export most used types for easy consumption
pub use crate::{
    error::Error,
    formats::FormatType,
    merge::{MergeEngine, MergeIssue, MergeIssueKind, MergeOptions, MergeReport},
    processor::{OutputProcessor, Passthrough, TagFilter},
    render::RenderStep,
    traits::Formatter,
    types::{Repository, Row, Section},
    writer::{DirectoryLayout, DirectoryWriter},
};
