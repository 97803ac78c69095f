//! Shared composition pipeline turning repository rows into formatted text.
//!
//! Every plugin renders through the same skeleton: a file is an optional
//! header plus its non-empty sections joined by a blank line, a section is
//! an optional header plus one line break per row, and a row is a sequence
//! of [`RenderStep`]s resolved against the plugin's hooks.

use crate::traits::Formatter;
use crate::types::{Repository, Row, Section};

/// One field of a rendered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStep {
    Comment,
    KeyValue,
}

/// Default row shape: comment line, then the key/value line.
pub const DEFAULT_ROW_TEMPLATE: &[RenderStep] = &[RenderStep::Comment, RenderStep::KeyValue];

/// Renders the full file text for one language: optional header, then all
/// non-empty sections separated by a blank line, with a trailing newline.
pub fn format_file<F: Formatter + ?Sized>(formatter: &F, repo: &Repository, lang: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(header) = formatter.format_header(lang) {
        parts.push(header);
    }
    parts.extend(format_sections(formatter, repo, lang));

    if parts.is_empty() {
        return String::new();
    }
    let mut out = parts.join("\n\n");
    out.push('\n');
    out
}

/// Renders every section that has at least one visible row.
pub fn format_sections<F: Formatter + ?Sized>(
    formatter: &F,
    repo: &Repository,
    lang: &str,
) -> Vec<String> {
    repo.sections()
        .iter()
        .filter_map(|section| format_section(formatter, repo, section, lang))
        .collect()
}

/// Renders one section, or `None` when no row has a non-empty translation
/// for `lang`. A suppressed section emits nothing at all, header included.
pub fn format_section<F: Formatter + ?Sized>(
    formatter: &F,
    repo: &Repository,
    section: &Section,
    lang: &str,
) -> Option<String> {
    let rows: Vec<String> = section
        .rows()
        .iter()
        .filter_map(|row| format_row(formatter, repo, row, lang))
        .collect();
    if rows.is_empty() {
        return None;
    }

    let mut parts = Vec::new();
    if !section.name.is_empty()
        && let Some(header) = formatter.format_section_header(section)
    {
        parts.push(header);
    }
    parts.extend(rows);
    Some(parts.join("\n"))
}

/// Renders one row through the plugin's row template, or `None` when the
/// row has no non-empty translation for `lang`.
pub fn format_row<F: Formatter + ?Sized>(
    formatter: &F,
    repo: &Repository,
    row: &Row,
    lang: &str,
) -> Option<String> {
    let value = repo.resolved_translation(row, lang)?;
    if value.is_empty() {
        return None;
    }

    let mut parts = Vec::new();
    for step in formatter.row_template() {
        match step {
            RenderStep::Comment => {
                if let Some(comment) = formatter.format_comment(repo, row) {
                    parts.push(comment);
                }
            }
            RenderStep::KeyValue => parts.push(format_key_value(formatter, &row.key, value)),
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

/// Fills the plugin's key/value pattern with the hook-transformed key and
/// value.
pub fn format_key_value<F: Formatter + ?Sized>(formatter: &F, key: &str, value: &str) -> String {
    apply_pattern(
        formatter.key_value_pattern(),
        &formatter.format_key(key),
        &formatter.format_value(value),
    )
}

// Single pass over the pattern; inserted text is never re-scanned for
// markers.
fn apply_pattern(pattern: &str, key: &str, value: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + key.len() + value.len());
    let mut rest = pattern;
    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix("{key}") {
            out.push_str(key);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{value}") {
            out.push_str(value);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}
