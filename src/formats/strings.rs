//! Apple `.strings` format plugin.
//!
//! Values in this format use the canonical object-style placeholders, so
//! only quoting and comment syntax differ from the repository form.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use indoc::indoc;
use unic_langid::LanguageIdentifier;

use crate::{
    error::Error,
    merge::MergeEngine,
    traits::Formatter,
    types::{Repository, Row, Section},
};

/// Apple `.strings` plugin.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppleStringsFormat;

impl AppleStringsFormat {
    pub fn new() -> Self {
        AppleStringsFormat
    }
}

impl Formatter for AppleStringsFormat {
    fn name(&self) -> &'static str {
        "strings"
    }

    fn key_value_pattern(&self) -> &'static str {
        "\"{key}\" = \"{value}\";"
    }

    fn default_file_name(&self) -> &'static str {
        "Localizable.strings"
    }

    fn format_key(&self, key: &str) -> String {
        escape_quotes(key)
    }

    fn format_value(&self, value: &str) -> String {
        escape_quotes(value)
    }

    fn format_header(&self, lang: &str) -> Option<String> {
        Some(format!(
            indoc! {"
                /**
                 * Apple Strings File
                 * Generated by langweave {}
                 * Language: {}
                 */"},
            env!("CARGO_PKG_VERSION"),
            lang
        ))
    }

    fn format_section_header(&self, section: &Section) -> Option<String> {
        Some(format!("/********** {} **********/", section.name))
    }

    fn format_comment(&self, repo: &Repository, row: &Row) -> Option<String> {
        repo.resolved_comment(row)
            .map(|comment| format!("/* {} */", comment.replace("*/", "* /")))
    }

    fn directory_name_for_language(&self, lang: &str) -> String {
        format!("{lang}.lproj")
    }

    fn language_for_directory(&self, path: &Path, _repo: &Repository) -> Option<String> {
        let name = path.file_name()?.to_str()?;
        let code = name.strip_suffix(".lproj")?;
        code.parse::<LanguageIdentifier>().ok()?;
        Some(code.to_string())
    }

    /// Reads a `.strings` file, decoding a UTF-8/UTF-16 BOM when present.
    fn read(&self, path: &Path, lang: &str, engine: &mut MergeEngine) -> Result<(), Error> {
        let file = File::open(path)?;
        let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .build(file);
        let mut content = String::new();
        decoder.read_to_string(&mut content)?;

        merge_content(&content, path, lang, engine)
    }
}

fn escape_quotes(text: &str) -> String {
    // Backslash escape sequences such as \n stay verbatim, so only quotes
    // need escaping on the way out.
    text.replace('"', "\\\"")
}

fn merge_content(
    content: &str,
    path: &Path,
    lang: &str,
    engine: &mut MergeEngine,
) -> Result<(), Error> {
    let content = collapse_multiline_values(content);

    let mut last_comment: Option<String> = None;
    let mut open_block: Option<String> = None;
    let mut block_is_banner = false;

    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw_line.trim();

        if let Some(block) = open_block.as_mut() {
            if let Some(inner) = trimmed.strip_suffix("*/") {
                block.push(' ');
                block.push_str(inner.trim());
                if !block_is_banner {
                    last_comment = Some(block.trim().to_string());
                }
                open_block = None;
            } else {
                block.push(' ');
                block.push_str(trimmed);
            }
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("//") {
            last_comment = Some(rest.trim().to_string());
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("/*") {
            if rest.starts_with('*') {
                // `/**` doc blocks and `/*****` section banners are file
                // structure, not row comments.
                last_comment = None;
                if !rest.contains("*/") {
                    open_block = Some(String::new());
                    block_is_banner = true;
                }
                continue;
            }
            match rest.strip_suffix("*/") {
                Some(inner) => last_comment = Some(inner.trim().to_string()),
                None => {
                    open_block = Some(rest.trim().to_string());
                    block_is_banner = false;
                }
            }
            continue;
        }

        let Some((key, value)) = parse_pair(trimmed) else {
            return Err(Error::parse_error_at(
                path,
                line_no,
                format!("expected \"key\" = \"value\"; pair, got: {trimmed}"),
            ));
        };

        engine.set_translation_for_key(&key, lang, &value);
        if engine.options().consume_comments
            && let Some(comment) = last_comment.take()
        {
            engine.set_comment_for_key(&key, &comment);
        }
        last_comment = None;
    }

    if open_block.is_some() {
        return Err(Error::parse_error(path, "unterminated block comment"));
    }
    Ok(())
}

/// Collapses quoted values spanning multiple lines into single-line values
/// joined with literal `\n`, so the line parser sees one pair per line.
fn collapse_multiline_values(content: &str) -> String {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    let mut inside_value = false;
    let mut value_buf = String::new();

    while let Some(c) = chars.next() {
        if !inside_value {
            result.push(c);
            if c == '=' {
                // Seek the opening quote of the value.
                while let Some(&d) = chars.peek() {
                    result.push(d);
                    chars.next();
                    if d == '"' {
                        inside_value = true;
                        value_buf.clear();
                        break;
                    }
                }
            }
        } else if c == '"' {
            let trailing_backslashes = value_buf.chars().rev().take_while(|&b| b == '\\').count();
            if trailing_backslashes % 2 == 0 {
                inside_value = false;
                let one_line = value_buf
                    .lines()
                    .map(str::trim_start)
                    .collect::<Vec<_>>()
                    .join("\\n");
                result.push_str(&one_line);
                result.push('"');
                value_buf.clear();
            } else {
                value_buf.push('"');
            }
        } else {
            value_buf.push(c);
        }
    }

    result
}

fn parse_pair(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix('"')?;
    let (key, rest) = read_quoted(rest)?;
    let rest = rest.trim_start().strip_prefix('=')?;
    let rest = rest.trim_start().strip_prefix('"')?;
    let (value, rest) = read_quoted(rest)?;
    let rest = rest.trim_start().strip_prefix(';')?;
    rest.trim().is_empty().then_some((key, value))
}

// Reads up to the closing unescaped quote. `\"` becomes a plain quote;
// every other escape sequence stays verbatim.
fn read_quoted(text: &str) -> Option<(String, &str)> {
    let mut out = String::new();
    let mut chars = text.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((out, &text[i + 1..])),
            '\\' => match chars.next() {
                Some((_, '"')) => out.push('"'),
                Some((_, other)) => {
                    out.push('\\');
                    out.push(other);
                }
                None => return None,
            },
            _ => out.push(c),
        }
    }
    None
}
