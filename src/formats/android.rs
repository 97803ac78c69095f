//! Android `strings.xml` format plugin.
//!
//! Android uses generic-style placeholders, so values run through
//! [`crate::placeholder`] in both directions: `to_generic` on the way out,
//! `to_object` on the way in.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use indoc::indoc;
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use unic_langid::LanguageIdentifier;

use crate::{
    error::Error,
    merge::MergeEngine,
    placeholder, render,
    traits::Formatter,
    types::{Repository, Row, Section},
};

/// Android `strings.xml` plugin.
#[derive(Debug, Clone, Copy, Default)]
pub struct AndroidFormat;

impl AndroidFormat {
    pub fn new() -> Self {
        AndroidFormat
    }
}

impl Formatter for AndroidFormat {
    fn name(&self) -> &'static str {
        "android"
    }

    fn key_value_pattern(&self) -> &'static str {
        "\t<string name=\"{key}\">{value}</string>"
    }

    fn default_file_name(&self) -> &'static str {
        "strings.xml"
    }

    fn format_key(&self, key: &str) -> String {
        escape_attribute(key)
    }

    fn format_value(&self, value: &str) -> String {
        escape_text(&placeholder::to_generic(value))
    }

    fn format_header(&self, lang: &str) -> Option<String> {
        Some(format!(
            indoc! {r#"
                <?xml version="1.0" encoding="utf-8"?>
                <!-- Android Strings File -->
                <!-- Generated by langweave {} -->
                <!-- Language: {} -->
                <resources>"#},
            env!("CARGO_PKG_VERSION"),
            lang
        ))
    }

    fn format_section_header(&self, section: &Section) -> Option<String> {
        Some(format!("\t<!-- SECTION: {} -->", section.name))
    }

    fn format_comment(&self, repo: &Repository, row: &Row) -> Option<String> {
        repo.resolved_comment(row)
            .map(|comment| format!("\t<!-- {} -->", comment.replace("--", "- -")))
    }

    /// The shared pipeline renders everything up to the last row; the
    /// resources element still has to be closed.
    fn format_file(&self, repo: &Repository, lang: &str) -> String {
        let mut out = render::format_file(self, repo, lang);
        out.push_str("</resources>\n");
        out
    }

    fn directory_name_for_language(&self, lang: &str) -> String {
        format!("values-{lang}")
    }

    fn language_for_directory(&self, path: &Path, _repo: &Repository) -> Option<String> {
        let name = path.file_name()?.to_str()?;
        let code = name.strip_prefix("values-")?;
        code.parse::<LanguageIdentifier>().ok()?;
        Some(code.to_string())
    }

    fn read(&self, path: &Path, lang: &str, engine: &mut MergeEngine) -> Result<(), Error> {
        let file = File::open(path)?;
        merge_reader(BufReader::new(file), path, lang, engine)
    }
}

fn escape_attribute(key: &str) -> String {
    key.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}

// Android resource text: XML entities for markup characters, backslash
// escapes for quote characters.
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape_text(value: &str) -> String {
    value.replace("\\'", "'").replace("\\\"", "\"")
}

fn merge_reader<R: BufRead>(
    reader: R,
    path: &Path,
    lang: &str,
    engine: &mut MergeEngine,
) -> Result<(), Error> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut pending_comment: Option<String> = None;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Comment(e)) => {
                let text = e.unescape()?.trim().to_string();
                // Section banners are structure, not row comments.
                pending_comment = (!text.starts_with("SECTION:")).then_some(text);
            }
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"string" => {
                let (key, value) = parse_string_element(e, &mut xml, path)?;
                let value = placeholder::to_object(&unescape_text(&value));
                engine.set_translation_for_key(&key, lang, &value);
                if engine.options().consume_comments
                    && let Some(comment) = pending_comment.take()
                {
                    engine.set_comment_for_key(&key, &comment);
                }
                pending_comment = None;
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"string" => {
                let key = name_attribute(e, path)?;
                engine.set_translation_for_key(&key, lang, "");
                pending_comment = None;
            }
            Ok(Event::Start(_)) => pending_comment = None,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e)),
        }
        buf.clear();
    }
    Ok(())
}

fn parse_string_element<R: BufRead>(
    e: &BytesStart,
    xml: &mut Reader<R>,
    path: &Path,
) -> Result<(String, String), Error> {
    let key = name_attribute(e, path)?;

    let mut buf = Vec::new();
    let value = loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Text(t)) => break t.unescape()?.to_string(),
            Ok(Event::End(_)) => break String::new(),
            Ok(Event::Eof) => {
                return Err(Error::parse_error(
                    path,
                    "unexpected end of file inside <string>",
                ));
            }
            Ok(_) => {}
            Err(err) => return Err(Error::XmlParse(err)),
        }
        buf.clear();
    };
    Ok((key, value))
}

fn name_attribute(e: &BytesStart, path: &Path) -> Result<String, Error> {
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|err| Error::parse_error(path, err.to_string()))?;
        if attr.key.as_ref() == b"name" {
            return Ok(attr.unescape_value()?.to_string());
        }
    }
    Err(Error::parse_error(
        path,
        "string element missing name attribute",
    ))
}
