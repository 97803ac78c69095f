//! Directory fan-out behavior in both layouts.

use std::fs;

use langweave::formats::FormatType;
use langweave::{
    DirectoryLayout, DirectoryWriter, Passthrough, Repository, Row, Section, TagFilter,
};

fn two_language_repository() -> Repository {
    let mut repo = Repository::new();
    repo.add_language("en");
    repo.add_language("fr");
    repo.add_section(Section::with_rows(
        "General",
        vec![
            Row::new("greeting")
                .with_translation("en", "Hello")
                .with_translation("fr", "Bonjour"),
            Row::new("mobile_note")
                .with_translation("en", "Mobile only")
                .with_tags(["mobile"]),
        ],
    ))
    .unwrap();
    repo
}

#[test]
fn test_create_layout_builds_one_directory_per_language() {
    let repo = two_language_repository();
    let out = tempfile::tempdir().unwrap();

    let formatter = FormatType::Strings.formatter();
    DirectoryWriter::new(&*formatter, &Passthrough, DirectoryLayout::CreatePerLanguage)
        .write_all(&repo, out.path())
        .unwrap();

    let en = fs::read_to_string(out.path().join("en.lproj/Localizable.strings")).unwrap();
    let fr = fs::read_to_string(out.path().join("fr.lproj/Localizable.strings")).unwrap();
    assert!(en.contains("\"greeting\" = \"Hello\";"));
    assert!(fr.contains("\"greeting\" = \"Bonjour\";"));
    // The French file drops the row that only has an English value.
    assert!(!fr.contains("mobile_note"));
}

#[test]
fn test_create_layout_respects_file_name_override() {
    let repo = two_language_repository();
    let out = tempfile::tempdir().unwrap();

    let formatter = FormatType::Strings.formatter();
    DirectoryWriter::new(&*formatter, &Passthrough, DirectoryLayout::CreatePerLanguage)
        .with_file_name("Buttons.strings")
        .write_all(&repo, out.path())
        .unwrap();

    assert!(out.path().join("en.lproj/Buttons.strings").exists());
    assert!(!out.path().join("en.lproj/Localizable.strings").exists());
}

#[test]
fn test_discover_layout_writes_only_into_mappable_directories() {
    let repo = two_language_repository();
    let out = tempfile::tempdir().unwrap();
    fs::create_dir(out.path().join("values-en")).unwrap();
    fs::create_dir(out.path().join("values-fr")).unwrap();
    fs::create_dir(out.path().join("drawable")).unwrap();
    fs::write(out.path().join("stray.txt"), "not a directory").unwrap();

    let formatter = FormatType::Android.formatter();
    DirectoryWriter::new(&*formatter, &Passthrough, DirectoryLayout::DiscoverExisting)
        .write_all(&repo, out.path())
        .unwrap();

    let en = fs::read_to_string(out.path().join("values-en/strings.xml")).unwrap();
    assert!(en.contains("<string name=\"greeting\">Hello</string>"));
    assert!(out.path().join("values-fr/strings.xml").exists());
    assert!(!out.path().join("drawable/strings.xml").exists());
}

#[test]
fn test_discover_layout_fails_when_nothing_maps() {
    let repo = two_language_repository();
    let out = tempfile::tempdir().unwrap();
    fs::create_dir(out.path().join("drawable")).unwrap();
    fs::create_dir(out.path().join("layout")).unwrap();

    let formatter = FormatType::Android.formatter();
    let err = DirectoryWriter::new(&*formatter, &Passthrough, DirectoryLayout::DiscoverExisting)
        .write_all(&repo, out.path())
        .unwrap_err();

    assert!(matches!(err, langweave::Error::NoLanguagesFound { .. }));
    // Nothing was written anywhere.
    assert!(!out.path().join("drawable/strings.xml").exists());
    assert!(!out.path().join("layout/strings.xml").exists());
}

#[test]
fn test_output_processor_filters_rows_before_writing() {
    let repo = two_language_repository();
    let out = tempfile::tempdir().unwrap();

    let formatter = FormatType::Strings.formatter();
    let processor = TagFilter::new(["mobile"]);
    DirectoryWriter::new(&*formatter, &processor, DirectoryLayout::CreatePerLanguage)
        .write_all(&repo, out.path())
        .unwrap();

    let en = fs::read_to_string(out.path().join("en.lproj/Localizable.strings")).unwrap();
    assert!(en.contains("mobile_note"));
    assert!(!en.contains("greeting"));
}

#[test]
fn test_configurable_output_encoding() {
    let mut repo = Repository::new();
    repo.add_language("fr");
    repo.add_section(Section::with_rows(
        "",
        vec![Row::new("drink").with_translation("fr", "café")],
    ))
    .unwrap();

    let out = tempfile::tempdir().unwrap();
    let formatter = FormatType::Strings.formatter();
    DirectoryWriter::new(&*formatter, &Passthrough, DirectoryLayout::CreatePerLanguage)
        .with_encoding(encoding_rs::WINDOWS_1252)
        .write_all(&repo, out.path())
        .unwrap();

    let bytes = fs::read(out.path().join("fr.lproj/Localizable.strings")).unwrap();
    // 0xE9 is é in Windows-1252; the UTF-8 sequence would be C3 A9.
    assert!(bytes.contains(&0xE9));
    assert!(!bytes.windows(2).any(|w| w == [0xC3, 0xA9]));
}
