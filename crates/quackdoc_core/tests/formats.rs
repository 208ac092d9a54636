use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use quackdoc_core::{ConversionDirection, ConversionTask, DocFormat, FileDescriptor};

#[test]
fn known_extensions_map_to_documented_formats() {
    let table = [
        ("md", "markdown"),
        ("markdown", "markdown"),
        ("html", "html"),
        ("htm", "html"),
        ("docx", "docx"),
        ("doc", "docx"),
        ("pdf", "pdf"),
        ("txt", "plain"),
    ];
    for (ext, expected) in table {
        assert_eq!(DocFormat::from_extension(ext).as_str(), expected, "ext {ext}");
        let upper = ext.to_ascii_uppercase();
        assert_eq!(DocFormat::from_extension(&upper).as_str(), expected, "ext {upper}");
    }
}

#[test]
fn unknown_extension_falls_back_to_lowercased_raw() {
    assert_eq!(
        DocFormat::from_path(Path::new("notes.RST")),
        DocFormat::Other("rst".to_string())
    );
    assert_eq!(DocFormat::from_path(Path::new("Makefile")).as_str(), "");
}

#[test]
fn names_parse_and_serialize_as_strings() {
    assert_eq!(DocFormat::from_name("Markdown"), DocFormat::Markdown);
    assert_eq!(DocFormat::from_name("text"), DocFormat::Plain);
    let json = serde_json::to_string(&DocFormat::Docx).unwrap();
    assert_eq!(json, "\"docx\"");
    let back: DocFormat = serde_json::from_str("\"md\"").unwrap();
    assert_eq!(back, DocFormat::Markdown);
}

#[test]
fn only_two_directions_are_supported() {
    assert_eq!(
        ConversionDirection::resolve(&DocFormat::Html, &DocFormat::Markdown),
        Some(ConversionDirection::HtmlToMarkdown)
    );
    assert_eq!(
        ConversionDirection::resolve(&DocFormat::Markdown, &DocFormat::Docx),
        Some(ConversionDirection::MarkdownToDocx)
    );
    assert_eq!(
        ConversionDirection::resolve(&DocFormat::Markdown, &DocFormat::Html),
        None
    );
    assert!(ConversionDirection::HtmlToMarkdown.captures_stdout());
    assert!(!ConversionDirection::MarkdownToDocx.captures_stdout());
}

fn descriptor(path: &str, format: DocFormat) -> FileDescriptor {
    FileDescriptor {
        path: PathBuf::from(path),
        format,
        size_bytes: 10,
        modified: None,
        extra_args: Vec::new(),
    }
}

#[test]
fn output_path_resolution_prefers_override_dir() {
    let task = ConversionTask::new(descriptor("in/notes.html", DocFormat::Html), DocFormat::Markdown)
        .with_output("elsewhere/custom.md");

    assert_eq!(
        task.resolve_output(Some(Path::new("out"))),
        PathBuf::from("out/notes.md")
    );
    assert_eq!(task.resolve_output(None), PathBuf::from("elsewhere/custom.md"));

    let natural = ConversionTask::new(descriptor("in/report.md", DocFormat::Markdown), DocFormat::Docx);
    assert_eq!(natural.resolve_output(None), PathBuf::from("in/report.docx"));
}
