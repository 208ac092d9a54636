use std::fs;

use pretty_assertions::assert_eq;
use quackdoc_core::DocFormat;
use quackdoc_engine::{probe, ConvertError};
use tempfile::TempDir;

#[test]
fn infers_format_and_size_from_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Notes.HTML");
    fs::write(&path, "<h1>Hi</h1>").unwrap();

    let descriptor = probe(&path, None).unwrap();
    assert_eq!(descriptor.path, path);
    assert_eq!(descriptor.format, DocFormat::Html);
    assert_eq!(descriptor.size_bytes, 11);
    assert!(descriptor.modified.is_some());
    assert!(descriptor.extra_args.is_empty());
}

#[test]
fn hint_overrides_extension() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("page.txt");
    fs::write(&path, "<p>x</p>").unwrap();

    let descriptor = probe(&path, Some(&DocFormat::Html)).unwrap();
    assert_eq!(descriptor.format, DocFormat::Html);
}

#[test]
fn unknown_extension_keeps_raw_lowercase() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("data.RST");
    fs::write(&path, "title").unwrap();

    assert_eq!(
        probe(&path, None).unwrap().format,
        DocFormat::Other("rst".to_string())
    );
}

#[test]
fn missing_file_is_input_not_found() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("gone.html");
    assert_eq!(probe(&path, None), Err(ConvertError::InputNotFound(path)));
}

#[test]
fn directory_is_not_a_conversion_input() {
    let temp = TempDir::new().unwrap();
    assert!(matches!(
        probe(temp.path(), None),
        Err(ConvertError::InputUnreadable { .. })
    ));
}
