use std::path::PathBuf;

use pretty_assertions::assert_eq;
use quackdoc_core::{build_arguments, ConversionConfig, DocFormat, HeadingStyle, WrapMode};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn html_to_markdown_uses_defaults_in_order() {
    let config = ConversionConfig::default();
    let args = build_arguments(&config, &DocFormat::Html, &DocFormat::Markdown, &[]);
    assert_eq!(
        args,
        strings(&[
            "--wrap=none",
            "--standalone",
            "--markdown-headings=atx",
            "--reference-links",
            "--strip-comments",
            "--no-highlight",
        ])
    );
}

#[test]
fn markdown_to_docx_uses_its_own_extras_and_caller_args_last() {
    let mut config = ConversionConfig::default();
    config.md_to_docx_extra_args = strings(&["--reference-doc=ref.docx"]);
    config.pandoc_options.resource_path = vec![PathBuf::from("img"), PathBuf::from("assets")];

    let caller = strings(&["--toc"]);
    let args = build_arguments(&config, &DocFormat::Markdown, &DocFormat::Docx, &caller);
    assert_eq!(
        args,
        strings(&[
            "--wrap=none",
            "--standalone",
            "--markdown-headings=atx",
            "--reference-links",
            "--resource-path=img",
            "--resource-path=assets",
            "--reference-doc=ref.docx",
            "--toc",
        ])
    );
}

#[test]
fn disabled_flags_are_omitted_not_blank() {
    let mut config = ConversionConfig::default();
    config.pandoc_options.standalone = false;
    config.pandoc_options.reference_links = false;
    config.pandoc_options.wrap = WrapMode::Preserve;
    config.pandoc_options.markdown_headings = HeadingStyle::Setext;
    config.html_to_md_extra_args = strings(&["", "  "]);

    let args = build_arguments(&config, &DocFormat::Html, &DocFormat::Markdown, &strings(&[""]));
    assert_eq!(
        args,
        strings(&["--wrap=preserve", "--markdown-headings=setext"])
    );
    assert!(args.iter().all(|a| !a.is_empty()));
}

#[test]
fn unsupported_pair_gets_no_direction_extras() {
    let config = ConversionConfig::default();
    let args = build_arguments(&config, &DocFormat::Pdf, &DocFormat::Markdown, &[]);
    assert!(!args.contains(&"--strip-comments".to_string()));
    assert_eq!(args.len(), 4);
}

#[test]
fn building_is_idempotent() {
    let mut config = ConversionConfig::default();
    config.pandoc_options.resource_path = vec![PathBuf::from("a")];
    let extra = strings(&["--columns=80", "--wrap=auto"]);

    let first = build_arguments(&config, &DocFormat::Html, &DocFormat::Markdown, &extra);
    let second = build_arguments(&config, &DocFormat::Html, &DocFormat::Markdown, &extra);
    assert_eq!(first, second);
    // Caller override comes after the configured wrap flag.
    assert_eq!(first.last().map(String::as_str), Some("--wrap=auto"));
}
