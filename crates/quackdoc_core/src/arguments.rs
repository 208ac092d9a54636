use crate::config::ConversionConfig;
use crate::{ConversionDirection, DocFormat};

/// Builds the tool command-line options for one conversion.
///
/// Order: wrap, standalone, heading style, reference links, resource paths,
/// direction extras from config, then `extra_args` so callers can override.
pub fn build_arguments(
    config: &ConversionConfig,
    source: &DocFormat,
    target: &DocFormat,
    extra_args: &[String],
) -> Vec<String> {
    let options = &config.pandoc_options;
    let mut args = Vec::with_capacity(4 + options.resource_path.len() + extra_args.len());

    args.push(format!("--wrap={}", options.wrap.as_str()));
    if options.standalone {
        args.push("--standalone".to_string());
    }
    args.push(format!(
        "--markdown-headings={}",
        options.markdown_headings.as_str()
    ));
    if options.reference_links {
        args.push("--reference-links".to_string());
    }
    for path in &options.resource_path {
        args.push(format!("--resource-path={}", path.display()));
    }

    let direction_args = match ConversionDirection::resolve(source, target) {
        Some(ConversionDirection::HtmlToMarkdown) => config.html_to_md_extra_args.as_slice(),
        Some(ConversionDirection::MarkdownToDocx) => config.md_to_docx_extra_args.as_slice(),
        None => &[],
    };
    args.extend(non_empty(direction_args));
    args.extend(non_empty(extra_args));
    args
}

fn non_empty(args: &[String]) -> impl Iterator<Item = String> + '_ {
    args.iter()
        .filter(|arg| !arg.trim().is_empty())
        .cloned()
}
