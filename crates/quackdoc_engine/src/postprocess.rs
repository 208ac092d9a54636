use std::sync::LazyLock;

use regex::Regex;

static ATTRIBUTE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ \t]*\{(?:[#.][^{}\n]*|[A-Za-z][\w-]*=[^{}\n]*)\}").expect("valid regex")
});
static DIV_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*:::+.*(?:\n|$)").expect("valid regex"));
static DIV_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?div\b[^>]*>").expect("valid regex"));
static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("valid regex"));
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*(?:[-*+]|\d+[.)])[ \t]+\S").expect("valid regex"));
static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(`{3,}|~{3,})(.*)").expect("valid regex"));

enum Segment<'a> {
    Prose(&'a str),
    /// Fence lines included.
    Code(&'a str),
}

/// Removes HTML leftovers from pandoc's markdown writer output.
///
/// Fenced code blocks pass through untouched. Whitespace-only input yields an empty string.
pub fn clean_markdown(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n");
    let mut cleaned = String::with_capacity(text.len());
    for segment in split_code_fences(&text) {
        match segment {
            Segment::Prose(prose) => cleaned.push_str(&clean_prose(prose)),
            Segment::Code(code) => cleaned.push_str(code),
        }
    }

    let text = cleaned.trim_start_matches('\n').trim_end();
    if text.trim().is_empty() {
        String::new()
    } else {
        format!("{text}\n")
    }
}

fn clean_prose(text: &str) -> String {
    let text = HTML_COMMENT.replace_all(text, "");
    let text = ATTRIBUTE_BLOCK.replace_all(&text, "");
    let text = DIV_FENCE.replace_all(&text, "");
    let text = DIV_TAG.replace_all(&text, "");
    let text = BLANK_RUN.replace_all(&text, "\n\n");
    tighten_lists(&text)
}

/// An unclosed fence runs to the end of the document.
fn split_code_fences(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut offset = 0;
    // Fence character and run length of the open block.
    let mut open: Option<(char, usize)> = None;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        match open {
            None => {
                if let Some(fence) = opening_fence(line) {
                    if line_start > start {
                        segments.push(Segment::Prose(&text[start..line_start]));
                    }
                    start = line_start;
                    open = Some(fence);
                }
            }
            Some((ch, len)) => {
                if closes_fence(line, ch, len) {
                    segments.push(Segment::Code(&text[start..offset]));
                    start = offset;
                    open = None;
                }
            }
        }
    }

    if start < text.len() {
        let rest = &text[start..];
        segments.push(match open {
            Some(_) => Segment::Code(rest),
            None => Segment::Prose(rest),
        });
    }
    segments
}

fn opening_fence(line: &str) -> Option<(char, usize)> {
    let caps = CODE_FENCE.captures(line)?;
    let marker = caps.get(1)?.as_str();
    let info = caps.get(2).map_or("", |m| m.as_str());
    let ch = marker.chars().next()?;
    // A backtick run followed by more backticks is inline code, not a fence.
    if ch == '`' && info.contains('`') {
        return None;
    }
    Some((ch, marker.len()))
}

fn closes_fence(line: &str, ch: char, len: usize) -> bool {
    let indented = line.trim_start_matches(' ');
    if line.len() - indented.len() > 3 {
        return false;
    }
    let rest = indented.trim_start_matches(ch);
    indented.len() - rest.len() >= len && rest.trim().is_empty()
}

/// Drops blank lines sitting between two list items.
fn tighten_lists(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let blank = line.trim().is_empty();
        if blank && i > 0 && i + 1 < lines.len() {
            let prev_is_item = kept.last().is_some_and(|l| LIST_ITEM.is_match(l));
            let next_is_item = LIST_ITEM.is_match(lines[i + 1]);
            if prev_is_item && next_is_item {
                continue;
            }
        }
        kept.push(line);
    }
    kept.join("\n")
}
