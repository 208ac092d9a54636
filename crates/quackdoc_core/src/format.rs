use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Document format as understood by the conversion tool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocFormat {
    Markdown,
    Html,
    Docx,
    Pdf,
    Plain,
    /// Anything else, carried as the lowercased extension or name.
    Other(String),
}

impl DocFormat {
    /// Maps a file extension (without the dot, any case) to a format.
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_ascii_lowercase();
        match ext.as_str() {
            "md" | "markdown" => DocFormat::Markdown,
            "html" | "htm" => DocFormat::Html,
            "docx" | "doc" => DocFormat::Docx,
            "pdf" => DocFormat::Pdf,
            "txt" => DocFormat::Plain,
            _ => DocFormat::Other(ext),
        }
    }

    /// Infers the format from the path extension. No extension maps to `Other("")`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) => Self::from_extension(&ext.to_string_lossy()),
            None => DocFormat::Other(String::new()),
        }
    }

    /// Parses a user-facing format name (`markdown`, `docx`, `plain`, ...).
    pub fn from_name(name: &str) -> Self {
        let name = name.trim().to_ascii_lowercase();
        match name.as_str() {
            "plain" | "text" => DocFormat::Plain,
            other => Self::from_extension(other),
        }
    }

    /// Canonical name, also the pandoc reader/writer name.
    pub fn as_str(&self) -> &str {
        match self {
            DocFormat::Markdown => "markdown",
            DocFormat::Html => "html",
            DocFormat::Docx => "docx",
            DocFormat::Pdf => "pdf",
            DocFormat::Plain => "plain",
            DocFormat::Other(raw) => raw,
        }
    }

    /// Natural file extension for output files of this format.
    pub fn extension(&self) -> &str {
        match self {
            DocFormat::Markdown => "md",
            DocFormat::Html => "html",
            DocFormat::Docx => "docx",
            DocFormat::Pdf => "pdf",
            DocFormat::Plain => "txt",
            DocFormat::Other(raw) => raw,
        }
    }
}

impl fmt::Display for DocFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for DocFormat {
    fn from(value: String) -> Self {
        DocFormat::from_name(&value)
    }
}

impl From<DocFormat> for String {
    fn from(value: DocFormat) -> Self {
        value.as_str().to_string()
    }
}

/// A supported `(source, target)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionDirection {
    HtmlToMarkdown,
    MarkdownToDocx,
}

impl ConversionDirection {
    /// Returns the direction for a format pair, or `None` when no rule exists.
    pub fn resolve(source: &DocFormat, target: &DocFormat) -> Option<Self> {
        match (source, target) {
            (DocFormat::Html, DocFormat::Markdown) => Some(ConversionDirection::HtmlToMarkdown),
            (DocFormat::Markdown, DocFormat::Docx) => Some(ConversionDirection::MarkdownToDocx),
            _ => None,
        }
    }

    pub fn source(self) -> DocFormat {
        match self {
            ConversionDirection::HtmlToMarkdown => DocFormat::Html,
            ConversionDirection::MarkdownToDocx => DocFormat::Markdown,
        }
    }

    pub fn target(self) -> DocFormat {
        match self {
            ConversionDirection::HtmlToMarkdown => DocFormat::Markdown,
            ConversionDirection::MarkdownToDocx => DocFormat::Docx,
        }
    }

    /// True when the tool output arrives on stdout instead of being written by the tool.
    pub fn captures_stdout(self) -> bool {
        matches!(self, ConversionDirection::HtmlToMarkdown)
    }
}

impl fmt::Display for ConversionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source(), self.target())
    }
}
