use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use std::sync::LazyLock;

use quackdoc_core::{DocFormat, ValidationConfig};
use quackdoc_logging::{quack_debug, quack_warn};
use quick_xml::events::Event;
use quick_xml::Reader as XmlReader;
use regex::Regex;
use zip::ZipArchive;

use crate::persist::{FileInfoProvider, LocalFs};

const DOCX_DOCUMENT: &str = "word/document.xml";
const DOCX_LINK_PARTS: [&str; 2] = ["word/_rels/document.xml.rels", "[Content_Types].xml"];

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}(?:[ \t]|$)").expect("valid regex"));

/// Findings for one converted artifact. Empty `errors` means it passed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Post-conversion checks: existence, minimum size, size ratio and format structure.
pub struct OutputValidator<'a> {
    config: &'a ValidationConfig,
    files: &'a dyn FileInfoProvider,
}

impl<'a> OutputValidator<'a> {
    pub fn new(config: &'a ValidationConfig) -> Self {
        Self {
            config,
            files: &LocalFs,
        }
    }

    /// Stat the output through `files` instead of the local filesystem.
    pub fn with_files(mut self, files: &'a dyn FileInfoProvider) -> Self {
        self.files = files;
        self
    }

    /// Checks accumulate; only a missing output short-circuits.
    pub fn validate(
        &self,
        output: &Path,
        input: &Path,
        original_size: u64,
        format: &DocFormat,
    ) -> ValidationReport {
        let mut report = ValidationReport::default();

        let stat = match self.files.stat(output) {
            Ok(stat) => stat,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                report
                    .errors
                    .push(format!("Output file does not exist: {}", output.display()));
                return report;
            }
            Err(err) => {
                report.errors.push(format!("Validation error: {err}"));
                return report;
            }
        };
        if !stat.is_file {
            report
                .errors
                .push(format!("Output path is not a file: {}", output.display()));
            return report;
        }
        let output_size = stat.size;

        if output_size < self.config.min_file_size {
            report.errors.push(format!(
                "Output file size ({output_size} bytes) is below the minimum threshold ({} bytes)",
                self.config.min_file_size
            ));
        }

        if original_size > 0 {
            let ratio = output_size as f64 / original_size as f64;
            if ratio < self.config.conversion_ratio_threshold {
                report.errors.push(format!(
                    "Conversion ratio {ratio:.3} ({output_size} of {original_size} bytes from {}) is below the threshold {}",
                    input.display(),
                    self.config.conversion_ratio_threshold
                ));
            }
        }

        if self.config.verify_structure {
            match format {
                DocFormat::Markdown => self.check_markdown(output, &mut report),
                DocFormat::Docx => self.check_docx(output, &mut report),
                other => quack_debug!("no structural check for {other} output"),
            }
        }

        report
    }

    fn check_markdown(&self, output: &Path, report: &mut ValidationReport) {
        let bytes = match fs::read(output) {
            Ok(bytes) => bytes,
            Err(err) => {
                report.errors.push(format!("Validation error: {err}"));
                return;
            }
        };
        let content = String::from_utf8_lossy(&bytes);
        if content.trim().is_empty() {
            report.errors.push("Markdown output is empty".to_string());
            return;
        }
        if !HEADING.is_match(&content) {
            quack_warn!("{} has no markdown headings", output.display());
            report
                .warnings
                .push("Markdown output has no headings".to_string());
        }
    }

    fn check_docx(&self, output: &Path, report: &mut ValidationReport) {
        match inspect_docx(output) {
            Ok(summary) => {
                if summary.paragraphs == 0 {
                    report
                        .errors
                        .push("DOCX document has no paragraphs".to_string());
                }
                if self.config.check_links {
                    for part in summary.missing_link_parts {
                        report
                            .errors
                            .push(format!("DOCX package is missing part {part}"));
                    }
                }
            }
            Err(err) => report.errors.push(format!("Validation error: {err}")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum DocxError {
    #[error("cannot read docx: {0}")]
    Io(#[from] io::Error),
    #[error("not a docx package: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("docx package has no word/document.xml")]
    MissingDocument,
    #[error("malformed word/document.xml: {0}")]
    Xml(String),
}

#[derive(Debug)]
struct DocxSummary {
    paragraphs: usize,
    missing_link_parts: Vec<&'static str>,
}

fn inspect_docx(path: &Path) -> Result<DocxSummary, DocxError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let missing_link_parts = DOCX_LINK_PARTS
        .into_iter()
        .filter(|part| !archive.file_names().any(|name| name == *part))
        .collect();

    let mut xml = Vec::new();
    match archive.by_name(DOCX_DOCUMENT) {
        Ok(mut entry) => {
            entry.read_to_end(&mut xml)?;
        }
        Err(zip::result::ZipError::FileNotFound) => return Err(DocxError::MissingDocument),
        Err(err) => return Err(err.into()),
    }

    Ok(DocxSummary {
        paragraphs: count_paragraphs(&xml)?,
        missing_link_parts,
    })
}

/// Counts `<w:p>` elements, self-closing ones included.
fn count_paragraphs(xml: &[u8]) -> Result<usize, DocxError> {
    let mut reader = XmlReader::from_reader(xml);
    let mut buf = Vec::new();
    let mut count = 0;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"p" {
                    count += 1;
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(DocxError::Xml(err.to_string())),
            Ok(_) => {}
        }
        buf.clear();
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::count_paragraphs;

    #[test]
    fn counts_open_and_empty_paragraphs_only() {
        let xml = br#"<w:document xmlns:w="x"><w:body><w:p><w:pPr/><w:r><w:t>a</w:t></w:r></w:p><w:p/></w:body></w:document>"#;
        assert_eq!(count_paragraphs(xml).unwrap(), 2);
    }

    #[test]
    fn body_without_paragraphs_counts_zero() {
        let xml = br#"<w:document xmlns:w="x"><w:body><w:sectPr/></w:body></w:document>"#;
        assert_eq!(count_paragraphs(xml).unwrap(), 0);
    }
}
