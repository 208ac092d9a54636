use std::fs;
use std::path::Path;

use quackdoc_core::DocFormat;
use quackdoc_logging::quack_debug;

use crate::decode::decode_text;
use crate::ConvertError;

/// One request to the conversion tool.
#[derive(Debug, Clone, Copy)]
pub struct ToolRequest<'a> {
    pub input: &'a Path,
    /// Where the tool should write its result; `None` means "return it on stdout".
    pub output: Option<&'a Path>,
    pub from: &'a DocFormat,
    pub to: &'a DocFormat,
    pub args: &'a [String],
}

/// The document-conversion tool the pipeline delegates to.
pub trait ExternalConverter: Send + Sync {
    fn name(&self) -> &str;

    /// Checked once when a converter is built. Returns a version string.
    fn check_available(&self) -> Result<String, ConvertError>;

    /// Runs one conversion and returns captured stdout (empty when the tool wrote `output`).
    fn convert(&self, request: &ToolRequest<'_>) -> Result<Vec<u8>, ConvertError>;
}

/// In-process html to markdown through `html2md`, for machines without pandoc.
///
/// Tool arguments are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct Html2MdBackend;

impl ExternalConverter for Html2MdBackend {
    fn name(&self) -> &str {
        "html2md"
    }

    fn check_available(&self) -> Result<String, ConvertError> {
        Ok("html2md (built-in)".to_string())
    }

    fn convert(&self, request: &ToolRequest<'_>) -> Result<Vec<u8>, ConvertError> {
        if (request.from, request.to) != (&DocFormat::Html, &DocFormat::Markdown) {
            return Err(ConvertError::Execution(format!(
                "built-in backend only converts html to markdown, not {} to {}",
                request.from, request.to
            )));
        }
        let bytes = fs::read(request.input).map_err(|e| {
            ConvertError::Execution(format!("cannot read {}: {e}", request.input.display()))
        })?;
        let decoded =
            decode_text(&bytes, None).map_err(|e| ConvertError::Execution(e.to_string()))?;
        quack_debug!(
            "html2md converting {} bytes decoded as {}",
            bytes.len(),
            decoded.encoding_label
        );
        let markdown = html2md::parse_html(&decoded.text);

        match request.output {
            Some(path) => {
                fs::write(path, markdown.as_bytes()).map_err(|e| {
                    ConvertError::Execution(format!("cannot write {}: {e}", path.display()))
                })?;
                Ok(Vec::new())
            }
            None => Ok(markdown.into_bytes()),
        }
    }
}
