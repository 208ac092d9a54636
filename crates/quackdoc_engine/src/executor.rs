use std::path::Path;

use quackdoc_core::{ConversionDirection, RetryPolicy};
use quackdoc_logging::quack_debug;

use crate::backend::{ExternalConverter, ToolRequest};
use crate::decode::decode_text;
use crate::persist::TextWriter;
use crate::postprocess::clean_markdown;
use crate::retry::{run_with_retry, Exhausted};
use crate::ConvertError;

/// What one tool invocation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutput {
    /// Cleaned markdown, for directions whose result arrives on stdout.
    pub markdown: Option<String>,
}

/// Runs the conversion tool for one direction and stores its result at `output`.
pub struct ConversionExecutor<'a> {
    backend: &'a dyn ExternalConverter,
    writer: &'a dyn TextWriter,
}

impl<'a> ConversionExecutor<'a> {
    pub fn new(backend: &'a dyn ExternalConverter, writer: &'a dyn TextWriter) -> Self {
        Self { backend, writer }
    }

    /// Exactly one tool invocation.
    pub fn execute(
        &self,
        direction: ConversionDirection,
        input: &Path,
        output: &Path,
        args: &[String],
    ) -> Result<RawOutput, ConvertError> {
        let from = direction.source();
        let to = direction.target();

        if !direction.captures_stdout() {
            self.backend.convert(&ToolRequest {
                input,
                output: Some(output),
                from: &from,
                to: &to,
                args,
            })?;
            return Ok(RawOutput { markdown: None });
        }

        let stdout = self.backend.convert(&ToolRequest {
            input,
            output: None,
            from: &from,
            to: &to,
            args,
        })?;
        let decoded = decode_text(&stdout, Some("utf-8"))
            .map_err(|e| ConvertError::Execution(format!("unreadable tool output: {e}")))?;
        let markdown = clean_markdown(&decoded.text);
        quack_debug!(
            "{} produced {} bytes, {} after cleanup",
            self.backend.name(),
            stdout.len(),
            markdown.len()
        );
        self.writer.write_text(output, &markdown).map_err(|e| {
            ConvertError::Execution(format!("failed to write {}: {e}", output.display()))
        })?;
        Ok(RawOutput {
            markdown: Some(markdown),
        })
    }

    /// [`execute`](Self::execute) under the retry policy, without output validation.
    pub fn execute_with_retry(
        &self,
        policy: &RetryPolicy,
        direction: ConversionDirection,
        input: &Path,
        output: &Path,
        args: &[String],
    ) -> Result<(RawOutput, u32), Exhausted> {
        run_with_retry(
            policy,
            |_| self.execute(direction, input, output, args),
            |_, _, _| {},
        )
    }
}
