use quackdoc_engine::{ConversionEvent, ProgressSink};

/// Prints one line per conversion step to stderr.
pub struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn emit(&self, event: ConversionEvent) {
        match event {
            ConversionEvent::Started { input, target } => {
                eprintln!("converting {} to {target}", input.display());
            }
            ConversionEvent::AttemptFailed {
                input,
                attempt,
                max_attempts,
                reason,
            } => {
                eprintln!(
                    "  {}: attempt {attempt}/{max_attempts} failed: {reason}",
                    input.display()
                );
            }
            ConversionEvent::Finished {
                input,
                success,
                attempts,
            } => {
                let status = if success { "done" } else { "failed" };
                eprintln!("  {}: {status} after {attempts} attempt(s)", input.display());
            }
        }
    }
}
