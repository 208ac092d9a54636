use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use quackdoc_core::ExecutionConfig;
use quackdoc_logging::{quack_debug, quack_warn};

use crate::backend::{ExternalConverter, ToolRequest};
use crate::ConvertError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs the pandoc binary as a subprocess, bounded by a timeout.
#[derive(Debug, Clone)]
pub struct PandocBackend {
    binary: PathBuf,
    timeout: Duration,
}

impl PandocBackend {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ExecutionConfig) -> Self {
        Self::new(config.pandoc_path.clone(), config.timeout())
    }

    fn command(&self, request: &ToolRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(request.input)
            .arg("-f")
            .arg(request.from.as_str())
            .arg("-t")
            .arg(request.to.as_str());
        if let Some(output) = request.output {
            cmd.arg("-o").arg(output);
        }
        cmd.args(request.args);
        cmd
    }
}

impl ExternalConverter for PandocBackend {
    fn name(&self) -> &str {
        "pandoc"
    }

    fn check_available(&self) -> Result<String, ConvertError> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ConvertError::Setup(format!("{}: {e}", self.binary.display())))?;
        if !output.status.success() {
            return Err(ConvertError::Setup(format!(
                "{} --version exited with {}",
                self.binary.display(),
                output.status
            )));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or("pandoc").trim().to_string())
    }

    fn convert(&self, request: &ToolRequest<'_>) -> Result<Vec<u8>, ConvertError> {
        quack_debug!(
            "{} {} -f {} -t {} {:?}",
            self.binary.display(),
            request.input.display(),
            request.from,
            request.to,
            request.args
        );
        let output = run_with_timeout(self.command(request), self.timeout)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConvertError::Execution(format!(
                "pandoc exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(output.stdout)
    }
}

pub(crate) struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Spawns `cmd`, drains its pipes on helper threads and kills it once `timeout` elapses.
pub(crate) fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
) -> Result<ProcessOutput, ConvertError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd
        .spawn()
        .map_err(|e| ConvertError::Execution(format!("failed to start tool: {e}")))?;

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    // None when the deadline is past what Instant can represent: wait without a limit.
    let deadline = Instant::now().checked_add(timeout);
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                let now = Instant::now();
                let remaining = match deadline {
                    Some(deadline) if now >= deadline => {
                        quack_warn!("tool still running after {:?}, killing it", timeout);
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(ConvertError::Timeout(timeout));
                    }
                    Some(deadline) => deadline - now,
                    None => POLL_INTERVAL,
                };
                thread::sleep(POLL_INTERVAL.min(remaining));
            }
            Err(e) => {
                let _ = child.kill();
                return Err(ConvertError::Execution(format!("failed to wait for tool: {e}")));
            }
        }
    };

    Ok(ProcessOutput {
        status,
        stdout: stdout.map(collect).unwrap_or_default(),
        stderr: stderr.map(collect).unwrap_or_default(),
    })
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: JoinHandle<Vec<u8>>) -> Vec<u8> {
    handle.join().unwrap_or_default()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_and_stderr() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "printf '# Title'; printf 'oops' >&2"]);
        let output = run_with_timeout(cmd, Duration::from_secs(10)).unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, b"# Title");
        assert_eq!(output.stderr, b"oops");
    }

    #[test]
    fn kills_processes_that_outlive_the_timeout() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let started = Instant::now();
        let err = run_with_timeout(cmd, Duration::from_millis(100)).err();
        assert_eq!(err, Some(ConvertError::Timeout(Duration::from_millis(100))));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn unbounded_timeout_waits_for_the_tool() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "sleep 0.1; printf done"]);
        let output = run_with_timeout(cmd, Duration::MAX).unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, b"done");
    }

    #[test]
    fn missing_binary_fails_setup_check() {
        let backend = PandocBackend::new("/nonexistent/pandoc-binary", Duration::from_secs(1));
        assert!(matches!(
            backend.check_available(),
            Err(ConvertError::Setup(_))
        ));
    }
}
