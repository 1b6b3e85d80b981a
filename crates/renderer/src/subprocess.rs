// Rust guideline compliant 2026-02-23

//! Subprocess runner exposed to templates (spec §4.5): invokes a shell
//! command with optional working directory, environment, and timeout.

use domain::errors::context;
use domain::RendererRuntimeError;
use std::collections::BTreeMap;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Result of one subprocess invocation.
#[derive(Debug, Clone)]
pub struct SubprocessResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Runs shell commands on behalf of templates.
#[derive(Debug, Default)]
pub struct SubprocessRunner;

impl SubprocessRunner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run `command` through the platform shell, waiting at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`RendererRuntimeError`] if the process cannot be spawned, or
    /// a dedicated timeout error if `timeout` elapses before it exits.
    pub fn run(
        &self,
        command: &str,
        cwd: Option<&str>,
        env: Option<&BTreeMap<String, String>>,
        timeout: Option<Duration>,
    ) -> Result<SubprocessResult, RendererRuntimeError> {
        let mut builder = Self::shell_command(command);
        if let Some(cwd) = cwd {
            builder.current_dir(cwd);
        }
        if let Some(env) = env {
            builder.envs(env);
        }
        builder.stdout(Stdio::piped()).stderr(Stdio::piped());

        let mut child = builder.spawn().map_err(|e| RendererRuntimeError {
            reason: format!("failed to spawn subprocess: {e}"),
            context: context([("command", command)]),
        })?;

        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            if let Some(status) = child.try_wait().map_err(|e| RendererRuntimeError {
                reason: format!("failed to poll subprocess: {e}"),
                context: context([("command", command)]),
            })? {
                let mut stdout = String::new();
                let mut stderr = String::new();
                if let Some(mut out) = child.stdout.take() {
                    use std::io::Read as _;
                    let _ = out.read_to_string(&mut stdout);
                }
                if let Some(mut err) = child.stderr.take() {
                    use std::io::Read as _;
                    let _ = err.read_to_string(&mut stderr);
                }
                return Ok(SubprocessResult { stdout, stderr, exit_code: status.code().unwrap_or(-1) });
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(RendererRuntimeError {
                        reason: "subprocess timed out".to_owned(),
                        context: context([("command", command)]),
                    });
                }
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[cfg(unix)]
    fn shell_command(command: &str) -> Command {
        let mut builder = Command::new("/bin/sh");
        builder.arg("-c").arg(command);
        builder
    }

    #[cfg(not(unix))]
    fn shell_command(command: &str) -> Command {
        let mut builder = Command::new("cmd");
        builder.arg("/C").arg(command);
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::SubprocessRunner;
    use std::time::Duration;

    #[test]
    fn captures_stdout_and_exit_code() {
        let runner = SubprocessRunner::new();
        let result = runner.run("echo hello", None, None, None).unwrap();
        assert_eq!(result.stdout.trim(), "hello");
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn reports_nonzero_exit_code() {
        let runner = SubprocessRunner::new();
        let result = runner.run("exit 7", None, None, None).unwrap();
        assert_eq!(result.exit_code, 7);
    }

    #[test]
    fn timeout_kills_a_long_running_command() {
        let runner = SubprocessRunner::new();
        let result = runner.run("sleep 5", None, None, Some(Duration::from_millis(50)));
        assert!(result.is_err());
    }
}
