//! Child-process execution utilities.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Fix};

/// Output from a command execution.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// How long the command took
    pub duration: Duration,
}

impl CommandOutput {
    /// Check if the command succeeded.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Exit status of a command run with inherited stdio.
#[derive(Debug, Clone, Copy)]
pub enum ExitStatus {
    /// The child exited normally with this code.
    Code(i32),
    /// The child was terminated by a signal or other abnormal means.
    Abnormal,
}

impl ExitStatus {
    /// The code to exit this process with after waiting for the child.
    pub fn propagate(self) -> i32 {
        match self {
            ExitStatus::Code(code) => code,
            // Conventional shell encoding for a signal death.
            ExitStatus::Abnormal => 128 + 9,
        }
    }
}

/// A command runner that captures output and provides structured results.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    /// Working directory for commands
    pub working_dir: Option<std::path::PathBuf>,
    /// Environment variables to set
    pub env: Vec<(String, String)>,
}

impl CommandRunner {
    /// Create a new command runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the working directory.
    pub fn with_working_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Add an environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    fn build(&self, program: &OsStr, args: &[std::ffi::OsString]) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }

    fn spawn_error(program: &OsStr, e: std::io::Error) -> Error {
        let program_str = program.to_string_lossy().to_string();
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::CommandFailed {
                command: program_str.clone(),
                exit_code: None,
                stdout: String::new(),
                stderr: "executable not found".into(),
                fixes: vec![Fix::with_command(
                    format!("install a Zig toolchain providing {}", program_str),
                    "zigup stable",
                )],
            }
        } else {
            Error::Io {
                message: format!("failed to execute {}", program_str),
                path: None,
                source: e,
            }
        }
    }

    /// Run a command and capture its output.
    pub async fn run<P, S, I>(&self, program: P, args: I) -> Result<CommandOutput, Error>
    where
        P: AsRef<OsStr>,
        S: AsRef<OsStr>,
        I: IntoIterator<Item = S>,
    {
        let program_ref = program.as_ref();
        let args_vec: Vec<_> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();

        debug!(
            "Running command: {} {:?}",
            program_ref.to_string_lossy(),
            args_vec
        );

        let mut cmd = self.build(program_ref, &args_vec);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let start = Instant::now();
        let output = cmd
            .output()
            .await
            .map_err(|e| Self::spawn_error(program_ref, e))?;
        let duration = start.elapsed();

        let exit_code = output.status.code().unwrap_or(-1);
        debug!(
            exit_code = exit_code,
            duration_ms = duration.as_millis() as u64,
            "Command completed"
        );

        Ok(CommandOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration,
        })
    }

    /// Run a command with inherited stdio and wait for it.
    ///
    /// Used for `zigup run` and the ZLS build, where the child owns the
    /// terminal. Returns the exit status instead of captured output.
    pub async fn status<P, S, I>(&self, program: P, args: I) -> Result<ExitStatus, Error>
    where
        P: AsRef<OsStr>,
        S: AsRef<OsStr>,
        I: IntoIterator<Item = S>,
    {
        let program_ref = program.as_ref();
        let args_vec: Vec<_> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();

        debug!(
            "Spawning command: {} {:?}",
            program_ref.to_string_lossy(),
            args_vec
        );

        let mut cmd = self.build(program_ref, &args_vec);
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let status = cmd
            .status()
            .await
            .map_err(|e| Self::spawn_error(program_ref, e))?;

        Ok(match status.code() {
            Some(code) => ExitStatus::Code(code),
            None => ExitStatus::Abnormal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_captures_output() {
        let runner = CommandRunner::new();
        let output = if cfg!(windows) {
            runner.run("cmd", ["/C", "echo hello"]).await.unwrap()
        } else {
            runner.run("echo", ["hello"]).await.unwrap()
        };
        assert!(output.success());
        assert!(output.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn test_missing_program_maps_to_command_failed() {
        let runner = CommandRunner::new();
        let err = runner
            .run("zigup-no-such-binary", ["--version"])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));
    }

    #[test]
    fn test_exit_status_propagation() {
        assert_eq!(ExitStatus::Code(3).propagate(), 3);
        assert_eq!(ExitStatus::Abnormal.propagate(), 137);
    }
}
