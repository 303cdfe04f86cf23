//! Outcome of an external command, kept independent of how the command ran.

use std::process::{ExitStatus, Output};

use tokio::process::Command;

/// How a child process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Exited normally with this code.
    Exited(i32),
    /// Terminated by a signal.
    Signaled(i32),
    /// The process could not be started at all.
    SpawnFailed(String),
}

impl RunStatus {
    pub fn success(&self) -> bool {
        matches!(self, RunStatus::Exited(0))
    }

    pub fn from_exit_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return RunStatus::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return RunStatus::Signaled(signal);
            }
        }
        RunStatus::Exited(-1)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Exited(code) => write!(f, "exit code {}", code),
            RunStatus::Signaled(signal) => write!(f, "signal {}", signal),
            RunStatus::SpawnFailed(err) => write!(f, "failed to start: {}", err),
        }
    }
}

/// A finished command: its status plus whatever it wrote.
#[derive(Debug)]
pub struct RunOutput {
    pub status: RunStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Run `cmd` to completion, capturing output. Never fails: a spawn error is
/// reported through [`RunStatus::SpawnFailed`].
pub async fn run(cmd: &mut Command) -> RunOutput {
    match cmd.output().await {
        Ok(Output {
            status,
            stdout,
            stderr,
        }) => RunOutput {
            status: RunStatus::from_exit_status(status),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        },
        Err(err) => RunOutput {
            status: RunStatus::SpawnFailed(err.to_string()),
            stdout: String::new(),
            stderr: String::new(),
        },
    }
}
