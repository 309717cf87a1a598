//! Operating-system side effects: running a command line and opening a URL.

use anyhow::{Context, Result};
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;

/// Why a launched command did not succeed.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}: {stderr}")]
    Status {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Side effects the dispatcher asks of the operating system.
pub trait System: Send + Sync + 'static {
    /// Runs a full command line through the platform shell and waits for it.
    fn exec(&self, command: &str) -> Result<(), ExecError>;

    /// Hands a URL to the registered scheme handler.
    fn open_url(&self, url: &str) -> Result<()>;
}

/// The real operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct Os;

impl System for Os {
    fn exec(&self, command: &str) -> Result<(), ExecError> {
        let output = shell(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ExecError::Spawn {
                command: command.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(ExecError::Status {
                command: command.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<()> {
        open::that(url).with_context(|| format!("Failed to open URL: {}", url))
    }
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}
