//! Shell command execution

use crate::errors::ProcessError;
use crate::installation::traits::ProcessRunner;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Runs commands through the platform shell
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellProcessRunner;

impl ShellProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn shell_command(command: &str) -> Command {
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command);
            cmd
        }
    }
}

#[async_trait]
impl ProcessRunner for ShellProcessRunner {
    async fn exec(&self, command: &str, cwd: &Path) -> Result<(), ProcessError> {
        log::debug!("Running `{}` in {}", command, cwd.display());

        let output = Self::shell_command(command)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ProcessError::Spawn {
                command: command.to_string(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(ProcessError::Exit {
            command: command.to_string(),
            code: output.status.code(),
            stderr,
        })
    }
}
