//! Run external programs on the tokio runtime.
//!
//! The Azure CLI credential provider shells out to `az`, which can take a few
//! seconds and may hang on an interactive prompt. [`TokioCommandExecute`]
//! runs it without blocking the runtime and can bound how long it waits.

use async_trait::async_trait;
use blobsas_core::{CommandExecute, CommandOutput, Error, Result};
use log::debug;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// [`CommandExecute`] backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandExecute {
    timeout: Option<Duration>,
}

impl TokioCommandExecute {
    /// Create an executor that waits for commands as long as they run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the command if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl CommandExecute for TokioCommandExecute {
    async fn command_execute(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        debug!("running command: {program} {}", args.join(" "));

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match self.timeout {
            None => child.await,
            Some(timeout) => tokio::time::timeout(timeout, child).await.map_err(|_| {
                Error::unexpected(format!("command '{program}' timed out"))
                    .with_context(format!("timeout: {timeout:?}"))
            })?,
        }
        .map_err(|e| Error::unexpected(format!("failed to run command '{program}'")).with_source(e))?;

        debug!("command {program} exited with {}", output.status);
        Ok(CommandOutput {
            // Killed by a signal, there is no exit code.
            status: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
