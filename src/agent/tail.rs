//! Ships the stdout of a long-running command as raw log lines.

use std::process::Stdio;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::broadcast;

use crate::agent::report::Reporter;

pub struct LogTail {
    command: String,
    reporter: Reporter,
}

impl LogTail {
    pub fn new(command: impl Into<String>, reporter: Reporter) -> Self {
        Self {
            command: command.into(),
            reporter,
        }
    }

    /// Spawn the command through `sh -c` and report its output until it
    /// exits or shutdown is broadcast.
    pub async fn run(self, shutdown: broadcast::Receiver<()>) -> std::io::Result<()> {
        tracing::info!(command = %self.command, app = %self.reporter.app(), "Starting log tail");

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdout(Stdio::piped())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let Some(stdout) = child.stdout.take() else {
            return Err(std::io::Error::other("child stdout was not captured"));
        };

        let shipped = forward_lines(BufReader::new(stdout), &self.reporter, shutdown).await;

        // Reap the child if it already exited; otherwise kill it.
        match child.try_wait()? {
            Some(status) => tracing::info!(%status, lines = shipped, "Log command exited"),
            None => {
                child.kill().await?;
                tracing::info!(lines = shipped, "Log command stopped");
            }
        }
        Ok(())
    }
}

/// Report every non-blank line of `reader`; returns the number delivered.
pub async fn forward_lines<R>(
    reader: R,
    reporter: &Reporter,
    mut shutdown: broadcast::Receiver<()>,
) -> usize
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut delivered = 0;

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match reporter.report_raw_log(&line).await {
                        Ok(()) => delivered += 1,
                        Err(e) => tracing::warn!(error = %e, "Log report failed, line dropped"),
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read command output");
                    break;
                }
            },
            _ = shutdown.recv() => {
                tracing::info!("Log tail received shutdown signal");
                break;
            }
        }
    }
    delivered
}
