//! Tool execution abstraction
//!
//! The pipeline never spawns processes directly; it goes through
//! [`ToolExecutor`] so tests can substitute canned output. The production
//! implementation feeds the full buffer text to the child over stdin so
//! unsaved edits are visible to the tool, and captures stdout and stderr
//! separately.

use std::io;
use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Captured result of one tool invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs a command with arguments and environment, feeding `stdin` to the
/// child and returning its captured output.
#[async_trait::async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(
        &self,
        program: &Path,
        args: &[String],
        env: &[(String, String)],
        stdin: &str,
    ) -> io::Result<ToolOutput>;
}

/// Production executor backed by `tokio::process`.
#[derive(Debug, Default)]
pub struct TokioExecutor;

#[async_trait::async_trait]
impl ToolExecutor for TokioExecutor {
    async fn execute(
        &self,
        program: &Path,
        args: &[String],
        env: &[(String, String)],
        stdin: &str,
    ) -> io::Result<ToolOutput> {
        debug!("executing {} {:?}", program.display(), args);

        let mut child = Command::new(program)
            .args(args)
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut pipe) = child.stdin.take() {
            pipe.write_all(stdin.as_bytes()).await?;
            pipe.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        Ok(ToolOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
