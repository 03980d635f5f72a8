use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use crate::helm::HelmError;

/// Abstraction over helm CLI execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait HelmExecutor: Send + Sync {
    /// Execute a helm command and capture stdout.
    async fn exec(&self, args: &[String]) -> Result<String, HelmError>;

    /// Execute a helm command, streaming output to the terminal.
    async fn exec_streaming(&self, args: &[String]) -> Result<(), HelmError>;
}

/// Real helm CLI executor.
#[derive(Debug, Clone)]
pub struct RealExecutor {
    program: PathBuf,
    current_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl RealExecutor {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("helm"),
            current_dir: None,
            timeout: None,
        }
    }

    /// Run a different helm binary (absolute path or name on `PATH`).
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Run helm in `dir` instead of the current directory.
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Kill any helm command still running after `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, args: &[String]) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(args).kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    async fn bounded<T, F>(&self, args: &[String], fut: F) -> Result<T, HelmError>
    where
        F: Future<Output = std::io::Result<T>>,
    {
        let result = match self.timeout {
            Some(after) => tokio::time::timeout(after, fut)
                .await
                .map_err(|elapsed| {
                    tracing::debug!(%elapsed, ?args, "killing helm");
                    HelmError::TimedOut {
                        args: args.to_vec(),
                        after,
                    }
                })?,
            None => fut.await,
        };

        result.map_err(|e| HelmError::NotFound {
            program: self.program.clone(),
            source: e,
        })
    }
}

impl Default for RealExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl HelmExecutor for RealExecutor {
    async fn exec(&self, args: &[String]) -> Result<String, HelmError> {
        tracing::debug!(program = %self.program.display(), ?args, "exec");

        let mut cmd = self.command(args);
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        let output = self.bounded(args, cmd.output()).await?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|e| HelmError::InvalidUtf8 { source: e })
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            Err(HelmError::CommandFailed {
                args: args.to_vec(),
                stderr,
            })
        }
    }

    async fn exec_streaming(&self, args: &[String]) -> Result<(), HelmError> {
        tracing::debug!(program = %self.program.display(), ?args, "exec (streaming)");

        let mut cmd = self.command(args);
        cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        let status = self.bounded(args, cmd.status()).await?;

        if status.success() {
            Ok(())
        } else {
            Err(HelmError::CommandFailed {
                args: args.to_vec(),
                stderr: format!("exit code: {status}"),
            })
        }
    }
}
