use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum HelmError {
    #[error("failed to run {program}; install helm from https://helm.sh/docs/intro/install/")]
    NotFound {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("helm command failed: {args:?}\n{stderr}")]
    CommandFailed { args: Vec<String>, stderr: String },

    #[error("helm output was not valid UTF-8")]
    InvalidUtf8 { source: std::string::FromUtf8Error },

    #[error("helm command timed out after {}s: {args:?}", after.as_secs())]
    TimedOut { args: Vec<String>, after: Duration },
}
