//! GitHub Actions workflow commands.
//!
//! Outside of Actions these degrade to plain stderr output.

use std::io::Write;

/// Whether we are running inside a GitHub Actions job.
pub(crate) fn is_actions() -> bool {
    std::env::var_os("GITHUB_ACTIONS").is_some_and(|v| v == "true")
}

/// Escape a message for use in a workflow command.
pub(crate) fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Print the error chain and, in Actions, an `::error::` annotation that
/// marks the step as failed.
pub(crate) fn report_failure(err: &anyhow::Error) {
    eprintln!("Error: {err:?}");
    if is_actions() {
        println!("::error::{}", escape_data(&format!("{err:#}")));
    }
}

/// Append `name=value` to the file named by `GITHUB_OUTPUT`, if set.
/// `value` must be a single line.
pub(crate) fn set_output(name: &str, value: &str) -> anyhow::Result<()> {
    let Some(path) = std::env::var_os("GITHUB_OUTPUT").filter(|p| !p.is_empty()) else {
        return Ok(());
    };

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    writeln!(file, "{name}={value}")?;

    tracing::debug!(%name, %value, "step output set");
    Ok(())
}
