mod actions;
mod commands;

use std::process::ExitCode;
use std::time::Duration;

use chartpush_core::Inputs;
use chartpush_helm::release::GITHUB_API_BASE;
use chartpush_helm::{GitHubReleases, RealExecutor};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "chartpush",
    about = "Package a Helm chart and publish it to an S3 chart repository"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Package the chart and push it to the S3 repository
    ///
    /// Inputs are read from chartpush.toml, then INPUT_* environment
    /// variables, then these flags.
    Publish {
        #[command(flatten)]
        inputs: InputArgs,
        #[command(flatten)]
        helm: HelmArgs,
    },
    /// Install the helm-s3 plugin without publishing
    Plugin {
        /// helm-s3 version to install (default: latest release)
        #[arg(long)]
        helm_s3_version: Option<String>,
        #[command(flatten)]
        helm: HelmArgs,
    },
}

/// Flags overriding step inputs.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Chart repository URL, e.g. s3://bucket/charts
    #[arg(long)]
    repo: Option<String>,
    /// Path to the chart directory
    #[arg(long)]
    chart: Option<String>,
    /// Extra arguments for `helm package`, split on whitespace
    #[arg(long, allow_hyphen_values = true)]
    package_extra_args: Option<String>,
    /// Chart version to package (default: version in Chart.yaml)
    #[arg(long)]
    chart_version: Option<String>,
    /// helm-s3 version to install (default: latest release)
    #[arg(long)]
    helm_s3_version: Option<String>,
    /// Overwrite the chart if the version already exists
    #[arg(long, value_name = "BOOL")]
    force_release: Option<bool>,
    /// Use relative URLs in the repository index
    #[arg(long, value_name = "BOOL")]
    relative_urls: Option<bool>,
}

impl InputArgs {
    pub fn apply(self, inputs: &mut Inputs) {
        let overrides = [
            ("repo", self.repo),
            ("chart", self.chart),
            ("packageExtraArgs", self.package_extra_args),
            ("version", self.chart_version),
            ("helmS3Version", self.helm_s3_version),
            ("forceRelease", self.force_release.map(|b| b.to_string())),
            ("relativeUrls", self.relative_urls.map(|b| b.to_string())),
        ];
        for (name, value) in overrides {
            if let Some(value) = value {
                inputs.set(name, value);
            }
        }
    }
}

/// How helm and the release index are reached.
#[derive(Args, Debug)]
pub struct HelmArgs {
    /// helm binary to run
    #[arg(long, env = "HELM_BIN", default_value = "helm")]
    helm_bin: String,
    /// Kill any helm command running longer than this many seconds
    #[arg(long, value_name = "SECS")]
    command_timeout: Option<u64>,
    /// GitHub API used to look up the latest helm-s3 release
    #[arg(long, env = "CHARTPUSH_GITHUB_API_URL", default_value = GITHUB_API_BASE)]
    github_api_url: String,
    /// Token for the GitHub API (avoids anonymous rate limits)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,
}

impl HelmArgs {
    pub fn executor(&self) -> RealExecutor {
        RealExecutor::new()
            .with_program(&self.helm_bin)
            .with_timeout(self.command_timeout.map(Duration::from_secs))
    }

    pub fn releases(&self) -> GitHubReleases {
        GitHubReleases::new()
            .with_api_base(&self.github_api_url)
            .with_token(self.github_token.clone())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Publish { inputs, helm } => commands::publish(inputs, &helm).await,
        Commands::Plugin {
            helm_s3_version,
            helm,
        } => commands::plugin(helm_s3_version.as_deref(), &helm).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            actions::report_failure(&e);
            ExitCode::FAILURE
        }
    }
}
