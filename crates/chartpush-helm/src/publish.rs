//! The publish state machine.
//!
//! ```text
//! Init → PluginsInstalled → RepoRegistered → Packaged → Pushed
//!   └──────────┴─────────────────┴──────────────┴──→ Failed
//! ```
//!
//! Stages run strictly in order. The first error stops the run and is
//! returned together with the last stage reached. Nothing is rolled back:
//! an installed plugin or registered repository stays in place.

use std::fmt;
use std::path::{Path, PathBuf};

use chartpush_core::{
    ChartMeta, PublishConfig, ensure_release_dir, find_single_artifact, predict_artifact,
};

use crate::client::{CommandError, HelmClient, PluginError, PluginStatus};
use crate::executor::HelmExecutor;
use crate::release::ReleaseSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    PluginsInstalled,
    RepoRegistered,
    Packaged,
    Pushed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::PluginsInstalled => "plugins-installed",
            Self::RepoRegistered => "repo-registered",
            Self::Packaged => "packaged",
            Self::Pushed => "pushed",
        };
        f.write_str(name)
    }
}

/// Result of a successful publish run.
#[derive(Debug)]
pub struct PublishOutcome {
    pub artifact: PathBuf,
    pub plugin: PluginStatus,
    pub steps: Vec<String>,
}

/// Drives one publish run from `Init` to `Pushed`.
pub struct Publisher<'a, E: HelmExecutor, R: ReleaseSource> {
    client: &'a HelmClient<E>,
    releases: &'a R,
    config: &'a PublishConfig,
    work_dir: PathBuf,
    stage: Stage,
    steps: Vec<String>,
}

impl<'a, E: HelmExecutor, R: ReleaseSource> Publisher<'a, E, R> {
    /// `.release/` and relative chart paths are resolved against `work_dir`.
    /// The client's executor must run helm in the same directory, e.g.
    /// [`RealExecutor::with_current_dir`](crate::RealExecutor::with_current_dir).
    pub fn new(
        client: &'a HelmClient<E>,
        releases: &'a R,
        config: &'a PublishConfig,
        work_dir: &Path,
    ) -> Self {
        Self {
            client,
            releases,
            config,
            work_dir: work_dir.to_path_buf(),
            stage: Stage::Init,
            steps: Vec::new(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub async fn run(mut self) -> Result<PublishOutcome, PublishError> {
        let release_dir = ensure_release_dir(&self.work_dir).map_err(|e| self.fail(e))?;

        let plugin = self
            .client
            .ensure_plugin(self.config.helm_s3_version.as_deref(), self.releases)
            .await
            .map_err(|e| self.fail(e))?;
        let step = match &plugin {
            PluginStatus::Installed(v) => format!("helm-s3 {v} installed"),
            PluginStatus::AlreadyInstalled(v) => format!("helm-s3 {v} already installed"),
        };
        self.advance(Stage::PluginsInstalled, step);

        self.client
            .add_repo(self.config)
            .await
            .map_err(|e| self.fail(e))?;
        self.advance(
            Stage::RepoRegistered,
            format!("Repository {} registered", self.config.repo),
        );

        self.client
            .package(self.config)
            .await
            .map_err(|e| self.fail(e))?;
        let artifact = self.locate_artifact(&release_dir).map_err(|e| self.fail(e))?;
        self.advance(
            Stage::Packaged,
            format!("Chart packaged: {}", artifact.display()),
        );

        self.client
            .push(self.config, &artifact)
            .await
            .map_err(|e| self.fail(e))?;
        self.advance(Stage::Pushed, format!("Pushed to {}", self.config.repo));

        Ok(PublishOutcome {
            artifact,
            plugin,
            steps: self.steps,
        })
    }

    /// An explicit version pins the file name, so it is predicted from
    /// Chart.yaml. Without one, helm picks the version and the release
    /// directory must hold exactly one file.
    fn locate_artifact(&self, release_dir: &Path) -> chartpush_core::Result<PathBuf> {
        match self.config.version.as_deref() {
            Some(version) => {
                let chart = ChartMeta::from_chart_dir(&self.work_dir.join(self.config.chart_dir()))?;
                predict_artifact(release_dir, &chart, Some(version))
            }
            None => find_single_artifact(release_dir),
        }
    }

    fn advance(&mut self, stage: Stage, step: String) {
        tracing::info!(from = %self.stage, to = %stage, "{step}");
        self.stage = stage;
        self.steps.push(step);
    }

    fn fail(&self, kind: impl Into<PublishErrorKind>) -> PublishError {
        PublishError {
            stage: self.stage,
            kind: kind.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("publish aborted after stage '{stage}'")]
pub struct PublishError {
    /// Last stage completed before the failure.
    pub stage: Stage,
    #[source]
    pub kind: PublishErrorKind,
}

#[derive(Debug, thiserror::Error)]
pub enum PublishErrorKind {
    #[error(transparent)]
    Artifact(#[from] chartpush_core::Error),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Command(#[from] CommandError),
}
