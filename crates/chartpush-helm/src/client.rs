use crate::args::{self, InvalidPath};
use crate::executor::{HelmExecutor, RealExecutor};
use crate::helm::HelmError;
use crate::release::{ReleaseError, ReleaseSource, normalize_version};
use chartpush_core::PublishConfig;
use std::path::Path;

/// helm operations client, parameterized over the executor for testability.
pub struct HelmClient<E: HelmExecutor = RealExecutor> {
    executor: E,
}

impl HelmClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor::new(),
        }
    }
}

impl Default for HelmClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: HelmExecutor> HelmClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    // ── Plugins ──

    pub async fn installed_plugins(&self) -> Result<Vec<InstalledPlugin>, PluginError> {
        let output = self
            .executor
            .exec(&args::plugin_list_args())
            .await
            .map_err(|e| PluginError::List { source: e })?;

        Ok(parse_plugin_list(&output))
    }

    /// Make sure helm-s3 is installed at `explicit_version`, or at the latest
    /// release when no version is pinned.
    ///
    /// The version is resolved before anything runs, so a failed lookup
    /// leaves helm untouched.
    pub async fn ensure_plugin<R: ReleaseSource>(
        &self,
        explicit_version: Option<&str>,
        releases: &R,
    ) -> Result<PluginStatus, PluginError> {
        let version = match explicit_version {
            Some(v) => normalize_version(v).to_owned(),
            None => {
                let latest = releases
                    .latest_version()
                    .await
                    .map_err(|e| PluginError::VersionLookup { source: e })?;
                tracing::info!(version = %latest, "resolved latest helm-s3 release");
                latest
            }
        };

        let already = self
            .installed_plugins()
            .await?
            .into_iter()
            .find(|p| p.name == args::HELM_S3_PLUGIN_NAME);

        match already {
            Some(p) if normalize_version(&p.version) == version => {
                tracing::info!(%version, "helm-s3 already installed");
                return Ok(PluginStatus::AlreadyInstalled(version));
            }
            Some(p) => {
                tracing::warn!(
                    installed = %p.version,
                    wanted = %version,
                    "replacing installed helm-s3"
                );
                self.executor
                    .exec_streaming(&args::plugin_uninstall_args())
                    .await
                    .map_err(|e| PluginError::Uninstall {
                        installed: p.version.clone(),
                        source: e,
                    })?;
            }
            None => {}
        }

        self.executor
            .exec_streaming(&args::plugin_install_args(&version))
            .await
            .map_err(|e| PluginError::Install {
                version: version.clone(),
                source: e,
            })?;

        Ok(PluginStatus::Installed(version))
    }

    // ── Repository ──

    pub async fn add_repo(&self, config: &PublishConfig) -> Result<(), CommandError> {
        self.executor
            .exec_streaming(&args::repo_add_args(config))
            .await
            .map_err(|e| CommandError::RepoAdd { source: e })
    }

    // ── Package / Push ──

    pub async fn package(&self, config: &PublishConfig) -> Result<(), CommandError> {
        let cmd = args::package_args(config);
        tracing::debug!(args = ?cmd, "packaging chart");

        self.executor
            .exec_streaming(&cmd)
            .await
            .map_err(|e| CommandError::Package { source: e })
    }

    pub async fn push(&self, config: &PublishConfig, artifact: &Path) -> Result<(), CommandError> {
        let cmd = args::push_args(config, artifact)?;
        tracing::debug!(args = ?cmd, "pushing chart");

        self.executor
            .exec_streaming(&cmd)
            .await
            .map_err(|e| CommandError::Push { source: e })
    }
}

// ── Plugin list parsing ──

/// A row of `helm plugin list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPlugin {
    pub name: String,
    pub version: String,
}

/// Parse `helm plugin list` output:
///
/// ```text
/// NAME    VERSION DESCRIPTION
/// s3      0.16.2  Provides AWS S3 protocol support for charts and repos.
/// ```
pub fn parse_plugin_list(output: &str) -> Vec<InstalledPlugin> {
    output
        .lines()
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let name = cols.next()?;
            let version = cols.next()?;
            if name == "NAME" && version == "VERSION" {
                return None;
            }
            Some(InstalledPlugin {
                name: name.to_owned(),
                version: version.to_owned(),
            })
        })
        .collect()
}

// ── Result / error types ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginStatus {
    /// helm-s3 was installed by this run.
    Installed(String),
    /// The requested version was already present.
    AlreadyInstalled(String),
}

impl PluginStatus {
    pub fn version(&self) -> &str {
        match self {
            Self::Installed(v) | Self::AlreadyInstalled(v) => v,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("failed to look up the latest helm-s3 version")]
    VersionLookup { source: ReleaseError },

    #[error("failed to list installed helm plugins")]
    List { source: HelmError },

    #[error("failed to remove helm-s3 {installed}")]
    Uninstall { installed: String, source: HelmError },

    #[error("failed to install helm-s3 {version}")]
    Install { version: String, source: HelmError },
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to register chart repository")]
    RepoAdd { source: HelmError },

    #[error("failed to package chart")]
    Package { source: HelmError },

    #[error("failed to push chart")]
    Push { source: HelmError },

    #[error(transparent)]
    InvalidPath(#[from] InvalidPath),
}
