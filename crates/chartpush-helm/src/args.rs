//! Argument lists for each helm invocation.
//!
//! These are pure functions: they only turn configuration into tokens.

use std::path::{Path, PathBuf};

use chartpush_core::{PublishConfig, RELEASE_DIR, REPO_ALIAS};

/// Source the helm-s3 plugin is installed from.
pub const HELM_S3_PLUGIN_URL: &str = "https://github.com/hypnoglow/helm-s3.git";

/// Name helm lists the helm-s3 plugin under.
pub const HELM_S3_PLUGIN_NAME: &str = "s3";

pub fn plugin_list_args() -> Vec<String> {
    args(["plugin", "list"])
}

pub fn plugin_install_args(version: &str) -> Vec<String> {
    args([
        "plugin",
        "install",
        HELM_S3_PLUGIN_URL,
        "--version",
        version,
    ])
}

pub fn plugin_uninstall_args() -> Vec<String> {
    args(["plugin", "uninstall", HELM_S3_PLUGIN_NAME])
}

/// `helm repo add repo <url>`
pub fn repo_add_args(config: &PublishConfig) -> Vec<String> {
    args(["repo", "add", REPO_ALIAS, &config.repo])
}

/// `helm package <chart> --dependency-update --destination .release/ [extra...] [--version <v>]`
pub fn package_args(config: &PublishConfig) -> Vec<String> {
    let mut cmd = args([
        "package",
        &config.chart,
        "--dependency-update",
        "--destination",
        RELEASE_DIR,
    ]);

    cmd.extend(config.package_extra_args.iter().cloned());

    if let Some(version) = &config.version {
        cmd.push("--version".to_owned());
        cmd.push(version.clone());
    }

    cmd
}

/// `helm s3 push <artifact> repo (--force | --ignore-if-exists) [--relative]`
pub fn push_args(config: &PublishConfig, artifact: &Path) -> Result<Vec<String>, InvalidPath> {
    let artifact_str = artifact
        .to_str()
        .ok_or_else(|| InvalidPath(artifact.to_path_buf()))?;

    let mut cmd = args(["s3", "push", artifact_str, REPO_ALIAS]);

    if config.force_release {
        cmd.push("--force".to_owned());
    } else {
        cmd.push("--ignore-if-exists".to_owned());
    }

    if config.relative_urls {
        cmd.push("--relative".to_owned());
    }

    Ok(cmd)
}

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

#[derive(Debug, thiserror::Error)]
#[error("artifact path is not valid UTF-8: {}", .0.display())]
pub struct InvalidPath(pub PathBuf);
