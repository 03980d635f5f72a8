//! Release directory management and packaged-chart discovery.
//!
//! `helm package` writes into [`RELEASE_DIR`]. After packaging, the artifact
//! is found one of two ways:
//!
//! - [`predict_artifact`]: `{name}-{version}.tgz` from Chart.yaml and the
//!   configured version. Exact, but needs a version.
//! - [`find_single_artifact`]: the only file in the release directory.
//!   Refuses to guess when several files are present.

use std::path::{Path, PathBuf};

use crate::chart::ChartMeta;

/// Destination directory handed to `helm package --destination`.
pub const RELEASE_DIR: &str = ".release/";

/// Create the release directory under `work_dir` if it does not exist.
pub fn ensure_release_dir(work_dir: &Path) -> crate::Result<PathBuf> {
    let release_dir = work_dir.join(RELEASE_DIR);
    std::fs::create_dir_all(&release_dir).map_err(|e| crate::Error::ReleaseDir {
        path: release_dir.clone(),
        source: e,
    })?;
    Ok(release_dir)
}

/// Predict the artifact path from chart metadata and return it as an
/// absolute path.
///
/// # Errors
///
/// - [`Error::MissingVersion`](crate::Error::MissingVersion) if `version` is `None`
/// - [`Error::NoArtifactProduced`](crate::Error::NoArtifactProduced) if the predicted file does not exist
pub fn predict_artifact(
    release_dir: &Path,
    chart: &ChartMeta,
    version: Option<&str>,
) -> crate::Result<PathBuf> {
    let version = version.ok_or_else(|| crate::Error::MissingVersion {
        chart: chart.name.clone(),
    })?;

    let path = release_dir.join(chart.archive_name(version));
    if !path.is_file() {
        return Err(crate::Error::NoArtifactProduced(path));
    }

    path.canonicalize()
        .map_err(|e| crate::Error::ReleaseDir { path, source: e })
}

/// Return the absolute path of the single file in `release_dir`.
///
/// # Errors
///
/// - [`Error::NoArtifactProduced`](crate::Error::NoArtifactProduced) if the directory holds no files
/// - [`Error::AmbiguousArtifact`](crate::Error::AmbiguousArtifact) if it holds more than one
pub fn find_single_artifact(release_dir: &Path) -> crate::Result<PathBuf> {
    let entries = std::fs::read_dir(release_dir).map_err(|e| crate::Error::ReleaseDir {
        path: release_dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| crate::Error::ReleaseDir {
            path: release_dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        } else {
            tracing::debug!(path = %path.display(), "skipping non-file entry in release directory");
        }
    }
    files.sort();

    match files.len() {
        0 => Err(crate::Error::NoArtifactProduced(release_dir.to_path_buf())),
        1 => {
            let path = files.remove(0);
            path.canonicalize()
                .map_err(|e| crate::Error::ReleaseDir { path, source: e })
        }
        _ => Err(crate::Error::AmbiguousArtifact {
            dir: release_dir.to_path_buf(),
            candidates: files,
        }),
    }
}
