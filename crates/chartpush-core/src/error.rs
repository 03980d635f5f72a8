use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── Inputs ──
    #[error("input required and not supplied: {name}")]
    MissingInput { name: String },

    #[error("input {name} ({var}) is not valid UTF-8")]
    InputNotUnicode { name: String, var: String },

    #[error("failed to load inputs from {path}")]
    InputsLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse inputs at {path}")]
    InputsParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    // ── Chart metadata ──
    #[error("failed to read chart metadata at {path}")]
    ChartMetadataRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse chart metadata at {path}")]
    ChartMetadataParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("chart metadata at {0} has no `name` field")]
    MissingChartName(PathBuf),

    #[error("cannot predict the artifact name for chart '{chart}' without a version")]
    MissingVersion { chart: String },

    // ── Release directory ──
    #[error("failed to access release directory {path}")]
    ReleaseDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no chart artifact found at {0}; did `helm package` produce one?")]
    NoArtifactProduced(PathBuf),

    #[error(
        "multiple artifacts in {dir}: {}; remove stale packages or set an explicit version",
        format_candidates(candidates)
    )]
    AmbiguousArtifact {
        dir: PathBuf,
        candidates: Vec<PathBuf>,
    },
}

fn format_candidates(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(", ")
}
