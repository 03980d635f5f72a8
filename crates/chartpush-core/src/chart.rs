use serde::Deserialize;
use std::path::Path;

/// Chart descriptor file inside a chart directory.
pub const CHART_FILE: &str = "Chart.yaml";

/// Metadata extracted from a chart's Chart.yaml
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartMeta {
    pub name: String,
    pub version: Option<String>,
}

#[derive(Deserialize)]
struct ChartYaml {
    name: Option<String>,
    version: Option<serde_yaml::Value>,
}

impl ChartMeta {
    /// Read chart metadata from `<chart_dir>/Chart.yaml`.
    pub fn from_chart_dir(chart_dir: &Path) -> crate::Result<Self> {
        let path = chart_dir.join(CHART_FILE);
        let content =
            std::fs::read_to_string(&path).map_err(|e| crate::Error::ChartMetadataRead {
                path: path.clone(),
                source: e,
            })?;

        let parsed: ChartYaml =
            serde_yaml::from_str(&content).map_err(|e| crate::Error::ChartMetadataParse {
                path: path.clone(),
                source: e,
            })?;

        let name = parsed
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| crate::Error::MissingChartName(path.clone()))?;

        // `version: 1.0` parses as a float in YAML; keep its textual form.
        let version = parsed.version.and_then(|v| match v {
            serde_yaml::Value::String(s) => Some(s),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        tracing::debug!(name = %name, version = ?version, "chart metadata loaded");
        Ok(Self { name, version })
    }

    /// File name `helm package` gives this chart at `version`.
    pub fn archive_name(&self, version: &str) -> String {
        format!("{}-{}.tgz", self.name, version)
    }
}
