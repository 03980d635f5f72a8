use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;

use serde::Deserialize;

/// Alias under which the remote chart repository is registered with helm.
pub const REPO_ALIAS: &str = "repo";

/// Name of the optional local inputs file.
pub const INPUTS_FILE: &str = "chartpush.toml";

/// Input names understood by the publish step.
pub const INPUT_NAMES: &[&str] = &[
    "repo",
    "chart",
    "packageExtraArgs",
    "version",
    "helmS3Version",
    "forceRelease",
    "relativeUrls",
];

/// Environment variable carrying an input, following the GitHub Actions
/// convention: `packageExtraArgs` → `INPUT_PACKAGEEXTRAARGS`.
pub fn input_env_var(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

/// Raw step inputs, keyed by input name.
///
/// Values are layered: `chartpush.toml` first, then `INPUT_*` environment
/// variables, then explicit [`Inputs::set`] calls (CLI flags).
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    values: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct InputsFile {
    #[serde(default)]
    inputs: BTreeMap<String, toml::Value>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `chartpush.toml` from `dir` (if present) and overlay the process
    /// environment.
    pub fn load(dir: &Path) -> crate::Result<Self> {
        let mut inputs = Self::from_file(dir)?;
        let vars = INPUT_NAMES.iter().filter_map(|name| {
            let key = input_env_var(name);
            std::env::var_os(&key).map(|value| (key, value))
        });
        inputs.merge_env(vars)?;
        Ok(inputs)
    }

    /// Read the `[inputs]` table of `chartpush.toml`, or return no inputs if
    /// the file does not exist.
    pub fn from_file(dir: &Path) -> crate::Result<Self> {
        let path = dir.join(INPUTS_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| crate::Error::InputsLoad {
            path: path.clone(),
            source: e,
        })?;
        let file: InputsFile = toml::from_str(&content).map_err(|e| crate::Error::InputsParse {
            path: path.clone(),
            source: e,
        })?;

        let values = file
            .inputs
            .into_iter()
            .map(|(name, value)| {
                let value = match value {
                    toml::Value::String(s) => s,
                    other => other.to_string(),
                };
                (name, value)
            })
            .collect();

        tracing::debug!(path = %path.display(), "loaded inputs file");
        Ok(Self { values })
    }

    /// Overlay `INPUT_*` variables for every known input name.
    ///
    /// # Errors
    ///
    /// [`Error::InputNotUnicode`](crate::Error::InputNotUnicode) if a known
    /// variable holds a non-UTF-8 value.
    pub fn merge_env<I, V>(&mut self, vars: I) -> crate::Result<()>
    where
        I: IntoIterator<Item = (String, V)>,
        V: Into<OsString>,
    {
        let vars: BTreeMap<String, OsString> =
            vars.into_iter().map(|(k, v)| (k, v.into())).collect();
        for name in INPUT_NAMES {
            let var = input_env_var(name);
            let Some(raw) = vars.get(&var) else {
                continue;
            };
            let value = raw.to_str().ok_or_else(|| crate::Error::InputNotUnicode {
                name: (*name).to_owned(),
                var: var.clone(),
            })?;
            self.values.insert((*name).to_owned(), value.to_owned());
        }
        Ok(())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Look up an input. Values are trimmed; a blank value counts as absent.
    ///
    /// # Errors
    ///
    /// [`Error::MissingInput`](crate::Error::MissingInput) if `required` and
    /// the input is absent or blank.
    pub fn get(&self, name: &str, required: bool) -> crate::Result<Option<&str>> {
        let value = self
            .values
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty());

        match value {
            None if required => Err(crate::Error::MissingInput {
                name: name.to_owned(),
            }),
            other => Ok(other),
        }
    }

    /// Look up a boolean input. Only the literal `"true"` is true.
    pub fn get_bool(&self, name: &str, required: bool) -> crate::Result<bool> {
        Ok(self.get(name, required)? == Some("true"))
    }
}

impl<K, V> FromIterator<(K, V)> for Inputs
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Validated configuration for one publish run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    /// Remote repository URL, e.g. `s3://bucket/charts`
    pub repo: String,
    /// Local chart directory, passed to helm as given
    pub chart: String,
    /// Extra tokens appended to `helm package`
    pub package_extra_args: Vec<String>,
    /// Explicit chart version; `None` defers to Chart.yaml
    pub version: Option<String>,
    /// Pinned helm-s3 plugin version; `None` means latest
    pub helm_s3_version: Option<String>,
    /// Overwrite an existing chart version instead of skipping it
    pub force_release: bool,
    /// Publish relative URLs in the repository index
    pub relative_urls: bool,
}

impl PublishConfig {
    /// Read and validate every input. Fails on the first missing required
    /// input, before anything is executed.
    pub fn from_inputs(inputs: &Inputs) -> crate::Result<Self> {
        let repo = inputs.get("repo", true)?.unwrap_or_default().to_owned();
        let chart = inputs.get("chart", true)?.unwrap_or_default().to_owned();
        let package_extra_args = inputs
            .get("packageExtraArgs", false)?
            .map(split_extra_args)
            .unwrap_or_default();
        let version = inputs.get("version", false)?.map(str::to_owned);
        let helm_s3_version = inputs.get("helmS3Version", false)?.map(str::to_owned);
        let force_release = inputs.get_bool("forceRelease", true)?;
        let relative_urls = inputs.get_bool("relativeUrls", true)?;

        Ok(Self {
            repo,
            chart,
            package_extra_args,
            version,
            helm_s3_version,
            force_release,
            relative_urls,
        })
    }

    pub fn chart_dir(&self) -> &Path {
        Path::new(&self.chart)
    }
}

/// Split an argument string on runs of whitespace. Never yields empty tokens.
pub fn split_extra_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_owned).collect()
}
