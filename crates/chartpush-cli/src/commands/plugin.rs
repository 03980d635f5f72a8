use chartpush_helm::{HelmClient, PluginStatus};

use crate::HelmArgs;

/// Install the helm-s3 plugin, pinned or at the latest release.
pub async fn plugin(version: Option<&str>, helm: &HelmArgs) -> anyhow::Result<()> {
    let client = HelmClient::with_executor(helm.executor());
    let releases = helm.releases();

    match client.ensure_plugin(version, &releases).await? {
        PluginStatus::Installed(v) => println!("Installed helm-s3 {v}"),
        PluginStatus::AlreadyInstalled(v) => println!("helm-s3 {v} already installed"),
    }

    Ok(())
}
