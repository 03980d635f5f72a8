use chartpush_core::{Inputs, PublishConfig};
use chartpush_helm::{HelmClient, Publisher};
use std::path::PathBuf;

use crate::{HelmArgs, InputArgs, actions};

/// Package the chart and push it to the S3 repository.
pub async fn publish(overrides: InputArgs, helm: &HelmArgs) -> anyhow::Result<()> {
    let work_dir = PathBuf::from(".");

    // Inputs are validated up front; nothing runs if one is missing.
    let mut inputs = Inputs::load(&work_dir)?;
    overrides.apply(&mut inputs);
    let config = PublishConfig::from_inputs(&inputs)?;
    tracing::debug!(?config, "publish configuration");

    let client = HelmClient::with_executor(helm.executor().with_current_dir(&work_dir));
    let releases = helm.releases();

    println!("Publishing {} to {}...", config.chart, config.repo);
    let outcome = Publisher::new(&client, &releases, &config, &work_dir)
        .run()
        .await?;

    println!();
    for step in &outcome.steps {
        println!("  {step}");
    }

    actions::set_output("artifact", &outcome.artifact.display().to_string())?;
    actions::set_output("helm-s3-version", outcome.plugin.version())?;

    Ok(())
}
