use chartpush_core::{Inputs, PublishConfig};
use chartpush_helm::client::{CommandError, HelmClient, PluginError, PluginStatus};
use chartpush_helm::executor::HelmExecutor;
use chartpush_helm::helm::HelmError;
use chartpush_helm::publish::{PublishErrorKind, Publisher, Stage};
use chartpush_helm::release::{ReleaseError, ReleaseSource};
use mockall::{Sequence, mock};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

mock! {
    Executor {}

    impl HelmExecutor for Executor {
        async fn exec(&self, args: &[String]) -> Result<String, HelmError>;
        async fn exec_streaming(&self, args: &[String]) -> Result<(), HelmError>;
    }
}

mock! {
    Releases {}

    impl ReleaseSource for Releases {
        async fn latest_version(&self) -> Result<String, ReleaseError>;
    }
}

fn strings(a: &[&str]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

/// Lay out `<dir>/mychart/Chart.yaml`.
fn init_chart(dir: &Path) {
    std::fs::create_dir_all(dir.join("mychart")).unwrap();
    std::fs::write(
        dir.join("mychart/Chart.yaml"),
        "apiVersion: v2\nname: mychart\nversion: 0.1.0\n",
    )
    .unwrap();
}

fn scenario_config() -> PublishConfig {
    let inputs: Inputs = [
        ("repo", "s3://bucket/charts"),
        ("chart", "./mychart"),
        ("forceRelease", "false"),
        ("relativeUrls", "true"),
        ("version", "2.0.0"),
        ("helmS3Version", "0.16.2"),
    ]
    .into_iter()
    .collect();
    PublishConfig::from_inputs(&inputs).unwrap()
}

fn expect_empty_plugin_list(mock: &mut MockExecutor, seq: &mut Sequence) {
    mock.expect_exec()
        .withf(|args| args.to_vec() == ["plugin", "list"])
        .times(1)
        .in_sequence(seq)
        .returning(|_| Ok("NAME\tVERSION\tDESCRIPTION\n".to_owned()));
}

fn failed() -> HelmError {
    HelmError::CommandFailed {
        args: vec![],
        stderr: "exit code: exit status: 1".to_owned(),
    }
}

#[tokio::test]
async fn publish_runs_every_stage_in_order() {
    let tmp = TempDir::new().unwrap();
    init_chart(tmp.path());
    let config = scenario_config();

    let produced: PathBuf = tmp.path().join(".release/mychart-2.0.0.tgz");
    let expected_artifact = tmp
        .path()
        .canonicalize()
        .unwrap()
        .join(".release/mychart-2.0.0.tgz");
    let expected_push = vec![
        "s3".to_owned(),
        "push".to_owned(),
        expected_artifact.to_str().unwrap().to_owned(),
        "repo".to_owned(),
        "--ignore-if-exists".to_owned(),
        "--relative".to_owned(),
    ];

    let mut seq = Sequence::new();
    let mut mock = MockExecutor::new();
    expect_empty_plugin_list(&mut mock, &mut seq);
    mock.expect_exec_streaming()
        .withf(|args| {
            args.to_vec()
                == [
                    "plugin",
                    "install",
                    "https://github.com/hypnoglow/helm-s3.git",
                    "--version",
                    "0.16.2",
                ]
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    mock.expect_exec_streaming()
        .withf(|args| args.to_vec() == ["repo", "add", "repo", "s3://bucket/charts"])
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    mock.expect_exec_streaming()
        .withf(|args| {
            args.to_vec()
                == [
                    "package",
                    "./mychart",
                    "--dependency-update",
                    "--destination",
                    ".release/",
                    "--version",
                    "2.0.0",
                ]
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(move |_| {
            std::fs::write(&produced, b"chart").unwrap();
            Ok(())
        });
    mock.expect_exec_streaming()
        .withf(move |args| args.to_vec() == expected_push)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    let mut releases = MockReleases::new();
    releases.expect_latest_version().never();

    let client = HelmClient::with_executor(mock);
    let outcome = Publisher::new(&client, &releases, &config, tmp.path())
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.artifact, expected_artifact);
    assert_eq!(outcome.plugin, PluginStatus::Installed("0.16.2".to_owned()));
    assert_eq!(outcome.steps.len(), 4);
    assert!(tmp.path().join(".release").is_dir());
}

#[tokio::test]
async fn publish_without_plugin_version_installs_looked_up_release() {
    let tmp = TempDir::new().unwrap();
    init_chart(tmp.path());
    let config = PublishConfig {
        helm_s3_version: None,
        ..scenario_config()
    };
    let produced = tmp.path().join(".release/mychart-2.0.0.tgz");

    let mut seq = Sequence::new();
    let mut mock = MockExecutor::new();
    expect_empty_plugin_list(&mut mock, &mut seq);
    mock.expect_exec_streaming()
        .withf(|args| args.to_vec() == strings(&["plugin", "install", "https://github.com/hypnoglow/helm-s3.git", "--version", "0.17.1"]))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    mock.expect_exec_streaming()
        .withf(|args| args.first().map(String::as_str) == Some("repo"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    mock.expect_exec_streaming()
        .withf(|args| args.first().map(String::as_str) == Some("package"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(move |_| {
            std::fs::write(&produced, b"chart").unwrap();
            Ok(())
        });
    mock.expect_exec_streaming()
        .withf(|args| args.first().map(String::as_str) == Some("s3"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    let mut releases = MockReleases::new();
    releases
        .expect_latest_version()
        .times(1)
        .returning(|| Ok("0.17.1".to_owned()));

    let client = HelmClient::with_executor(mock);
    let outcome = Publisher::new(&client, &releases, &config, tmp.path())
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.plugin.version(), "0.17.1");
}

#[tokio::test]
async fn publish_lookup_failure_aborts_before_any_command() {
    let tmp = TempDir::new().unwrap();
    init_chart(tmp.path());
    let config = PublishConfig {
        helm_s3_version: None,
        ..scenario_config()
    };

    let mut mock = MockExecutor::new();
    mock.expect_exec().never();
    mock.expect_exec_streaming().never();

    let mut releases = MockReleases::new();
    releases.expect_latest_version().returning(|| {
        Err(ReleaseError::Status {
            url: "https://api.github.com/repos/hypnoglow/helm-s3/releases/latest".to_owned(),
            status: 502,
        })
    });

    let client = HelmClient::with_executor(mock);
    let err = Publisher::new(&client, &releases, &config, tmp.path())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Init);
    assert!(matches!(
        err.kind,
        PublishErrorKind::Plugin(PluginError::VersionLookup { .. })
    ));
}

#[tokio::test]
async fn publish_package_failure_skips_push() {
    let tmp = TempDir::new().unwrap();
    init_chart(tmp.path());
    let config = scenario_config();

    let mut mock = MockExecutor::new();
    mock.expect_exec()
        .returning(|_| Ok("NAME\tVERSION\tDESCRIPTION\ns3\t0.16.2\tS3\n".to_owned()));
    mock.expect_exec_streaming()
        .withf(|args| args.first().map(String::as_str) == Some("repo"))
        .times(1)
        .returning(|_| Ok(()));
    mock.expect_exec_streaming()
        .withf(|args| args.first().map(String::as_str) == Some("package"))
        .times(1)
        .returning(|_| Err(failed()));
    mock.expect_exec_streaming()
        .withf(|args| args.first().map(String::as_str) == Some("s3"))
        .never();

    let releases = MockReleases::new();
    let client = HelmClient::with_executor(mock);
    let err = Publisher::new(&client, &releases, &config, tmp.path())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::RepoRegistered);
    assert!(matches!(
        err.kind,
        PublishErrorKind::Command(CommandError::Package { .. })
    ));
}

#[tokio::test]
async fn publish_repo_add_failure_stops_after_plugin() {
    let tmp = TempDir::new().unwrap();
    init_chart(tmp.path());
    let config = scenario_config();

    let mut mock = MockExecutor::new();
    mock.expect_exec()
        .returning(|_| Ok("NAME\tVERSION\tDESCRIPTION\ns3\t0.16.2\tS3\n".to_owned()));
    mock.expect_exec_streaming()
        .withf(|args| args.first().map(String::as_str) == Some("repo"))
        .times(1)
        .returning(|_| Err(failed()));

    let releases = MockReleases::new();
    let client = HelmClient::with_executor(mock);
    let err = Publisher::new(&client, &releases, &config, tmp.path())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::PluginsInstalled);
    assert!(matches!(
        err.kind,
        PublishErrorKind::Command(CommandError::RepoAdd { .. })
    ));
    assert!(err.to_string().contains("plugins-installed"));
}

#[tokio::test]
async fn publish_without_version_uses_single_listed_artifact() {
    let tmp = TempDir::new().unwrap();
    init_chart(tmp.path());
    let config = PublishConfig {
        version: None,
        force_release: true,
        relative_urls: false,
        ..scenario_config()
    };
    let produced = tmp.path().join(".release/mychart-0.1.0.tgz");
    let expected = tmp
        .path()
        .canonicalize()
        .unwrap()
        .join(".release/mychart-0.1.0.tgz");
    let expected_str = expected.to_str().unwrap().to_owned();

    let mut mock = MockExecutor::new();
    mock.expect_exec()
        .returning(|_| Ok("NAME\tVERSION\tDESCRIPTION\ns3\t0.16.2\tS3\n".to_owned()));
    mock.expect_exec_streaming()
        .withf(|args| args.first().map(String::as_str) == Some("repo"))
        .returning(|_| Ok(()));
    mock.expect_exec_streaming()
        .withf(|args| {
            args.first().map(String::as_str) == Some("package")
                && !args.contains(&"--version".to_owned())
        })
        .times(1)
        .returning(move |_| {
            std::fs::write(&produced, b"chart").unwrap();
            Ok(())
        });
    mock.expect_exec_streaming()
        .withf(move |args| args.to_vec() == ["s3", "push", expected_str.as_str(), "repo", "--force"])
        .times(1)
        .returning(|_| Ok(()));

    let releases = MockReleases::new();
    let client = HelmClient::with_executor(mock);
    let outcome = Publisher::new(&client, &releases, &config, tmp.path())
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.artifact, expected);
    assert_eq!(
        outcome.plugin,
        PluginStatus::AlreadyInstalled("0.16.2".to_owned())
    );
}

#[tokio::test]
async fn publish_without_version_refuses_stale_artifacts() {
    let tmp = TempDir::new().unwrap();
    init_chart(tmp.path());
    std::fs::create_dir_all(tmp.path().join(".release")).unwrap();
    std::fs::write(tmp.path().join(".release/mychart-0.0.9.tgz"), b"stale").unwrap();
    let config = PublishConfig {
        version: None,
        ..scenario_config()
    };
    let produced = tmp.path().join(".release/mychart-0.1.0.tgz");

    let mut mock = MockExecutor::new();
    mock.expect_exec()
        .returning(|_| Ok("NAME\tVERSION\tDESCRIPTION\ns3\t0.16.2\tS3\n".to_owned()));
    mock.expect_exec_streaming()
        .withf(|args| args.first().map(String::as_str) == Some("repo"))
        .returning(|_| Ok(()));
    mock.expect_exec_streaming()
        .withf(|args| args.first().map(String::as_str) == Some("package"))
        .returning(move |_| {
            std::fs::write(&produced, b"chart").unwrap();
            Ok(())
        });
    mock.expect_exec_streaming()
        .withf(|args| args.first().map(String::as_str) == Some("s3"))
        .never();

    let releases = MockReleases::new();
    let client = HelmClient::with_executor(mock);
    let err = Publisher::new(&client, &releases, &config, tmp.path())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::RepoRegistered);
    assert!(matches!(
        err.kind,
        PublishErrorKind::Artifact(chartpush_core::Error::AmbiguousArtifact { .. })
    ));
}

#[tokio::test]
async fn publish_with_version_but_missing_chart_metadata_fails() {
    let tmp = TempDir::new().unwrap();
    let config = scenario_config();

    let mut mock = MockExecutor::new();
    mock.expect_exec()
        .returning(|_| Ok("NAME\tVERSION\tDESCRIPTION\ns3\t0.16.2\tS3\n".to_owned()));
    mock.expect_exec_streaming()
        .withf(|args| args.first().map(String::as_str) != Some("s3"))
        .returning(|_| Ok(()));
    mock.expect_exec_streaming()
        .withf(|args| args.first().map(String::as_str) == Some("s3"))
        .never();

    let releases = MockReleases::new();
    let client = HelmClient::with_executor(mock);
    let err = Publisher::new(&client, &releases, &config, tmp.path())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind,
        PublishErrorKind::Artifact(chartpush_core::Error::ChartMetadataRead { .. })
    ));
}
