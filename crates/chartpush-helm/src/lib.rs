//! helm operations for chartpush.
//!
//! # Publish pipeline
//!
//! ```text
//! chartpush publish
//!   0. Init         ── mkdir -p .release/
//!   1. Plugin       ── helm plugin list / helm plugin install helm-s3
//!   2. Repository   ── helm repo add repo <url>
//!   3. Package      ── helm package <chart> --dependency-update --destination .release/
//!   4. Push         ── helm s3 push <artifact> repo
//! ```
//!
//! Every helm invocation goes through [`HelmExecutor`], so the pipeline can
//! be driven by a mock in tests.

pub mod args;
pub mod client;
pub mod executor;
pub mod helm;
pub mod publish;
pub mod release;

pub use client::{CommandError, HelmClient, InstalledPlugin, PluginError, PluginStatus};
pub use executor::{HelmExecutor, RealExecutor};
pub use helm::HelmError;
pub use publish::{PublishError, PublishErrorKind, PublishOutcome, Publisher, Stage};
pub use release::{GitHubReleases, ReleaseError, ReleaseSource};
