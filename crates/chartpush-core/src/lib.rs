//! Core types and configuration for chartpush.
//!
//! This crate reads the step inputs into a validated [`PublishConfig`],
//! parses chart metadata from `Chart.yaml` ([`ChartMeta`]), and finds the
//! packaged chart inside the release directory ([`artifact`]).

pub mod artifact;
pub mod chart;
pub mod config;
pub mod error;

pub use artifact::{RELEASE_DIR, ensure_release_dir, find_single_artifact, predict_artifact};
pub use chart::ChartMeta;
pub use config::{INPUT_NAMES, Inputs, PublishConfig, REPO_ALIAS, input_env_var, split_extra_args};
pub use error::{Error, Result};
