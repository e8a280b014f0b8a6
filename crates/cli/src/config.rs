//! CLI configuration: defaults, then a config file, then `NANOSTORE_*`
//! environment variables, then flags

use anyhow::{Context, Result};
use nanostore_core::DashboardConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "NANOSTORE";

/// `<config dir>/nanostore/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("nanostore").join("config.toml"))
}

fn millis(duration: Duration) -> Result<i64> {
    i64::try_from(duration.as_millis()).context("duration out of range")
}

/// Load configuration.
///
/// An explicit `path` must exist; the default path is optional.
pub fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    let defaults = DashboardConfig::default();

    let mut builder = config::Config::builder()
        .set_default("api_origin", defaults.api_origin.clone())?
        .set_default("pubsub_topic", defaults.pubsub_topic.clone())?
        .set_default("robot_id", defaults.robot_id.clone())?
        .set_default("request_timeout", millis(defaults.request_timeout)?)?
        .set_default("live_status_interval", millis(defaults.live_status_interval)?)?
        .set_default("aggregate_interval", millis(defaults.aggregate_interval)?)?;

    match path {
        Some(path) => {
            builder = builder.add_source(config::File::from(path));
        }
        None => {
            if let Some(path) = default_config_path() {
                builder = builder.add_source(config::File::from(path).required(false));
            }
        }
    }

    let settings = builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()
        .context("failed to read configuration")?;
    let config: DashboardConfig = settings
        .try_deserialize()
        .context("invalid configuration")?;
    Ok(config)
}
