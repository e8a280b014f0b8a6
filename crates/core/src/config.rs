//! Dashboard configuration

use crate::error::{CoreError, CoreResult};
use crate::poll::{AGGREGATES_INTERVAL, LIVE_STATUS_INTERVAL};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_ORIGIN: &str = "https://amsstores1.leapmile.com";
pub const DEFAULT_ROBOT_ID: &str = "AMSSTORES1-Nano";
pub const DEFAULT_PUBSUB_TOPIC: &str = "amsstores1_AMSSTORES1-Nano";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Scheme and host every endpoint is resolved against
    pub api_origin: String,
    pub pubsub_topic: String,
    pub robot_id: String,
    #[serde(with = "millis")]
    pub request_timeout: Duration,
    #[serde(with = "millis")]
    pub live_status_interval: Duration,
    #[serde(with = "millis")]
    pub aggregate_interval: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_origin: DEFAULT_API_ORIGIN.to_string(),
            pubsub_topic: DEFAULT_PUBSUB_TOPIC.to_string(),
            robot_id: DEFAULT_ROBOT_ID.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            live_status_interval: LIVE_STATUS_INTERVAL,
            aggregate_interval: AGGREGATES_INTERVAL,
        }
    }
}

impl DashboardConfig {
    /// Defaults overridden by `NANOSTORE_API_ORIGIN` and
    /// `NANOSTORE_PUBSUB_TOPIC` as set when the crate was compiled
    pub fn from_build_env() -> Self {
        let mut config = Self::default();
        if let Some(origin) = option_env!("NANOSTORE_API_ORIGIN") {
            config.api_origin = origin.to_string();
        }
        if let Some(topic) = option_env!("NANOSTORE_PUBSUB_TOPIC") {
            config.pubsub_topic = topic.to_string();
        }
        config
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.origin_url()?;
        if self.pubsub_topic.trim().is_empty() {
            return Err(CoreError::invalid_config("pubsub topic must not be empty"));
        }
        for (name, interval) in [
            ("request_timeout", self.request_timeout),
            ("live_status_interval", self.live_status_interval),
            ("aggregate_interval", self.aggregate_interval),
        ] {
            if interval.is_zero() {
                return Err(CoreError::invalid_config(format!("{name} must be non-zero")));
            }
        }
        Ok(())
    }

    /// Parsed origin, without a trailing slash in its path
    pub fn origin_url(&self) -> CoreResult<Url> {
        let url = Url::parse(self.api_origin.trim()).map_err(|err| {
            CoreError::invalid_config(format!("invalid api origin {:?}: {err}", self.api_origin))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::invalid_config(format!(
                "api origin must be http or https, got {}",
                url.scheme()
            )));
        }
        Ok(url)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_are_valid() {
        let config = DashboardConfig::default();
        config.validate().unwrap();
        assert_eq!(config.live_status_interval, Duration::from_millis(500));
        assert_eq!(config.origin_url().unwrap().host_str(), Some("amsstores1.leapmile.com"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: DashboardConfig = serde_json::from_value(json!({
            "api_origin": "http://localhost:8080",
            "live_status_interval": 250
        }))
        .unwrap();
        assert_eq!(config.api_origin, "http://localhost:8080");
        assert_eq!(config.live_status_interval, Duration::from_millis(250));
        assert_eq!(config.robot_id, DEFAULT_ROBOT_ID);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = DashboardConfig {
            api_origin: "ftp://example.com".into(),
            ..DashboardConfig::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::InvalidConfig { .. })));

        config.api_origin = "not a url".into();
        assert!(config.validate().is_err());

        config = DashboardConfig {
            aggregate_interval: Duration::ZERO,
            ..DashboardConfig::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("aggregate_interval"));
    }
}
