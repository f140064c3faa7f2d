use crate::application::polling_service::{FailurePolicy, Feed, PollingOptions};
use crate::application::twin_view::TwinViewOptions;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub polling: PollingSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub twin: TwinSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self { base_url: default_base_url(), timeout_ms: default_timeout_ms() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingSettings {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
    #[serde(default = "default_feeds")]
    pub feeds: Vec<Feed>,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            failure_policy: FailurePolicy::default(),
            cache_ttl_ms: default_cache_ttl_ms(),
            feeds: default_feeds(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TwinSettings {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_device_pixel_ratio")]
    pub device_pixel_ratio: f64,
    #[serde(default = "default_min_resize_delta")]
    pub min_resize_delta: f64,
}

impl Default for TwinSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            device_pixel_ratio: default_device_pixel_ratio(),
            min_resize_delta: default_min_resize_delta(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_interval_ms() -> u64 {
    3000
}

fn default_cache_ttl_ms() -> u64 {
    10_000
}

fn default_feeds() -> Vec<Feed> {
    vec![Feed::Dashboard, Feed::Stations, Feed::Twin]
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_debounce_ms() -> u64 {
    150
}

fn default_device_pixel_ratio() -> f64 {
    1.0
}

fn default_min_resize_delta() -> f64 {
    5.0
}

impl DashboardConfig {
    pub fn polling_options(&self) -> PollingOptions {
        PollingOptions {
            feeds: self.polling.feeds.clone(),
            request_timeout: Duration::from_millis(self.api.timeout_ms),
            failure_policy: self.polling.failure_policy,
            cache_ttl: Duration::from_millis(self.polling.cache_ttl_ms),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.polling.interval_ms)
    }

    pub fn twin_options(&self) -> TwinViewOptions {
        TwinViewOptions {
            device_pixel_ratio: self.twin.device_pixel_ratio,
            min_resize_delta: self.twin.min_resize_delta,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.twin.debounce_ms)
    }

    /// Intervals that drive timers must be non-zero.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.polling.interval_ms > 0, "polling.interval_ms must be greater than 0");
        anyhow::ensure!(self.twin.debounce_ms > 0, "twin.debounce_ms must be greater than 0");
        Ok(())
    }
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    load_config_from(config::File::with_name("config/dashboard"))
}

fn load_config_from<S>(source: S) -> anyhow::Result<DashboardConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder().add_source(source).build()?;

    let config: DashboardConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(toml: &str) -> anyhow::Result<DashboardConfig> {
        load_config_from(config::File::from_str(toml, config::FileFormat::Toml))
    }

    fn parse(toml: &str) -> DashboardConfig {
        load(toml).unwrap()
    }

    #[test]
    fn test_defaults_for_missing_sections() {
        let config = parse("");
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.poll_interval(), Duration::from_millis(3000));
        assert_eq!(config.polling.feeds, vec![Feed::Dashboard, Feed::Stations, Feed::Twin]);
        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert_eq!(config.debounce(), Duration::from_millis(150));

        let options = config.polling_options();
        assert_eq!(options.request_timeout, Duration::from_secs(5));
        assert_eq!(options.cache_ttl, Duration::from_secs(10));
        assert_eq!(options.failure_policy, FailurePolicy::Fallback);
    }

    #[test]
    fn test_overrides() {
        let config = parse(
            r#"
            [api]
            base_url = "http://factory:9000"

            [polling]
            interval_ms = 5000
            failure_policy = "error"
            feeds = ["dashboard", "stocks"]

            [twin]
            device_pixel_ratio = 2.0
            "#,
        );
        assert_eq!(config.api.base_url, "http://factory:9000");
        assert_eq!(config.api.timeout_ms, 5000);
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.polling.failure_policy, FailurePolicy::Error);
        assert_eq!(config.polling.feeds, vec![Feed::Dashboard, Feed::Stocks]);
        assert_eq!(config.twin_options().device_pixel_ratio, 2.0);
        assert_eq!(config.twin_options().min_resize_delta, 5.0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_config_from(config::File::with_name("config/does-not-exist")).is_err());
    }

    #[test]
    fn test_zero_intervals_are_rejected() {
        let err = load("[polling]\ninterval_ms = 0").unwrap_err();
        assert!(err.to_string().contains("polling.interval_ms"));

        let err = load("[twin]\ndebounce_ms = 0").unwrap_err();
        assert!(err.to_string().contains("twin.debounce_ms"));

        assert!(load("[polling]\ninterval_ms = 1").is_ok());
    }
}
