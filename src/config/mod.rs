use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::services::{DataService, FixtureDataService, FixtureLatency, HttpDataService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Fixture,
    Http,
}

impl DataSource {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fixture" | "mock" => Some(DataSource::Fixture),
            "http" | "api" => Some(DataSource::Http),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Fixture => "fixture",
            DataSource::Http => "http",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    // Data service
    pub data_source: DataSource,
    pub api_base_url: Option<String>,
    pub request_timeout_secs: u64,
    pub fixture_latency: bool,

    // Presentation
    pub copy_indicator_ms: u64,
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            data_source: DataSource::Fixture,
            api_base_url: None,
            request_timeout_secs: 10,
            fixture_latency: false,
            copy_indicator_ms: 2000,
            json_logs: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let data_source = match env::var("DATA_SOURCE") {
            Ok(raw) => DataSource::from_api_str(&raw)
                .ok_or_else(|| anyhow::anyhow!("DATA_SOURCE must be `fixture` or `http`, got `{raw}`"))?,
            Err(_) => defaults.data_source,
        };

        let api_base_url = env::var("API_BASE_URL").ok().filter(|s| !s.is_empty());
        if data_source == DataSource::Http && api_base_url.is_none() {
            anyhow::bail!("API_BASE_URL must be set when DATA_SOURCE=http");
        }

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            data_source,
            api_base_url,
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            fixture_latency: env::var("FIXTURE_LATENCY")
                .unwrap_or_else(|_| "false".into())
                .parse()
                .unwrap_or(false),
            copy_indicator_ms: env::var("COPY_INDICATOR_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.copy_indicator_ms),
            json_logs: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    pub fn copy_indicator(&self) -> Duration {
        Duration::from_millis(self.copy_indicator_ms)
    }

    /// Build the configured data service variant.
    pub fn data_service(&self) -> anyhow::Result<Arc<dyn DataService>> {
        match self.data_source {
            DataSource::Fixture => {
                let latency = if self.fixture_latency {
                    FixtureLatency::realistic()
                } else {
                    FixtureLatency::default()
                };
                Ok(Arc::new(FixtureDataService::new(latency)))
            }
            DataSource::Http => {
                let base_url = self
                    .api_base_url
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("API_BASE_URL must be set"))?;
                let service =
                    HttpDataService::new(&base_url, Duration::from_secs(self.request_timeout_secs))?;
                Ok(Arc::new(service))
            }
        }
    }
}
