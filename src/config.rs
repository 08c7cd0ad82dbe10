use crate::error::{Error, Result};
use crate::overpass;
use crate::resolver::DEFAULT_MAX_POIS;
use crate::traveltime;

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub traveltime: TravelTimeConfig,
    pub overpass: OverpassConfig,
    /// Applied to every external request
    pub timeout_secs: u64,
    pub max_pois: usize,
    /// Entries kept by the POI cache, zero queries Overpass every time
    pub cache_capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TravelTimeConfig {
    pub base_url: String,
    pub app_id: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OverpassConfig {
    pub endpoint: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            traveltime: TravelTimeConfig::default(),
            overpass: OverpassConfig::default(),
            timeout_secs: 30,
            max_pois: DEFAULT_MAX_POIS,
            cache_capacity: 0,
        }
    }
}

impl Default for TravelTimeConfig {
    fn default() -> Self {
        Self {
            base_url: traveltime::DEFAULT_BASE_URL.to_string(),
            app_id: None,
            api_key: None,
        }
    }
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoint: overpass::DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Optional file, then `APP_ID` / `API_KEY` from the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(app_id) = lookup("APP_ID").filter(|v| !v.is_empty()) {
            self.traveltime.app_id = Some(app_id);
        }
        if let Some(api_key) = lookup("API_KEY").filter(|v| !v.is_empty()) {
            self.traveltime.api_key = Some(api_key);
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_when_empty() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.traveltime.base_url, traveltime::DEFAULT_BASE_URL);
        assert_eq!(config.overpass.endpoint, overpass::DEFAULT_ENDPOINT);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.max_pois, 10);
        assert_eq!(config.cache_capacity, 0);
        assert!(config.traveltime.app_id.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            timeout_secs = 5
            cache_capacity = 50

            [traveltime]
            app_id = "file-id"
            api_key = "file-key"

            [overpass]
            endpoint = "https://overpass.example.org/api/interpreter"
            "#,
        )
        .unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.max_pois, 10);
        assert_eq!(config.cache_capacity, 50);
        assert_eq!(config.traveltime.app_id.as_deref(), Some("file-id"));
        assert_eq!(config.traveltime.base_url, traveltime::DEFAULT_BASE_URL);
        assert_eq!(
            config.overpass.endpoint,
            "https://overpass.example.org/api/interpreter"
        );
    }

    #[test]
    fn environment_overrides_credentials() {
        let config = Config::from_toml("[traveltime]\napp_id = \"file-id\"\n")
            .unwrap()
            .with_env_overrides(|key| match key {
                "APP_ID" => Some("env-id".to_string()),
                "API_KEY" => Some(String::new()),
                _ => None,
            });
        assert_eq!(config.traveltime.app_id.as_deref(), Some("env-id"));
        assert!(config.traveltime.api_key.is_none());
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        assert!(matches!(
            Config::from_toml("timeout_secs = \"soon\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::load_from_file("/nonexistent/reachable_poi.toml"),
            Err(Error::Config(_))
        ));
    }
}
