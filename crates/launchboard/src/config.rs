//! Configuration management for launchboard.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default config directory name.
const CONFIG_DIR_NAME: &str = "launchboard";

/// Highest zoom level served by the default tile provider.
const MAX_ZOOM: u8 = 19;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `LAUNCHBOARD_`, `__` between sections)
/// 2. TOML config file at `~/.config/launchboard/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote service configuration.
    pub api: ApiConfig,
    /// Launch table configuration.
    pub table: TableConfig,
    /// Map overlay configuration.
    pub map: MapConfig,
    /// PDF export configuration.
    pub export: ExportConfig,
}

/// Remote service endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the launch data service (`/launches`, `/launchpads`).
    pub launches_base_url: String,
    /// Base URL of the analytics service (`/charts/...`, `/stats/...`).
    pub analytics_base_url: String,
}

/// Launch table configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Rows per page.
    pub page_size: usize,
    /// chrono format string used to display and filter launch dates.
    pub date_format: String,
}

/// Map overlay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Zoom level of the launch site map.
    pub zoom: u8,
    /// Delay before the map recomputes its layout after being shown.
    pub relayout_delay_ms: u64,
    /// Slippy-map tile URL template (`{s}`, `{z}`, `{x}`, `{y}`).
    pub tile_url: String,
    /// Attribution shown alongside the tiles.
    pub attribution: String,
    /// Marker icon image.
    pub marker_icon_url: String,
    /// Marker icon image for high density displays.
    pub marker_icon_retina_url: String,
    /// Marker shadow image.
    pub marker_shadow_url: String,
}

/// PDF export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File name of the exported document.
    pub file_name: String,
    /// Title printed at the top of the first page.
    pub title: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            launches_base_url: "https://api.spacexdata.com/v4".to_string(),
            analytics_base_url: "http://localhost:8000".to_string(),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            date_format: "%-d/%-m/%Y".to_string(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: 10,
            relayout_delay_ms: 100,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "© OpenStreetMap contributors".to_string(),
            marker_icon_url: "https://unpkg.com/leaflet@1.9.4/dist/images/marker-icon.png"
                .to_string(),
            marker_icon_retina_url:
                "https://unpkg.com/leaflet@1.9.4/dist/images/marker-icon-2x.png".to_string(),
            marker_shadow_url: "https://unpkg.com/leaflet@1.9.4/dist/images/marker-shadow.png"
                .to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "launches.pdf".to_string(),
            title: "Launch Report".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources, reading `config_path` or the
    /// default configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("LAUNCHBOARD_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        for (key, url) in [
            ("api.launches_base_url", &self.api.launches_base_url),
            ("api.analytics_base_url", &self.api.analytics_base_url),
        ] {
            if reqwest::Url::parse(url).is_err() {
                return Err(Error::ConfigValidation {
                    message: format!("{key} is not a valid URL: {url}"),
                });
            }
        }

        if self.table.page_size == 0 {
            return Err(Error::ConfigValidation {
                message: "page_size must be greater than 0".to_string(),
            });
        }

        if StrftimeItems::new(&self.table.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::ConfigValidation {
                message: format!("invalid date_format: {}", self.table.date_format),
            });
        }

        if self.map.zoom > MAX_ZOOM {
            return Err(Error::ConfigValidation {
                message: format!("zoom ({}) cannot be greater than {MAX_ZOOM}", self.map.zoom),
            });
        }

        if self.map.relayout_delay_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "relayout_delay_ms must be greater than 0".to_string(),
            });
        }

        if self.export.file_name.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "export file_name cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the map relayout delay as a Duration.
    #[must_use]
    pub fn relayout_delay(&self) -> Duration {
        Duration::from_millis(self.map.relayout_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.table.page_size, 10);
        assert_eq!(config.map.zoom, 10);
        assert_eq!(config.export.file_name, "launches.pdf");
        assert!(config.api.launches_base_url.starts_with("https://"));
    }

    #[test]
    fn test_default_map_config() {
        let map = MapConfig::default();

        assert_eq!(map.relayout_delay_ms, 100);
        assert!(map.tile_url.contains("{z}"));
        assert!(map.marker_icon_url.ends_with("marker-icon.png"));
        assert!(map.marker_shadow_url.ends_with("marker-shadow.png"));
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_page_size() {
        let mut config = Config::default();
        config.table.page_size = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("page_size"));
    }

    #[test]
    fn test_validate_invalid_url() {
        let mut config = Config::default();
        config.api.analytics_base_url = "not a url".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("analytics_base_url"));
    }

    #[test]
    fn test_validate_invalid_date_format() {
        let mut config = Config::default();
        config.table.date_format = "%Q".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("date_format"));
    }

    #[test]
    fn test_validate_zoom_too_high() {
        let mut config = Config::default();
        config.map.zoom = 23;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("zoom"));
    }

    #[test]
    fn test_validate_zero_relayout_delay() {
        let mut config = Config::default();
        config.map.relayout_delay_ms = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("relayout_delay_ms"));
    }

    #[test]
    fn test_validate_empty_file_name() {
        let mut config = Config::default();
        config.export.file_name = "  ".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_relayout_delay() {
        let config = Config::default();
        assert_eq!(config.relayout_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("launchboard"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // A missing file falls back to defaults
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.table, TableConfig::default());
        assert_eq!(config.map, MapConfig::default());
    }

    #[test]
    fn test_table_config_deserialize() {
        let json = r#"{"page_size": 25}"#;
        let table: TableConfig = serde_json::from_str(json).unwrap();
        assert_eq!(table.page_size, 25);
        assert_eq!(table.date_format, "%-d/%-m/%Y");
    }

    #[test]
    fn test_export_config_serialize() {
        let export = ExportConfig::default();
        let json = serde_json::to_string(&export).unwrap();
        assert!(json.contains("file_name"));
    }
}
