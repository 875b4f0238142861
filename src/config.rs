//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.surveypulse.toml` files.

use crate::analysis::BucketOrder;
use crate::cli::OutputFormat;
use crate::models::GroupBy;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".surveypulse.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Survey backend settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Poll intervals.
    #[serde(default)]
    pub polling: PollingConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report format used when `--format` is not given.
    #[serde(default)]
    pub output_format: OutputFormat,
}

/// Survey backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the survey API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Use the built-in sample data instead of the API.
    #[serde(default)]
    pub offline: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            offline: false,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_timeout() -> u64 {
    3
}

/// Poll intervals in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_interval_ms")]
    pub analytics_interval_ms: u64,

    #[serde(default = "default_interval_ms")]
    pub realtime_interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            analytics_interval_ms: default_interval_ms(),
            realtime_interval_ms: default_interval_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    5000
}

/// Report generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Dimensions to break results down by.
    #[serde(default = "default_group_by")]
    pub group_by: Vec<GroupBy>,

    /// Ordering of distribution buckets.
    #[serde(default)]
    pub bucket_order: BucketOrder,

    /// Number of drivers listed as top performers and as areas for
    /// improvement.
    #[serde(default = "default_top_drivers")]
    pub top_drivers: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            group_by: default_group_by(),
            bucket_order: BucketOrder::default(),
            top_drivers: default_top_drivers(),
        }
    }
}

fn default_group_by() -> Vec<GroupBy> {
    vec![GroupBy::Section, GroupBy::Category, GroupBy::Driver]
}

fn default_top_drivers() -> usize {
    6
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.surveypulse.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.api_url {
            self.api.base_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }
        if args.offline {
            self.api.offline = true;
        }

        if let Some(interval) = args.poll_interval {
            self.polling.analytics_interval_ms = interval;
            self.polling.realtime_interval_ms = interval;
        }

        if let Some(format) = args.format {
            self.general.output_format = format;
        }
        if let Some(ref group_by) = args.group_by {
            self.report.group_by = group_by.clone();
        }
    }

    /// Reject settings no run can work with.
    pub fn validate(&self) -> Result<()> {
        if self.api.timeout_seconds == 0 {
            bail!("api.timeout_seconds must be at least 1");
        }
        if self.polling.analytics_interval_ms == 0 || self.polling.realtime_interval_ms == 0 {
            bail!("Poll intervals must be at least 1 ms");
        }
        if !self.api.offline
            && !self.api.base_url.starts_with("http://")
            && !self.api.base_url.starts_with("https://")
        {
            bail!("API URL must start with 'http://' or 'https://'");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    pub fn analytics_interval(&self) -> Duration {
        Duration::from_millis(self.polling.analytics_interval_ms)
    }

    pub fn realtime_interval(&self) -> Duration {
        Duration::from_millis(self.polling.realtime_interval_ms)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> Result<String> {
        toml::to_string_pretty(&Config::default()).context("Failed to serialize default config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::make_args;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:3001");
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.analytics_interval(), Duration::from_secs(5));
        assert_eq!(config.report.top_drivers, 6);
        assert_eq!(config.report.bucket_order, BucketOrder::FirstSeen);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output_format = "json"

[api]
base_url = "https://surveys.example.com"
timeout_seconds = 10

[polling]
analytics_interval_ms = 2000

[report]
group_by = ["driver"]
bucket_order = "ascending"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output_format, OutputFormat::Json);
        assert_eq!(config.api.base_url, "https://surveys.example.com");
        assert_eq!(config.api.timeout_seconds, 10);
        assert!(!config.api.offline);
        assert_eq!(config.polling.analytics_interval_ms, 2000);
        assert_eq!(config.polling.realtime_interval_ms, 5000);
        assert_eq!(config.report.group_by, vec![GroupBy::Driver]);
        assert_eq!(config.report.bucket_order, BucketOrder::Ascending);
        assert_eq!(config.report.top_drivers, 6);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        writeln!(file, "[api]\noffline = true").unwrap();

        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert!(config.api.offline);

        let empty = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(empty.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[report]\nbucket_order = \"random\"\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        config.api.timeout_seconds = 8;

        let mut args = make_args();
        args.api_url = Some("https://api.example.com".to_string());
        args.format = Some(OutputFormat::Json);
        args.group_by = Some(vec![GroupBy::Category]);
        args.poll_interval = Some(1000);
        args.offline = true;
        config.merge_with_args(&args);

        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.timeout_seconds, 8);
        assert!(config.api.offline);
        assert_eq!(config.general.output_format, OutputFormat::Json);
        assert_eq!(config.report.group_by, vec![GroupBy::Category]);
        assert_eq!(config.realtime_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.polling.realtime_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.base_url = "localhost:3001".to_string();
        assert!(config.validate().is_err());
        config.api.offline = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml().unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[polling]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
