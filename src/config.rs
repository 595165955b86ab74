//! Configuration types for catalog-export

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, time::Duration};

/// Remote catalog API settings
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the catalog service, without the `/api` suffix
    /// (default: "https://pilot.epicor-auto-catalog.cloud")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Region sent as `regionID` / `regionIDs` on catalog queries (default: 1)
    #[serde(default = "default_region_id")]
    pub region_id: u32,

    /// `Accept-Language` header value (default: "en-US")
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// `x-application-key` header value (default: empty)
    #[serde(default)]
    pub application_key: String,

    /// User agent for outbound requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            region_id: default_region_id(),
            accept_language: default_accept_language(),
            application_key: String::new(),
            user_agent: default_user_agent(),
        }
    }
}

/// Bulk export behavior
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Manufacturer-name prefixes that select which manufacturers take part in
    /// a bulk export (case-sensitive)
    #[serde(default = "default_manufacturer_prefixes")]
    pub manufacturer_prefixes: Vec<String>,

    /// Pause between two groups so the remote API is not flooded (default: 100 ms)
    #[serde(default = "default_group_delay", with = "duration_ms_serde")]
    pub group_delay: Duration,

    /// Directory for written CSV exports (default: "./exports")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// What to do when an export file with the same name already exists
    #[serde(default)]
    pub file_collision: FileCollisionAction,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            manufacturer_prefixes: default_manufacturer_prefixes(),
            group_delay: default_group_delay(),
            output_dir: default_output_dir(),
            file_collision: FileCollisionAction::default(),
        }
    }
}

/// Session persistence settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Where the session (token, vehicle configuration, VIN response) is kept
    /// between runs (default: "session.json")
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

/// Retry behavior for transient catalog API failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 2)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 500 ms)
    #[serde(default = "default_initial_delay", with = "duration_ms_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 10 seconds)
    #[serde(default = "default_max_delay", with = "duration_ms_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// A policy that makes exactly one attempt
    pub fn disabled() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }
}

/// File collision handling strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCollisionAction {
    /// Append (1), (2), etc. to filename (default)
    #[default]
    Rename,
    /// Overwrite existing file
    Overwrite,
    /// Refuse to write, keep existing
    Skip,
}

/// Main configuration for catalog-export
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote catalog API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Bulk export behavior
    #[serde(default)]
    pub export: ExportConfig,

    /// Retry behavior for transient failures
    #[serde(default)]
    pub retry: RetryConfig,

    /// Session persistence
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Load a configuration from a JSON file and validate it
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| Error::Config {
            message: format!("cannot parse {}: {}", path.display(), e),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.api.base_url).map_err(|e| Error::Config {
            message: format!("invalid base URL {:?}: {}", self.api.base_url, e),
            key: Some("api.base_url".to_string()),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!("unsupported URL scheme {:?}", base.scheme()),
                key: Some("api.base_url".to_string()),
            });
        }

        if self.export.manufacturer_prefixes.is_empty() {
            return Err(Error::Config {
                message: "at least one manufacturer prefix is required".to_string(),
                key: Some("export.manufacturer_prefixes".to_string()),
            });
        }
        if self
            .export
            .manufacturer_prefixes
            .iter()
            .any(|p| p.trim().is_empty())
        {
            return Err(Error::Config {
                message: "manufacturer prefixes must not be blank".to_string(),
                key: Some("export.manufacturer_prefixes".to_string()),
            });
        }

        Ok(())
    }
}

fn default_base_url() -> String {
    "https://pilot.epicor-auto-catalog.cloud".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_region_id() -> u32 {
    1
}

fn default_accept_language() -> String {
    "en-US".to_string()
}

fn default_user_agent() -> String {
    concat!("catalog-export/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_manufacturer_prefixes() -> Vec<String> {
    ["Advance/", "Worldpac", "OE+", "Carquest/", "AZ/"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_group_delay() -> Duration {
    Duration::from_millis(100)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("exports")
}

fn default_session_path() -> PathBuf {
    PathBuf::from("session.json")
}

fn default_max_attempts() -> u32 {
    2
}

fn default_initial_delay() -> Duration {
    Duration::from_millis(500)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Duration serialization helper (milliseconds)
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_yields_defaults() {
        let config: Config = serde_json::from_str("{}").expect("deserialize failed");

        assert_eq!(config.api.base_url, "https://pilot.epicor-auto-catalog.cloud");
        assert_eq!(config.api.region_id, 1);
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert_eq!(config.export.group_delay, Duration::from_millis(100));
        assert_eq!(
            config.export.manufacturer_prefixes,
            vec!["Advance/", "Worldpac", "OE+", "Carquest/", "AZ/"]
        );
        assert_eq!(config.export.file_collision, FileCollisionAction::Rename);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_durations_use_their_declared_units() {
        let json = r#"{
            "api": { "timeout": 5 },
            "export": { "group_delay": 250 },
            "retry": { "initial_delay": 20, "max_attempts": 4 }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.api.timeout, Duration::from_secs(5));
        assert_eq!(config.export.group_delay, Duration::from_millis(250));
        assert_eq!(config.retry.initial_delay, Duration::from_millis(20));
        assert_eq!(config.retry.max_attempts, 4);
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();

        match config.validate() {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("api.base_url")),
            other => panic!("expected config error, got {other:?}"),
        }

        config.api.base_url = "ftp://catalog.example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_or_blank_prefixes() {
        let mut config = Config::default();
        config.export.manufacturer_prefixes.clear();
        assert!(config.validate().is_err());

        config.export.manufacturer_prefixes = vec!["OE+".into(), "  ".into()];
        match config.validate() {
            Err(Error::Config { key, .. }) => {
                assert_eq!(key.as_deref(), Some("export.manufacturer_prefixes"))
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "export": { "manufacturer_prefixes": ["OE+"], "output_dir": "out" } }"#,
        )
        .unwrap();

        let config = Config::from_json_file(&path).unwrap();
        assert_eq!(config.export.manufacturer_prefixes, vec!["OE+"]);
        assert_eq!(config.export.output_dir, PathBuf::from("out"));

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Config::from_json_file(&path),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_retry_disabled_makes_no_retries() {
        assert_eq!(RetryConfig::disabled().max_attempts, 0);
    }
}
