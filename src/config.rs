//! User configuration (`config.toml`).
//!
//! ```toml
//! [backend]
//! url = "https://crm.example.com"
//! token = "..."
//! timeout_secs = 30
//!
//! [board]
//! activation_distance = 8.0
//! toast_secs = 4
//!
//! [log]
//! level = "info"
//! file = "/tmp/dealboard.log"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::pipeline::drag::DEFAULT_ACTIVATION_DISTANCE;
use crate::pipeline::BoardSettings;
use crate::store::DealQuery;

pub const ENV_URL: &str = "DEALBOARD_URL";
pub const ENV_TOKEN: &str = "DEALBOARD_TOKEN";

const APP_DIR: &str = "dealboard";
const CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "dealboard.log";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub backend: BackendConfig,
    pub board: BoardConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    /// Whole-request timeout. Unset means no limit beyond the connect timeout.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    pub activation_distance: f64,
    pub toast_secs: u64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            activation_distance: DEFAULT_ACTIVATION_DISTANCE,
            toast_secs: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LogConfig {
    /// Where the terminal board writes its log.
    pub fn file_path(&self) -> Option<PathBuf> {
        self.file.clone().or_else(default_log_path)
    }
}

/// `<config dir>/dealboard/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// `<state dir>/dealboard/dealboard.log`, falling back to the cache dir.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|dir| dir.join(APP_DIR).join(LOG_FILE))
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one the default location is
    /// tried and a missing file yields defaults. Environment overrides are
    /// applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::from_file(path)?
            }
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self) {
        if let Some(url) = non_empty_env(ENV_URL) {
            self.backend.url = Some(url);
        }
        if let Some(token) = non_empty_env(ENV_TOKEN) {
            self.backend.token = Some(token);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let distance = self.board.activation_distance;
        if !distance.is_finite() || distance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "board.activation_distance must be a non-negative number, got {distance}"
            )));
        }
        if self.board.toast_secs == 0 {
            return Err(ConfigError::Invalid(
                "board.toast_secs must be at least 1".to_string(),
            ));
        }
        if let Some(url) = &self.backend.url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "backend.url must start with http:// or https://, got '{url}'"
                )));
            }
        }
        Ok(())
    }

    /// The backend section, or `MissingBackend` when no URL is set.
    pub fn require_backend(&self) -> Result<&BackendConfig, ConfigError> {
        match self.backend.url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(&self.backend),
            _ => Err(ConfigError::MissingBackend),
        }
    }

    pub fn board_settings(&self, query: DealQuery) -> BoardSettings {
        BoardSettings {
            activation_distance: self.board.activation_distance,
            toast_ttl: Duration::from_secs(self.board.toast_secs),
            query,
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, content).expect("Should write config");
        path
    }

    fn clear_env() {
        env::remove_var(ENV_URL);
        env::remove_var(ENV_TOKEN);
    }

    #[test]
    #[serial]
    fn test_load_full_file() {
        clear_env();
        let dir = TempDir::new().expect("Should create temp dir");
        let path = write_config(
            &dir,
            r#"
[backend]
url = "https://crm.example.com"
token = "secret"
timeout_secs = 30

[board]
activation_distance = 12.0
toast_secs = 6

[log]
level = "debug"
file = "/tmp/board.log"
"#,
        );

        let config = Config::load(Some(&path)).expect("Should load config");
        assert_eq!(config.backend.url.as_deref(), Some("https://crm.example.com"));
        assert_eq!(config.backend.token.as_deref(), Some("secret"));
        assert_eq!(config.backend.timeout_secs, Some(30));
        assert_eq!(config.board.activation_distance, 12.0);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.file_path(), Some(PathBuf::from("/tmp/board.log")));

        let settings = config.board_settings(DealQuery::default());
        assert_eq!(settings.toast_ttl, Duration::from_secs(6));
    }

    #[test]
    #[serial]
    fn test_missing_sections_use_defaults() {
        clear_env();
        let dir = TempDir::new().expect("Should create temp dir");
        let path = write_config(&dir, "[backend]\nurl = \"http://localhost:8055\"\n");

        let config = Config::load(Some(&path)).expect("Should load config");
        assert_eq!(config.board, BoardConfig::default());
        assert_eq!(config.board.activation_distance, 8.0);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.backend.timeout_secs, None);
    }

    #[test]
    #[serial]
    fn test_explicit_path_must_exist() {
        let dir = TempDir::new().expect("Should create temp dir");
        let result = Config::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    #[serial]
    fn test_parse_error_names_file() {
        let dir = TempDir::new().expect("Should create temp dir");
        let path = write_config(&dir, "[board]\nactivation_distance = \"far\"\n");
        let err = Config::load(Some(&path)).expect_err("Should reject bad type");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        clear_env();
        let dir = TempDir::new().expect("Should create temp dir");
        let path = write_config(&dir, "[backend]\nurl = \"http://file\"\ntoken = \"a\"\n");

        env::set_var(ENV_URL, "https://env.example.com");
        env::set_var(ENV_TOKEN, "from-env");
        let config = Config::load(Some(&path));
        clear_env();

        let config = config.expect("Should load config");
        assert_eq!(config.backend.url.as_deref(), Some("https://env.example.com"));
        assert_eq!(config.backend.token.as_deref(), Some("from-env"));
    }

    #[test]
    #[serial]
    fn test_invalid_values_rejected() {
        clear_env();
        let dir = TempDir::new().expect("Should create temp dir");
        let path = write_config(&dir, "[board]\nactivation_distance = -1.0\n");
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::Invalid(_))
        ));

        let path = write_config(&dir, "[backend]\nurl = \"ftp://nope\"\n");
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_require_backend() {
        let config = Config::default();
        assert!(matches!(
            config.require_backend(),
            Err(ConfigError::MissingBackend)
        ));

        let mut config = Config::default();
        config.backend.url = Some("http://localhost:8055".to_string());
        assert!(config.require_backend().is_ok());
    }
}
