use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_SOURCE_URL: &str = "https://weilei.site/apis.json";

/// Main configuration for the API catalog
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CatalogConfig {
    /// Remote snapshot source and freshness policy
    #[serde(default)]
    pub sync: SyncConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Streamable HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncConfig {
    /// URL of the JSON catalog document
    #[serde(default = "default_source_url")]
    pub source_url: String,

    /// Minimum age before an unforced sync fetches again
    #[serde(default = "default_freshness_window_secs")]
    pub freshness_window_secs: u64,

    /// Upper bound on a single fetch
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// trace | debug | info | warn | error
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpConfig {
    #[serde(default = "default_http_host")]
    pub host: String,

    #[serde(default = "default_http_port")]
    pub port: u16,

    /// SSE keep-alive ping interval
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            freshness_window_secs: default_freshness_window_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

impl HttpConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

impl SyncConfig {
    pub fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.freshness_window_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}
fn default_freshness_window_secs() -> u64 {
    3600
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    format!("apicatalog/{}", env!("CARGO_PKG_VERSION"))
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_http_host() -> String {
    "127.0.0.1".to_string()
}
fn default_http_port() -> u16 {
    3000
}
fn default_keep_alive_secs() -> u64 {
    15
}

/// Configuration manager: `.env`, then a TOML file, then environment overrides
pub struct ConfigManager {
    config: CatalogConfig,
    config_path: Option<PathBuf>,
    dotenv_error: Option<String>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (explicit path, `.apicatalog.toml`, `~/.apicatalog/config.toml`)
    /// 3. Defaults
    ///
    /// Loading happens before logging is set up, so nothing is logged here;
    /// call [`ConfigManager::log_summary`] once a subscriber is installed.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let dotenv_error = Self::load_dotenv();

        let (config, config_path) = match explicit_path {
            Some(path) => (Self::read_toml_file(path)?, Some(path.to_path_buf())),
            None => Self::load_config_file()?,
        };

        let config = Self::apply_env_overrides(config);
        Self::validate_config(&config)?;

        Ok(Self {
            config,
            config_path,
            dotenv_error,
        })
    }

    fn load_dotenv() -> Option<String> {
        if !Path::new(".env").exists() {
            return None;
        }
        dotenv::from_filename(".env").err().map(|e| e.to_string())
    }

    /// Lines describing where the configuration came from
    pub fn summary(&self) -> Vec<String> {
        let mut lines = vec![match &self.config_path {
            Some(path) => format!("Config file: {}", path.display()),
            None => "Config file: none, using defaults".to_string(),
        }];
        lines.push(format!("Catalog source: {}", self.config.sync.source_url));
        lines.push(format!(
            "Freshness window: {}s",
            self.config.sync.freshness_window_secs
        ));
        lines
    }

    pub fn log_summary(&self) {
        if let Some(err) = &self.dotenv_error {
            warn!("Failed to load .env file: {}", err);
        }
        for line in self.summary() {
            info!("{}", line);
        }
    }

    fn load_config_file() -> Result<(CatalogConfig, Option<PathBuf>)> {
        let local_config = Path::new(".apicatalog.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".apicatalog").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        Ok((CatalogConfig::default(), None))
    }

    fn read_toml_file(path: &Path) -> Result<CatalogConfig> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| CatalogError::config(format!("{}: {}", path.display(), e)))
    }

    fn apply_env_overrides(mut config: CatalogConfig) -> CatalogConfig {
        if let Ok(url) = std::env::var("APICATALOG_SOURCE_URL") {
            config.sync.source_url = url;
        }
        if let Ok(secs) = std::env::var("APICATALOG_FRESHNESS_SECS") {
            if let Ok(secs) = secs.parse() {
                config.sync.freshness_window_secs = secs;
            }
        }
        if let Ok(secs) = std::env::var("APICATALOG_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.sync.request_timeout_secs = secs;
            }
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.logging.level = level;
        }
        if let Ok(host) = std::env::var("APICATALOG_HTTP_HOST") {
            config.http.host = host;
        }
        if let Ok(port) = std::env::var("APICATALOG_HTTP_PORT") {
            if let Ok(port) = port.parse() {
                config.http.port = port;
            }
        }
        if let Ok(secs) = std::env::var("APICATALOG_HTTP_KEEP_ALIVE") {
            if let Ok(secs) = secs.parse() {
                config.http.keep_alive_secs = secs;
            }
        }
        config
    }

    pub fn validate_config(config: &CatalogConfig) -> Result<()> {
        let url = config.sync.source_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CatalogError::config(format!(
                "source_url must be an http(s) URL, got '{}'",
                config.sync.source_url
            )));
        }

        if config.sync.request_timeout_secs == 0 {
            return Err(CatalogError::config(
                "request_timeout_secs must be greater than 0",
            ));
        }

        if config.http.host.trim().is_empty() {
            return Err(CatalogError::config("http.host must not be empty"));
        }
        if config.http.keep_alive_secs == 0 {
            return Err(CatalogError::config("http.keep_alive_secs must be greater than 0"));
        }

        match config.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            // RUST_LOG may carry a full filter directive
            other if other.contains('=') || other.contains(',') => {}
            other => {
                return Err(CatalogError::config(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    other
                )))
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn into_config(self) -> CatalogConfig {
        self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Write a default config file
    pub fn create_default_config(path: &Path) -> Result<()> {
        let toml_str = toml::to_string_pretty(&CatalogConfig::default())
            .map_err(|e| CatalogError::config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml_str)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = CatalogConfig::default();
        assert_eq!(config.sync.source_url, DEFAULT_SOURCE_URL);
        assert_eq!(config.sync.freshness_window(), Duration::from_secs(3600));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.http.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.http.keep_alive(), Duration::from_secs(15));
    }

    #[test]
    fn test_config_validation() {
        let config = CatalogConfig::default();
        assert!(ConfigManager::validate_config(&config).is_ok());

        let mut bad_url = config.clone();
        bad_url.sync.source_url = "ftp://example.com/apis.json".to_string();
        assert!(ConfigManager::validate_config(&bad_url).is_err());

        let mut bad_timeout = config.clone();
        bad_timeout.sync.request_timeout_secs = 0;
        assert!(ConfigManager::validate_config(&bad_timeout).is_err());

        let mut bad_keep_alive = config.clone();
        bad_keep_alive.http.keep_alive_secs = 0;
        assert!(ConfigManager::validate_config(&bad_keep_alive).is_err());

        let mut bad_level = config;
        bad_level.logging.level = "loud".to_string();
        assert!(ConfigManager::validate_config(&bad_level).is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CatalogConfig =
            toml::from_str("[sync]\nfreshness_window_secs = 60\n").unwrap();
        assert_eq!(config.sync.freshness_window_secs, 60);
        assert_eq!(config.sync.source_url, DEFAULT_SOURCE_URL);
        assert_eq!(config.sync.request_timeout_secs, 30);
    }

    #[test]
    #[serial]
    fn test_explicit_file_and_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        ConfigManager::create_default_config(&path).unwrap();

        std::env::set_var("APICATALOG_SOURCE_URL", "http://127.0.0.1:9/apis.json");
        std::env::remove_var("RUST_LOG");
        let manager = ConfigManager::load(Some(&path)).unwrap();
        std::env::remove_var("APICATALOG_SOURCE_URL");

        assert_eq!(manager.config_path(), Some(path.as_path()));
        assert_eq!(
            manager.config().sync.source_url,
            "http://127.0.0.1:9/apis.json"
        );
    }

    fn clear_http_env() {
        std::env::remove_var("APICATALOG_HTTP_HOST");
        std::env::remove_var("APICATALOG_HTTP_PORT");
        std::env::remove_var("APICATALOG_HTTP_KEEP_ALIVE");
    }

    #[test]
    #[serial]
    fn test_http_env_overrides() {
        clear_http_env();
        std::env::set_var("APICATALOG_HTTP_HOST", "0.0.0.0");
        std::env::set_var("APICATALOG_HTTP_PORT", "8080");
        std::env::set_var("APICATALOG_HTTP_KEEP_ALIVE", "30");
        let config = ConfigManager::apply_env_overrides(CatalogConfig::default());
        clear_http_env();

        assert_eq!(config.http.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.http.keep_alive_secs, 30);
    }

    #[test]
    #[serial]
    fn test_unparsable_http_env_keeps_file_values() {
        clear_http_env();
        std::env::set_var("APICATALOG_HTTP_PORT", "not_a_number");
        std::env::set_var("APICATALOG_HTTP_KEEP_ALIVE", "-1");
        let base: CatalogConfig = toml::from_str("[http]\nport = 4100\n").unwrap();
        let config = ConfigManager::apply_env_overrides(base);
        clear_http_env();

        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 4100);
        assert_eq!(config.http.keep_alive_secs, 15);
    }

    #[test]
    #[serial]
    fn test_summary_is_deferred_until_logging_is_ready() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        ConfigManager::create_default_config(&path).unwrap();

        std::env::remove_var("APICATALOG_SOURCE_URL");
        std::env::remove_var("RUST_LOG");
        let manager = ConfigManager::load(Some(&path)).unwrap();
        let summary = manager.summary();

        assert_eq!(summary[0], format!("Config file: {}", path.display()));
        assert_eq!(summary[1], format!("Catalog source: {}", DEFAULT_SOURCE_URL));
        assert_eq!(summary[2], "Freshness window: 3600s");
    }
}
