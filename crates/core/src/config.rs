//! Layered runtime configuration.
//!
//! Values resolve in this order, later layers winning: built-in defaults,
//! `rocketshoes.toml` (or `config/rocketshoes.toml`), `ROCKETSHOES_*`
//! environment variables, then [`ConfigOverrides`] supplied by the caller.
//! The merged result is validated once before it is returned.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::DEFAULT_CART_KEY;

const CONFIG_CANDIDATES: [&str; 2] = ["rocketshoes.toml", "config/rocketshoes.toml"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

/// Where the cart mirror lives.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
    pub cart_key: String,
}

/// The remote product and stock API.
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub api_token: Option<SecretString>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub storage_url: Option<String>,
    pub cart_key: Option<String>,
    pub catalog_base_url: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    /// Fail instead of falling back to defaults when no file is found.
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("config interpolation failed: {0}")]
    Interpolation(String),
    #[error("invalid value for `{key}`: `{value}`")]
    InvalidEnv { key: &'static str, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                url: "sqlite://rocketshoes.db?mode=rwc".to_string(),
                max_connections: 1,
                timeout_secs: 30,
                cart_key: DEFAULT_CART_KEY.to_string(),
            },
            catalog: CatalogConfig {
                base_url: "http://localhost:3333".to_string(),
                timeout_secs: 10,
                api_token: None,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let LoadOptions { config_path, require_file, overrides } = options;
        let mut config = Self::default();

        match locate_file(config_path.as_deref()) {
            Some(path) => config.merge_file(read_file(&path)?),
            None if require_file => {
                let expected = config_path.unwrap_or_else(|| PathBuf::from(CONFIG_CANDIDATES[0]));
                return Err(ConfigError::MissingConfigFile(expected));
            }
            None => {}
        }

        config.merge_env()?;
        config.merge_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    fn merge_file(&mut self, file: FileConfig) {
        let FileConfig { storage, catalog, logging } = file;

        set(&mut self.storage.url, storage.url);
        set(&mut self.storage.max_connections, storage.max_connections);
        set(&mut self.storage.timeout_secs, storage.timeout_secs);
        set(&mut self.storage.cart_key, storage.cart_key);

        set(&mut self.catalog.base_url, catalog.base_url);
        set(&mut self.catalog.timeout_secs, catalog.timeout_secs);
        if let Some(token) = catalog.api_token {
            self.catalog.api_token = Some(SecretString::from(token));
        }

        set(&mut self.logging.level, logging.level);
        set(&mut self.logging.format, logging.format);
    }

    fn merge_env(&mut self) -> Result<(), ConfigError> {
        set(&mut self.storage.url, env_value("ROCKETSHOES_STORAGE_URL"));
        set(
            &mut self.storage.max_connections,
            env_parsed("ROCKETSHOES_STORAGE_MAX_CONNECTIONS")?,
        );
        set(&mut self.storage.timeout_secs, env_parsed("ROCKETSHOES_STORAGE_TIMEOUT_SECS")?);
        set(&mut self.storage.cart_key, env_value("ROCKETSHOES_CART_KEY"));

        set(&mut self.catalog.base_url, env_value("ROCKETSHOES_CATALOG_BASE_URL"));
        set(&mut self.catalog.timeout_secs, env_parsed("ROCKETSHOES_CATALOG_TIMEOUT_SECS")?);
        if let Some(token) = env_value("ROCKETSHOES_CATALOG_API_TOKEN") {
            self.catalog.api_token = Some(SecretString::from(token));
        }

        set(&mut self.logging.level, env_value("ROCKETSHOES_LOG_LEVEL"));
        if let Some(format) = env_value("ROCKETSHOES_LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }
        Ok(())
    }

    fn merge_overrides(&mut self, overrides: ConfigOverrides) {
        set(&mut self.storage.url, overrides.storage_url);
        set(&mut self.storage.cart_key, overrides.cart_key);
        set(&mut self.catalog.base_url, overrides.catalog_base_url);
        set(&mut self.logging.level, overrides.log_level);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.storage.url.trim();
        require(
            url.starts_with("sqlite:") || url == ":memory:",
            "storage.url must be a sqlite URL (`sqlite://...` or `sqlite::memory:`)",
        )?;
        require(self.storage.max_connections > 0, "storage.max_connections must be at least 1")?;
        require(self.storage.timeout_secs > 0, "storage.timeout_secs must be at least 1")?;
        require(!self.storage.cart_key.trim().is_empty(), "storage.cart_key must not be empty")?;

        let base_url = self.catalog.base_url.trim();
        require(
            base_url.starts_with("http://") || base_url.starts_with("https://"),
            "catalog.base_url must start with http:// or https://",
        )?;
        require(self.catalog.timeout_secs > 0, "catalog.timeout_secs must be at least 1")?;

        require(
            matches!(
                self.logging.level.trim().to_ascii_lowercase().as_str(),
                "trace" | "debug" | "info" | "warn" | "error"
            ),
            "logging.level must be one of trace|debug|info|warn|error",
        )
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn require(condition: bool, message: &str) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Validation(message.to_string()))
    }
}

fn locate_file(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => path.is_file().then(|| path.to_path_buf()),
        None => CONFIG_CANDIDATES.iter().map(PathBuf::from).find(|path| path.is_file()),
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    let expanded = expand_env(&raw)?;
    toml::from_str(&expanded)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Replaces every `${NAME}` with the value of environment variable `NAME`.
fn expand_env(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| {
            ConfigError::Interpolation("unterminated `${` expression".to_string())
        })?;
        let name = &after[..end];
        let value = env::var(name).map_err(|_| {
            ConfigError::Interpolation(format!("environment variable `{name}` is not set"))
        })?;
        output.push_str(&value);
        rest = &after[end + 1..];
    }

    output.push_str(rest);
    Ok(output)
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parsed<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env_value(key) {
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(ConfigError::InvalidEnv { key, value }),
        },
        None => Ok(None),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    storage: StorageFile,
    catalog: CatalogFile,
    logging: LoggingFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StorageFile {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
    cart_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CatalogFile {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    api_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LoggingFile {
    level: Option<String>,
    format: Option<LogFormat>,
}
