//! Configuration loading, validation, and management for sdkpack.
//!
//! Loads configuration from `~/.sdkpack/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use sdkpack_core::MinifyOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.sdkpack/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bundle assembly settings (CLI builds and the live strategy)
    #[serde(default)]
    pub build: BuildConfig,

    /// HTTP delivery settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Cache warming settings
    #[serde(default)]
    pub warm: WarmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// SDK library checkout to build from. Without it only cached
    /// fragments can be served.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lib_path: Option<PathBuf>,

    /// Request spec used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<String>,

    /// Read fragments from, and write fragments to, the cache
    #[serde(default)]
    pub cache: bool,

    /// Minify instead of stripping comments
    #[serde(default)]
    pub minify: bool,

    /// Parent directory of the per-library-version cache roots
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Services built when the request is empty
    #[serde(default = "default_services")]
    pub default_services: Vec<String>,

    /// Service every bundle carries even when not requested
    #[serde(default = "default_mandatory_service")]
    pub mandatory_service: String,

    /// Bare global runtime binding referenced by service sources
    #[serde(default = "default_global_binding")]
    pub global_binding: String,

    /// Bundle-qualified form the bare binding is rewritten to
    #[serde(default = "default_qualified_binding")]
    pub qualified_binding: String,

    /// Core runtime entry point, relative to `lib_path`
    #[serde(default = "default_core_entry")]
    pub core_entry: PathBuf,

    /// External bundler argv; the entry path is appended. Empty = read the
    /// entry file as an already-bundled script.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bundler_command: Vec<String>,

    #[serde(default)]
    pub minify_options: MinifyOptions,
}

fn default_cache_dir() -> PathBuf {
    AppConfig::config_dir().join("cache")
}
fn default_services() -> Vec<String> {
    ["dynamodb", "s3", "sqs", "sns", "sts"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_mandatory_service() -> String {
    "sts".into()
}
fn default_global_binding() -> String {
    "AWS".into()
}
fn default_qualified_binding() -> String {
    "window.AWS".into()
}
fn default_core_entry() -> PathBuf {
    PathBuf::from("lib").join("browser.js")
}
fn default_true() -> bool {
    true
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            lib_path: None,
            services: None,
            cache: false,
            minify: false,
            cache_dir: default_cache_dir(),
            default_services: default_services(),
            mandatory_service: default_mandatory_service(),
            global_binding: default_global_binding(),
            qualified_binding: default_qualified_binding(),
            core_entry: default_core_entry(),
            bundler_command: vec![],
            minify_options: MinifyOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Serve the cached versions found under `cache_dir`
    #[serde(default = "default_true")]
    pub cache: bool,

    /// One sub-directory per served library version. Defaults to the
    /// build cache, which is where `warm` writes.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Library checkout served live as `latest`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_lib_path: Option<PathBuf>,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cache: true,
            cache_dir: default_cache_dir(),
            master_lib_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarmConfig {
    /// Libraries warmed at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    4
}

impl Default for WarmConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.sdkpack/config.toml)
    /// and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with_env(&config_path)
    }

    /// Load from a specific path, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_with(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// Every knob is read as `SDKPACK_<NAME>` first, then as the bare
    /// `<NAME>` the original build scripts used:
    /// `SERVICES`, `MINIFY`, `CACHE`, `NO_CACHE`, `LIB_PATH`, `CACHE_ROOT`,
    /// `USE_MASTER`, `PORT`. `USE_MASTER` is a flag: it serves the
    /// configured `lib_path` live as `latest`.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("SDKPACK_{name}")).or_else(|| lookup(name));

        if let Some(services) = get("SERVICES").filter(|s| !s.is_empty()) {
            self.build.services = Some(services);
        }
        if get("MINIFY").is_some_and(|v| truthy(&v)) {
            self.build.minify = true;
        }
        if get("CACHE").is_some_and(|v| truthy(&v)) {
            self.build.cache = true;
        }
        if get("NO_CACHE").is_some_and(|v| truthy(&v)) {
            self.build.cache = false;
            self.server.cache = false;
        }
        if let Some(path) = get("LIB_PATH").filter(|s| !s.is_empty()) {
            self.build.lib_path = Some(PathBuf::from(path));
        }
        if let Some(root) = get("CACHE_ROOT").filter(|s| !s.is_empty()) {
            self.build.cache_dir = PathBuf::from(&root);
            self.server.cache_dir = PathBuf::from(root);
        }
        if get("USE_MASTER").is_some_and(|v| truthy(&v)) {
            match &self.build.lib_path {
                Some(path) => self.server.master_lib_path = Some(path.clone()),
                None => tracing::warn!("USE_MASTER is set but no lib_path is configured"),
            }
        }
        if let Some(port) = get("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring unparseable PORT override"),
            }
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".sdkpack")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mandatory = &self.build.mandatory_service;
        if mandatory.is_empty() || mandatory.contains(',') || sdkpack_core::request::validate(mandatory).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "mandatory_service must be a single service name, got '{mandatory}'"
            )));
        }

        for service in &self.build.default_services {
            if service.is_empty()
                || service.contains(',')
                || sdkpack_core::request::validate(service).is_err()
            {
                return Err(ConfigError::ValidationError(format!(
                    "default_services entry '{service}' is not a valid service token"
                )));
            }
        }

        if self.build.global_binding.is_empty() || self.build.qualified_binding.is_empty() {
            return Err(ConfigError::ValidationError(
                "global_binding and qualified_binding must not be empty".into(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError("server.port must be > 0".into()));
        }

        if self.warm.concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "warm.concurrency must be >= 1".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Environment flags count as set unless empty, `0`, or `false`.
fn truthy(value: &str) -> bool {
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
