//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (WAYFARER_*)
//! 2. TOML config file (if WAYFARER_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::Purpose;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (WAYFARER_*), nested keys split on `__`
/// 2. TOML config file (if WAYFARER_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Product prefix shared by every cache partition name.
    ///
    /// Set via WAYFARER_PRODUCT environment variable.
    #[serde(default = "default_product")]
    pub product: String,

    /// Cache version. Bumping it retires every partition of older versions
    /// at the next activation.
    ///
    /// Set via WAYFARER_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: u32,

    /// Path to SQLite cache database.
    ///
    /// Set via WAYFARER_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Site origin that site-relative paths (seed assets, offline page)
    /// resolve against.
    ///
    /// Set via WAYFARER_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path of the offline fallback page. Should also be a seed asset.
    #[serde(default = "default_offline_path")]
    pub offline_path: String,

    /// Paths pre-cached into the static partition at install time.
    #[serde(default = "default_seed_assets")]
    pub seed_assets: Vec<String>,

    /// Maximum entry counts per partition purpose.
    #[serde(default)]
    pub limits: CacheLimits,

    /// URL patterns used by the request classifier.
    #[serde(default)]
    pub routes: RouteConfig,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via WAYFARER_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via WAYFARER_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via WAYFARER_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Maximum number of entries kept per partition purpose.
///
/// The static partition is unbounded: its assets are versioned by build hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheLimits {
    #[serde(default = "default_images_limit")]
    pub images: usize,
    #[serde(default = "default_api_limit")]
    pub api: usize,
    #[serde(default = "default_dynamic_limit")]
    pub dynamic: usize,
}

impl CacheLimits {
    /// Limit for a purpose, `None` when unbounded.
    pub fn for_purpose(&self, purpose: Purpose) -> Option<usize> {
        match purpose {
            Purpose::Static => None,
            Purpose::Dynamic => Some(self.dynamic),
            Purpose::Images => Some(self.images),
            Purpose::Api => Some(self.api),
        }
    }
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self { images: default_images_limit(), api: default_api_limit(), dynamic: default_dynamic_limit() }
    }
}

/// URL patterns for request classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Path prefixes reserved for the JSON API.
    #[serde(default = "default_api_prefixes")]
    pub api_prefixes: Vec<String>,

    /// Substrings that mark a full URL as an API resource.
    #[serde(default = "default_api_markers")]
    pub api_markers: Vec<String>,

    /// Path prefixes of the framework build output and the images directory.
    #[serde(default = "default_static_prefixes")]
    pub static_prefixes: Vec<String>,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            api_prefixes: default_api_prefixes(),
            api_markers: default_api_markers(),
            static_prefixes: default_static_prefixes(),
        }
    }
}

fn default_product() -> String {
    "wayfarer".into()
}

fn default_cache_version() -> u32 {
    1
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./wayfarer-cache.sqlite")
}

fn default_origin() -> String {
    "http://localhost:3000".into()
}

fn default_offline_path() -> String {
    "/offline".into()
}

fn default_seed_assets() -> Vec<String> {
    vec!["/".into(), "/offline".into(), "/images/hero-bg.jpg".into(), "/manifest.json".into()]
}

fn default_images_limit() -> usize {
    50
}

fn default_api_limit() -> usize {
    30
}

fn default_dynamic_limit() -> usize {
    40
}

fn default_api_prefixes() -> Vec<String> {
    vec!["/api/".into()]
}

fn default_api_markers() -> Vec<String> {
    vec!["/_next/data/".into()]
}

fn default_static_prefixes() -> Vec<String> {
    vec!["/_next/static/".into(), "/images/".into()]
}

fn default_user_agent() -> String {
    "wayfarer-worker/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            product: default_product(),
            cache_version: default_cache_version(),
            db_path: default_db_path(),
            origin: default_origin(),
            offline_path: default_offline_path(),
            seed_assets: default_seed_assets(),
            limits: CacheLimits::default(),
            routes: RouteConfig::default(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `WAYFARER_`
    /// 2. TOML file from `WAYFARER_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("WAYFARER_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("WAYFARER_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
