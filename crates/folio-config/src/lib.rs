//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. The resulting
//! [`Config`] is built once at process start and handed to whatever needs it;
//! nothing else in the workspace reads the process environment.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `site.environment` (default `${FOLIO_ENV:-development}`)
//! - `site.url` (default `${FOLIO_SITE_URL:-}`)
//!
//! ## Required Settings
//!
//! Settings such as `site.url` are required in production: a missing value
//! fails [`Config::load`]. In development a placeholder (`site.url-dev-value`)
//! is substituted and a warning is logged.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override content repository checkout directory.
    pub source_dir: Option<PathBuf>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Content repository configuration (paths are relative strings from TOML).
    content: ContentConfigRaw,
    /// Cache configuration.
    pub cache: CacheConfig,
    /// Deployment settings as written in TOML.
    site: SiteConfigRaw,
    /// Content compilation options.
    pub render: RenderConfig,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Resolved and validated deployment settings (set after loading).
    #[serde(skip)]
    pub site_resolved: SiteConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3000,
        }
    }
}

/// Raw content configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    source_dir: Option<String>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ContentConfig {
    /// Checkout of the content repository (contains `content/{area}/...`).
    pub source_dir: PathBuf,
    /// Project directory for folio data (`.folio/`).
    pub project_dir: PathBuf,
}

impl ContentConfig {
    /// Cache directory path (`.folio/cache/`).
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.project_dir.join("cache")
    }
}

/// Cache backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CacheBackend {
    /// In-process cache with expiry.
    #[default]
    Memory,
    /// File cache under the project directory.
    File,
}

/// Cache configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether caching is enabled.
    pub enabled: bool,
    /// Backend used when enabled.
    pub backend: CacheBackend,
    /// Entry lifetime for the memory backend, in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: CacheBackend::Memory,
            ttl_secs: 3600,
        }
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local development: missing required settings fall back to placeholders.
    #[default]
    Development,
    /// Production: missing required settings are fatal.
    Production,
}

impl Environment {
    /// Parse an environment name (`development`/`dev`, `production`/`prod`).
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::Validation(format!(
                "site.environment must be \"development\" or \"production\", got \"{other}\""
            ))),
        }
    }

    /// Whether this is the production environment.
    #[must_use]
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// Raw deployment settings as written in TOML.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct SiteConfigRaw {
    environment: String,
    url: String,
}

impl Default for SiteConfigRaw {
    fn default() -> Self {
        Self {
            environment: "${FOLIO_ENV:-development}".to_owned(),
            url: "${FOLIO_SITE_URL:-}".to_owned(),
        }
    }
}

/// Resolved deployment settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Deployment environment.
    pub environment: Environment,
    /// Public base URL of the site.
    pub url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            url: placeholder("site.url"),
        }
    }
}

/// Guard used by the pre-container unwrapping pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PreUnwrapMode {
    /// Historical guard: skip only when the `pre` is first among several children.
    #[default]
    Literal,
    /// Unwrap only when the `pre` is the wrapper's only child.
    SoleChild,
}

/// What to do when one page of a directory fails to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BatchFailureMode {
    /// Log the failure and leave the page out of the listing.
    #[default]
    Skip,
    /// Fail the whole listing.
    Abort,
}

/// Content compilation options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Guard for the pre-container unwrapping pass.
    pub pre_unwrap: PreUnwrapMode,
    /// Resolve embeddable links over the network (oEmbed).
    pub embeds: bool,
    /// Timeout for a single embed lookup, in seconds.
    pub embed_timeout_secs: u64,
    /// Per-page failure policy for directory listings.
    pub batch_failure: BatchFailureMode,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pre_unwrap: PreUnwrapMode::Literal,
            embeds: true,
            embed_timeout_secs: 10,
            batch_failure: BatchFailureMode::Skip,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.url`").
        field: String,
        /// Error message (e.g., "${`FOLIO_SITE_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

fn placeholder(field: &str) -> String {
    format!("{field}-dev-value")
}

/// Resolve a setting that must be present in production.
///
/// Empty values are fatal in production and replaced by a placeholder in
/// development.
fn required_setting(
    value: &str,
    field: &str,
    environment: Environment,
) -> Result<String, ConfigError> {
    if !value.is_empty() {
        return Ok(value.to_owned());
    }
    if environment.is_production() {
        return Err(ConfigError::Validation(format!(
            "{field} is required in production"
        )));
    }
    tracing::warn!(field, "required setting missing, using development placeholder");
    Ok(placeholder(field))
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents,
    /// falling back to defaults relative to the current directory.
    ///
    /// Environment expansion, path resolution and validation happen here, so
    /// a returned `Config` is always complete.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails, or
    /// a required production setting is missing.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            let cwd = std::env::current_dir().unwrap_or_default();
            let mut config = Self::default_with_base(&cwd);
            config.finish(&cwd)?;
            config
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(source_dir) = &settings.source_dir {
            self.content_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.cache.enabled = cache_enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to given base directory.
    ///
    /// Site settings are the development defaults; no environment lookup
    /// happens here.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            content: ContentConfigRaw::default(),
            cache: CacheConfig::default(),
            site: SiteConfigRaw::default(),
            render: RenderConfig::default(),
            content_resolved: ContentConfig {
                source_dir: base.to_path_buf(),
                project_dir: base.join(".folio"),
            },
            site_resolved: SiteConfig::default(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.finish(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Expand environment variables, then resolve paths and site settings.
    fn finish(&mut self, base: &Path) -> Result<(), ConfigError> {
        self.expand_env_vars()?;
        self.resolve_paths(base);
        self.resolve_site()
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }
        if self.cache.enabled && self.cache.ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "cache.ttl_secs must be greater than 0".to_owned(),
            ));
        }
        if self.site_resolved.environment.is_production() {
            require_http_url(&self.site_resolved.url, "site.url")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        self.site.environment = expand::expand_env(&self.site.environment, "site.environment")?;
        self.site.url = expand::expand_env(&self.site.url, "site.url")?;
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.content_resolved = ContentConfig {
            source_dir: config_dir.join(self.content.source_dir.as_deref().unwrap_or(".")),
            project_dir: config_dir.join(".folio"),
        };
    }

    /// Resolve the deployment environment and its required settings.
    fn resolve_site(&mut self) -> Result<(), ConfigError> {
        let environment = Environment::parse(&self.site.environment)?;
        let url = required_setting(self.site.url.trim(), "site.url", environment)?;
        self.site_resolved = SiteConfig { environment, url };
        Ok(())
    }
}
