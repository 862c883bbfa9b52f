//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::intl::Market;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OAuth client id for the marketplace API
    #[serde(default)]
    pub ebay_client_id: Option<String>,

    /// OAuth client secret for the marketplace API
    #[serde(default)]
    pub ebay_client_secret: Option<String>,

    /// Marketplace/region header value for API searches
    #[serde(default = "default_marketplace_id")]
    pub marketplace_id: String,

    /// Scraping gateway endpoint
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Scraping gateway API key; without it fetches go direct
    #[serde(default)]
    pub gateway_api_key: Option<String>,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Base delay between scraped requests in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,

    /// Markets sampled by the international comparison
    #[serde(default = "default_markets")]
    pub markets: Vec<Market>,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_marketplace_id() -> String {
    "EBAY_IT".to_string()
}

fn default_gateway_url() -> String {
    "https://api.scraperapi.com".to_string()
}

fn default_delay_ms() -> u64 {
    2000
}

fn default_delay_jitter_ms() -> u64 {
    3000
}

fn default_markets() -> Vec<Market> {
    vec![Market::It, Market::Us, Market::Uk, Market::De, Market::Jp]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ebay_client_id: None,
            ebay_client_secret: None,
            marketplace_id: default_marketplace_id(),
            gateway_url: default_gateway_url(),
            gateway_api_key: None,
            proxy: None,
            delay_ms: default_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
            markets: default_markets(),
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("arb-scout").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(id) = std::env::var("EBAY_CLIENT_ID") {
            self.ebay_client_id = Some(id);
        }

        if let Ok(secret) = std::env::var("EBAY_CLIENT_SECRET") {
            self.ebay_client_secret = Some(secret);
        }

        if let Ok(key) = std::env::var("SCRAPER_API_KEY") {
            self.gateway_api_key = Some(key);
        }

        if let Ok(proxy) = std::env::var("ARB_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("ARB_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        self
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use: table, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
