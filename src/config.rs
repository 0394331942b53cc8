//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.mesto.toml` files.

use crate::api::ApiConfig;
use crate::models::Locale;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".mesto.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Backend connection settings.
    #[serde(default)]
    pub api: ApiSection,

    /// Output settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Language of labels and placeholders.
    #[serde(default)]
    pub locale: Locale,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            locale: Locale::En,
        }
    }
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    /// Server root URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Cohort path segment.
    #[serde(default = "default_cohort")]
    pub cohort: String,

    /// Authorization token. Prefer the `MESTO_TOKEN` env var over storing it here.
    #[serde(default)]
    pub token: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cohort: default_cohort(),
            token: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://nomoreparties.co/v1".to_string()
}

fn default_cohort() -> String {
    "wff-cohort-1".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Show image links in the feed.
    #[serde(default = "default_true")]
    pub show_links: bool,

    /// Number of entries in the "most liked" table of the feed.
    #[serde(default = "default_top_cards")]
    pub top_cards: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            show_links: true,
            top_cards: default_top_cards(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_top_cards() -> usize {
    5
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

    /// Try to load `.mesto.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values the user actually passed override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref base_url) = args.base_url {
            self.api.base_url = base_url.clone();
        }
        if let Some(ref cohort) = args.cohort {
            self.api.cohort = cohort.clone();
        }
        if let Some(ref token) = args.token {
            self.api.token = token.clone();
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }
        if let Some(locale) = args.locale {
            self.general.locale = locale;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Connection settings for the HTTP client.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api.base_url.clone(),
            cohort: self.api.cohort.clone(),
            token: self.api.token.clone(),
            timeout_seconds: self.api.timeout_seconds,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
