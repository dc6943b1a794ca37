//! Configuration types for the watcher
//!
//! The watcher is configured from a TOML file. Required keys are checked
//! together so a single startup error names every missing key.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default fetch timeout in seconds
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Default number of successful checks between full listing reports
const DEFAULT_REPORT_EVERY_CHECKS: u64 = 10;

/// Main watcher configuration (validated)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Page listing the offerings
    pub scrape_url: String,

    /// Delay between the end of one check and the start of the next
    pub check_interval_secs: u64,

    /// Seen-store JSON file
    pub seen_store_path: String,

    /// Webhook endpoint; its presence enables the webhook sink
    pub webhook_url: Option<String>,

    /// Whether the console sink is enabled
    pub console: bool,

    /// Upper bound for a single page fetch
    pub fetch_timeout_secs: u64,

    /// Re-print the full listing every N successful checks (0 disables)
    pub report_every_checks: u64,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// CSS selectors used by the extractor
    pub selectors: SelectorConfig,
}

/// File shape before required keys are checked
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    scrape_url: Option<String>,
    check_interval_secs: Option<u64>,
    seen_store_path: Option<String>,
    webhook_url: Option<String>,
    console: Option<bool>,
    fetch_timeout_secs: Option<u64>,
    report_every_checks: Option<u64>,
    log_level: Option<String>,
    #[serde(default)]
    selectors: SelectorConfig,
}

impl WatcherConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::config(format!("TOML parsing error: {}", e)))?;

        let mut missing = Vec::new();
        if raw.scrape_url.is_none() {
            missing.push("scrape_url");
        }
        if raw.check_interval_secs.is_none() {
            missing.push("check_interval_secs");
        }
        if raw.seen_store_path.is_none() {
            missing.push("seen_store_path");
        }

        let (Some(scrape_url), Some(check_interval_secs), Some(seen_store_path)) =
            (raw.scrape_url, raw.check_interval_secs, raw.seen_store_path)
        else {
            return Err(Error::config(format!(
                "Missing required configuration keys: {}",
                missing.join(", ")
            )));
        };

        let config = Self {
            scrape_url,
            check_interval_secs,
            seen_store_path,
            webhook_url: raw.webhook_url,
            console: raw.console.unwrap_or(true),
            fetch_timeout_secs: raw.fetch_timeout_secs.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
            report_every_checks: raw
                .report_every_checks
                .unwrap_or(DEFAULT_REPORT_EVERY_CHECKS),
            log_level: raw.log_level.unwrap_or_else(|| "info".to_string()),
            selectors: raw.selectors,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_http_url("scrape_url", &self.scrape_url)?;

        if self.check_interval_secs == 0 {
            return Err(Error::config("check_interval_secs must be > 0"));
        }

        if self.seen_store_path.trim().is_empty() {
            return Err(Error::config("seen_store_path cannot be empty"));
        }

        if let Some(webhook_url) = &self.webhook_url {
            validate_http_url("webhook_url", webhook_url)?;
        }

        if self.fetch_timeout_secs == 0 {
            return Err(Error::config("fetch_timeout_secs must be > 0"));
        }

        if !self.console && self.webhook_url.is_none() {
            return Err(Error::config(
                "No notification sink enabled: set console = true or provide webhook_url",
            ));
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(Error::config(format!(
                    "log_level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                    self.log_level
                )));
            }
        }

        self.selectors.validate()
    }

    /// Engine settings derived from this configuration
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            check_interval: Duration::from_secs(self.check_interval_secs),
            report_every_checks: self.report_every_checks,
            ..EngineSettings::default()
        }
    }

    /// Fetch timeout as a duration
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::config(format!("{} cannot be empty", field)));
    }

    let parsed = url::Url::parse(value)
        .map_err(|e| Error::config(format!("{} is not a valid URL: {}", field, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(Error::config(format!(
            "{} must use HTTP or HTTPS scheme. Got: {}",
            field, scheme
        ))),
    }
}

/// CSS selectors locating listings on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Listings container (first match is used)
    pub container: String,
    /// Item elements inside the container
    pub item: String,
    /// Company heading inside an item
    pub company: String,
    /// Date label inside an item
    pub date: String,
    /// Detail link inside an item (first element with an `href`)
    pub link: String,
}

impl SelectorConfig {
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("selectors.container", &self.container),
            ("selectors.item", &self.item),
            ("selectors.company", &self.company),
            ("selectors.date", &self.date),
            ("selectors.link", &self.link),
        ] {
            if value.trim().is_empty() {
                return Err(Error::config(format!("{} cannot be empty", field)));
            }
        }
        Ok(())
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            container: "ul.halka-arz-list".to_string(),
            item: "li".to_string(),
            company: "h3.il-halka-arz-sirket".to_string(),
            date: "span.il-halka-arz-tarihi".to_string(),
            link: "article a[href]".to_string(),
        }
    }
}

/// Poll engine settings
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Sleep between checks (fixed delay after each cycle completes)
    pub check_interval: Duration,

    /// Full listing report every N successful checks (0 disables)
    pub report_every_checks: u64,

    /// Capacity of the engine event channel
    ///
    /// When full, events are dropped with a warning.
    pub event_channel_capacity: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(300),
            report_every_checks: DEFAULT_REPORT_EVERY_CHECKS,
            event_channel_capacity: 1000,
        }
    }
}
