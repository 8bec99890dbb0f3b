//! Configuration for the `claimdesk` binary
//!
//! Sources, later ones winning:
//!
//! 1. built-in defaults
//! 2. `claimdesk.toml` in the working directory (or the file given with
//!    `--config`), optional
//! 3. `CLAIMDESK__<SECTION>__<KEY>` environment variables, e.g.
//!    `CLAIMDESK__VIEW__DEFAULT_CURRENCY=USD`
//!
//! A `.env` file is loaded into the environment first.

use anyhow::Context;
use claimdesk_claims::{FixedDelay, Immediate, RefetchTrigger, ViewOptions};
use claimdesk_resolve::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "claimdesk";
const ENV_PREFIX: &str = "CLAIMDESK";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace | debug | info | warn | error
    pub level: String,
    pub json: bool,
    pub file_enabled: bool,
    pub file_directory: String,
    pub file_prefix: String,
    /// daily | hourly | minutely | never
    pub file_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
            file_enabled: false,
            file_directory: "logs".to_string(),
            file_prefix: "claimdesk".to_string(),
            file_rotation: "daily".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub default_currency: String,
    pub max_resolve_depth: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_currency: "INR".to_string(),
            max_resolve_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ViewConfig {
    pub fn options(&self) -> ViewOptions {
        ViewOptions {
            default_currency: self.default_currency.clone(),
            max_resolve_depth: self.max_resolve_depth,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Wait after an acknowledged write before refetching; 0 refetches at once
    pub refetch_delay_ms: u64,
    /// Token passed to the list collaborator
    pub token: Option<String>,
}

impl WorkflowConfig {
    pub fn refetch_trigger(&self) -> Arc<dyn RefetchTrigger> {
        if self.refetch_delay_ms == 0 {
            Arc::new(Immediate)
        } else {
            Arc::new(FixedDelay(Duration::from_millis(self.refetch_delay_ms)))
        }
    }
}

impl Config {
    /// Load from `path`, which must then exist, or else from the optional
    /// default file; the environment is layered on top either way
    pub fn load_from(path: Option<&Path>) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration sources")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Parse a TOML document, without file or environment sources
    pub fn from_toml_str(toml: &str) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn validate(&self) -> Result<(), String> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        const ROTATIONS: [&str; 4] = ["daily", "hourly", "minutely", "never"];

        if !LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(format!("logging.level '{}' is not a log level", self.logging.level));
        }
        if self.logging.file_enabled && !ROTATIONS.contains(&self.logging.file_rotation.as_str()) {
            return Err(format!(
                "logging.file_rotation must be one of {:?}",
                ROTATIONS
            ));
        }

        let currency = &self.view.default_currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(format!(
                "view.default_currency '{}' is not an ISO 4217 code",
                currency
            ));
        }
        if self.view.max_resolve_depth == 0 {
            return Err("view.max_resolve_depth must be at least 1".to_string());
        }

        Ok(())
    }
}
