use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{ScoutError, ScoutResult};
use crate::mapper::DEFAULT_CONCURRENCY;
use crate::population::{DEFAULT_BASE_URL, DEFAULT_TOP_N};
use crate::rank::SortOrder;

/// Configuration for loading and presenting country data.
///
/// # Configuration Locations
///
/// Values are layered, later sources overriding earlier ones:
/// 1. Global `$CONFIG_DIR/popscout/config.yaml`
/// 2. Local `.popscout.yaml` in the current directory
/// 3. Custom config file given via `--config`
///
/// Missing global and local files are skipped. A custom file that does not
/// exist is an error.
///
/// # Configuration Format
///
/// ```yaml
/// # Root of the population API
/// base_url: "https://d6wn6bmjj722w.population.io/1.0"
///
/// # Population requests in flight at once
/// concurrency: 8
///
/// # Rows in the country table
/// top_n: 10
///
/// # Table order, "country" or "population" plus "asc" or "desc"
/// sort: "population:desc"
///
/// # Per-request timeout
/// request_timeout_secs: 30
///
/// # Drop regions, income groups and continents from the list
/// exclude_aggregates: true
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
///
/// Command-line arguments take precedence, see [`ScoutConfig::merge_with_cli`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// Root URL of the population service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Maximum number of population requests in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: NonZeroUsize,

    /// Number of rows shown in the country table
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Table order as `key:dir`
    #[serde(default = "default_sort")]
    pub sort: String,

    /// Timeout applied to each HTTP request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Whether aggregate entries are dropped from the country list
    #[serde(default = "default_exclude_aggregates")]
    pub exclude_aggregates: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_concurrency() -> NonZeroUsize {
    DEFAULT_CONCURRENCY
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_sort() -> String {
    SortOrder::default().to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_exclude_aggregates() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            concurrency: default_concurrency(),
            top_n: default_top_n(),
            sort: default_sort(),
            request_timeout_secs: default_request_timeout_secs(),
            exclude_aggregates: default_exclude_aggregates(),
            log_level: default_log_level(),
        }
    }
}

/// Values given on the command line; `None` keeps the file value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub concurrency: Option<NonZeroUsize>,
    pub top_n: Option<usize>,
    pub sort: Option<String>,
    pub log_level: Option<String>,
}

impl ScoutConfig {
    /// Loads configuration from the default locations, layering
    /// `config_path` on top when given
    pub fn load_from(config_path: Option<&Path>) -> ScoutResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("popscout/config.yaml")),
            Some(PathBuf::from(".popscout.yaml")),
        ];
        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicitly requested file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        if let Some(base_url) = cli.base_url {
            self.base_url = base_url;
        }
        if let Some(concurrency) = cli.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(top_n) = cli.top_n {
            self.top_n = top_n;
        }
        if let Some(sort) = cli.sort {
            self.sort = sort;
        }
        if let Some(log_level) = cli.log_level {
            self.log_level = log_level;
        }
        self
    }

    /// The parsed table order
    pub fn sort_order(&self) -> ScoutResult<SortOrder> {
        self.sort.parse()
    }

    fn validate(&self) -> ScoutResult<()> {
        self.sort_order()?;
        if self.request_timeout_secs == 0 {
            return Err(ScoutError::config_error(
                "request_timeout_secs must be greater than 0",
            ));
        }
        Ok(())
    }
}
