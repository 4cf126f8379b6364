// ⚙️ Configuration
// Every path, URL and locator setting the pipeline needs, passed explicitly into
// each stage. Defaults reproduce the archived-page run; `banks_etl.toml` may
// override any subset of fields.

use crate::error::ConfigError;
use crate::records::{Columns, GBP_COLUMN};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory by the binary
pub const DEFAULT_CONFIG_FILE: &str = "banks_etl.toml";

pub const DEFAULT_PAGE_URL: &str =
    "https://web.archive.org/web/20230908091635/https://en.wikipedia.org/wiki/List_of_largest_banks";
pub const DEFAULT_EXCHANGE_RATE_URL: &str = "https://cf-courses-data.s3.us.cloud-object-storage.appdomain.cloud/IBMSkillsNetwork-PY0221EN-Coursera/labs/v2/exchange_rate.csv";

// ============================================================================
// ETL CONFIG
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    /// Page holding the market-capitalization table
    pub page_url: String,

    /// Remote exchange-rate CSV, fetched only when `exchange_rate_path` is missing
    pub exchange_rate_url: String,

    /// Local exchange-rate cache (default `./exchange_rate.csv`)
    pub exchange_rate_path: PathBuf,

    /// Flat-file output (default `./Largest_banks_data.csv`)
    pub output_csv_path: PathBuf,

    /// SQLite database file (default `Banks.db`)
    pub database_path: PathBuf,

    /// Table replaced on every run (default `Largest_banks`)
    pub table_name: String,

    /// Append-only progress log (default `code_log.txt`)
    pub log_path: PathBuf,

    /// Names of the two extracted columns: bank name, USD market cap
    pub table_attribs: Vec<String>,

    pub locator: LocatorConfig,
}

impl Default for EtlConfig {
    fn default() -> Self {
        EtlConfig {
            page_url: DEFAULT_PAGE_URL.to_string(),
            exchange_rate_url: DEFAULT_EXCHANGE_RATE_URL.to_string(),
            exchange_rate_path: PathBuf::from("./exchange_rate.csv"),
            output_csv_path: PathBuf::from("./Largest_banks_data.csv"),
            database_path: PathBuf::from("Banks.db"),
            table_name: "Largest_banks".to_string(),
            log_path: PathBuf::from("code_log.txt"),
            table_attribs: vec!["Name".to_string(), "MC_USD_Billion".to_string()],
            locator: LocatorConfig::default(),
        }
    }
}

impl EtlConfig {
    /// Parse a TOML document; absent fields keep their defaults
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load `path` if it exists, otherwise fall back to the defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(EtlConfig::default());
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("Loaded configuration from {}", path.display());
        Self::from_toml(&text, path)
    }

    /// The three fixed queries printed at the end of a run, against the
    /// columns the table was actually written with
    pub fn report_queries(&self, columns: &Columns) -> [String; 3] {
        [
            format!("SELECT * FROM {}", self.table_name),
            format!("SELECT AVG({}) FROM {}", GBP_COLUMN, self.table_name),
            format!("SELECT {} from {} LIMIT 5", columns.name, self.table_name),
        ]
    }
}

// ============================================================================
// LOCATOR CONFIG
// ============================================================================

/// How the market-cap table is recognised in the page
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Class every candidate `<table>` must carry
    pub table_class: String,

    /// Substrings the serialized table must all contain to count as a match
    pub markers: Vec<String>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        LocatorConfig {
            table_class: "wikitable".to_string(),
            markers: vec!["Market cap".to_string(), "US$".to_string()],
        }
    }
}
