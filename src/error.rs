// ⚠️ Error Taxonomy
// One enum per pipeline stage. Row-level failures live in extract::RowParseError
// and are recorded, never raised.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by fetchers (reqwest in production, fakes in tests)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Exchange-rate cache could not be provisioned
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to fetch exchange rates from {url}")]
    Fetch {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to write exchange rates to {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// HTML page could not be fetched or decoded
#[derive(Debug, Error)]
#[error("failed to fetch page {url}")]
pub struct PageFetchError {
    pub url: String,
    #[source]
    pub source: BoxError,
}

/// Document has no table carrying the marker class
#[derive(Debug, Error)]
#[error("no table with class '{class}' found in document")]
pub struct NoTableFoundError {
    pub class: String,
}

/// Extraction failed as a whole
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    NoTable(#[from] NoTableFoundError),

    #[error("invalid CSS selector '{selector}'")]
    InvalidSelector { selector: String },

    #[error("expected exactly 2 extracted column names, got {0}")]
    ColumnCount(usize),
}

/// Rate cache unreadable or malformed
#[derive(Debug, Error)]
pub enum RateFileError {
    #[error("failed to read exchange rate file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("line {line}: expected 2 columns (currency, rate), found {found}")]
    Columns { line: u64, found: usize },

    #[error("line {line}: rate '{value}' for {currency} is not a number")]
    Rate {
        line: u64,
        currency: String,
        value: String,
    },
}

/// Required currency absent from the rate table
#[derive(Debug, Error, PartialEq, Eq)]
#[error("exchange rate for '{currency}' not found in rate table")]
pub struct MissingRateError {
    pub currency: String,
}

/// CSV / SQLite sink failure
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("CSV error on {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("CSV row {row} has {found} fields, expected {expected}")]
    CsvShape {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("CSV row {row}: field '{field}' value '{value}' is not a number")]
    CsvNumber {
        row: usize,
        field: String,
        value: String,
    },

    #[error("invalid table name '{0}'")]
    TableName(String),

    #[error("query is not read-only: {0}")]
    NotReadOnly(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// Configuration file unreadable or invalid
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Any fatal pipeline failure
#[derive(Debug, Error)]
pub enum EtlError {
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    PageFetch(#[from] PageFetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    RateFile(#[from] RateFileError),

    #[error(transparent)]
    MissingRate(#[from] MissingRateError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("failed to write progress log {}", .path.display())]
    ProgressLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to print query output")]
    Output(#[source] std::io::Error),
}
