// Banks ETL - Core Library
// Largest banks by market capitalization: scrape → convert currencies → CSV + SQLite

pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod progress;
pub mod rates;
pub mod records;
pub mod sink;
pub mod transform;

// Re-export commonly used types
pub use config::{EtlConfig, LocatorConfig, DEFAULT_CONFIG_FILE};
pub use error::{
    ConfigError, EtlError, ExtractError, MissingRateError, NoTableFoundError, PageFetchError,
    ProvisionError, RateFileError, SinkError,
};
pub use extract::{
    extract, locate_table, parse_fields, Extraction, MarkerPredicate, RowOutcome, RowParseError,
    RowSkip, TablePredicate, TableSelection,
};
pub use fetch::{Fetcher, HttpFetcher};
pub use pipeline::{run, RunSummary};
pub use progress::ProgressLog;
pub use rates::{ensure_rate_file, load_rates, Provisioned, RateTable};
pub use records::{BankRecord, Columns, ConvertedRecord};
pub use sink::{
    close_database, open_database, read_csv, run_query, write_csv, write_table, QueryResult,
};
pub use transform::{round2, transform};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
