// 💱 Exchange-Rate Provisioner
// Ensures the local rate cache exists (fetched once, never refreshed) and loads it
// into a read-only RateTable.

use crate::error::{MissingRateError, ProvisionError, RateFileError};
use crate::fetch::Fetcher;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

// ============================================================================
// PROVISIONING
// ============================================================================

/// What `ensure_rate_file` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioned {
    /// Cache already on disk; nothing fetched
    AlreadyPresent,
    /// Cache fetched and written verbatim
    Downloaded { bytes: usize },
}

/// Make sure `local_path` exists, fetching `remote_url` only when it does not.
/// Existing content is authoritative; there is no freshness check.
pub fn ensure_rate_file(
    fetcher: &dyn Fetcher,
    local_path: &Path,
    remote_url: &str,
) -> Result<Provisioned, ProvisionError> {
    if local_path.exists() {
        log::debug!("Exchange rates cached at {}", local_path.display());
        return Ok(Provisioned::AlreadyPresent);
    }

    log::info!("Downloading exchange rates from {}", remote_url);
    let body = fetcher.fetch(remote_url).map_err(|source| ProvisionError::Fetch {
        url: remote_url.to_string(),
        source,
    })?;

    fs::write(local_path, &body).map_err(|source| ProvisionError::Write {
        path: local_path.to_path_buf(),
        source,
    })?;

    log::info!(
        "Saved {} bytes of exchange rates to {}",
        body.len(),
        local_path.display()
    );
    Ok(Provisioned::Downloaded { bytes: body.len() })
}

// ============================================================================
// RATE TABLE
// ============================================================================

/// Currency code → multiplier from USD
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, currency: impl Into<String>, rate: f64) {
        self.rates.insert(currency.into(), rate);
    }

    pub fn rate(&self, currency: &str) -> Result<f64, MissingRateError> {
        self.rates
            .get(currency)
            .copied()
            .ok_or_else(|| MissingRateError {
                currency: currency.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut table = RateTable::new();
        for (currency, rate) in iter {
            table.insert(currency, rate);
        }
        table
    }
}

/// Read the cached CSV. After the header row, the first column is the currency
/// code and the second the rate, whatever the header calls them.
/// A repeated currency keeps its last rate.
pub fn load_rates(path: &Path) -> Result<RateTable, RateFileError> {
    let read_err = |source| RateFileError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(read_err)?;

    let mut table = RateTable::new();

    for result in reader.records() {
        let record = result.map_err(read_err)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() < 2 {
            return Err(RateFileError::Columns {
                line,
                found: record.len(),
            });
        }

        let currency = record[0].trim();
        let value = record[1].trim();
        let rate: f64 = value.parse().map_err(|_| RateFileError::Rate {
            line,
            currency: currency.to_string(),
            value: value.to_string(),
        })?;

        table.insert(currency, rate);
    }

    log::debug!("Loaded {} exchange rates from {}", table.len(), path.display());
    Ok(table)
}
