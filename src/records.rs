// 🏦 Bank Records
// Row-level values flowing through the pipeline:
// BankRecord (extracted) → ConvertedRecord (transformed) → CSV / SQLite rows

// ============================================================================
// RECORDS
// ============================================================================

/// One bank row as extracted from the source table
#[derive(Debug, Clone, PartialEq)]
pub struct BankRecord {
    pub name: String,
    /// Market capitalization in billions of US$
    pub market_cap_usd: f64,
}

impl BankRecord {
    pub fn new(name: impl Into<String>, market_cap_usd: f64) -> Self {
        BankRecord {
            name: name.into(),
            market_cap_usd,
        }
    }
}

/// A BankRecord extended with the converted currency columns.
/// GBP/EUR/INR are always derived from `bank.market_cap_usd` and one rate table.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedRecord {
    pub bank: BankRecord,
    pub market_cap_gbp: f64,
    pub market_cap_eur: f64,
    pub market_cap_inr: f64,
}

impl ConvertedRecord {
    pub fn name(&self) -> &str {
        &self.bank.name
    }

    pub fn market_cap_usd(&self) -> f64 {
        self.bank.market_cap_usd
    }

    /// (name, usd, gbp, eur, inr) in output column order
    pub fn as_tuple(&self) -> (&str, f64, f64, f64, f64) {
        (
            self.name(),
            self.market_cap_usd(),
            self.market_cap_gbp,
            self.market_cap_eur,
            self.market_cap_inr,
        )
    }
}

// ============================================================================
// COLUMN NAMES
// ============================================================================

pub const GBP_COLUMN: &str = "MC_GBP_Billion";
pub const EUR_COLUMN: &str = "MC_EUR_Billion";
pub const INR_COLUMN: &str = "MC_INR_Billion";

/// Output column names. Name/USD come from the extraction attributes,
/// the converted columns are fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    pub name: String,
    pub usd: String,
}

impl Default for Columns {
    fn default() -> Self {
        Columns {
            name: "Name".to_string(),
            usd: "MC_USD_Billion".to_string(),
        }
    }
}

impl Columns {
    /// All five columns in output order
    pub fn all(&self) -> [&str; 5] {
        [
            self.name.as_str(),
            self.usd.as_str(),
            GBP_COLUMN,
            EUR_COLUMN,
            INR_COLUMN,
        ]
    }
}
