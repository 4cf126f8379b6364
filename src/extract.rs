// 🔎 Table Locator & Row Extractor
// Finds the market-capitalization table in an HTML page and turns its rows into
// BankRecords.
//
// Locator: first `<table class="wikitable">` whose markup contains every marker
// ("Market cap", "US$"); if none does, the first table of the class (fallback).
// Rows: best effort. A bad row is recorded as skipped and extraction carries on.

use crate::config::LocatorConfig;
use crate::error::{ExtractError, NoTableFoundError};
use crate::records::{BankRecord, Columns};
use scraper::{ElementRef, Html, Selector};
use std::fmt;

// ============================================================================
// TABLE SELECTION
// ============================================================================

/// Content test applied to each candidate table
pub trait TablePredicate {
    fn matches(&self, table: ElementRef<'_>) -> bool;
}

impl<F> TablePredicate for F
where
    F: Fn(ElementRef<'_>) -> bool,
{
    fn matches(&self, table: ElementRef<'_>) -> bool {
        self(table)
    }
}

/// Matches when the serialized table contains every marker substring
#[derive(Debug, Clone)]
pub struct MarkerPredicate {
    markers: Vec<String>,
}

impl MarkerPredicate {
    pub fn new(markers: &[String]) -> Self {
        MarkerPredicate {
            markers: markers.to_vec(),
        }
    }
}

impl TablePredicate for MarkerPredicate {
    fn matches(&self, table: ElementRef<'_>) -> bool {
        let markup = table.html();
        self.markers.iter().all(|m| markup.contains(m.as_str()))
    }
}

/// How the extracted table was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSelection {
    /// The `index`-th candidate satisfied the predicate
    Matched { index: usize },
    /// No candidate matched; the first one was used
    Fallback,
}

/// Pick the table to extract from. Candidates are `<table>` elements carrying
/// `class` among their classes, in document order.
pub fn locate_table<'a>(
    document: &'a Html,
    class: &str,
    predicate: &dyn TablePredicate,
) -> Result<(ElementRef<'a>, TableSelection), ExtractError> {
    let table_selector = parse_selector("table")?;

    let candidates: Vec<ElementRef<'a>> = document
        .select(&table_selector)
        .filter(|t| t.value().classes().any(|c| c == class))
        .collect();

    if let Some(index) = candidates.iter().position(|t| predicate.matches(*t)) {
        log::debug!("Table {} of {} matched", index, candidates.len());
        return Ok((candidates[index], TableSelection::Matched { index }));
    }

    match candidates.first() {
        Some(first) => {
            log::warn!(
                "No '{}' table matched the content markers, falling back to the first of {}",
                class,
                candidates.len()
            );
            Ok((*first, TableSelection::Fallback))
        }
        None => Err(NoTableFoundError {
            class: class.to_string(),
        }
        .into()),
    }
}

// ============================================================================
// ROW PARSING
// ============================================================================

const NAME_CELL: usize = 1;
const MARKET_CAP_CELL: usize = 2;

/// Why a data row produced no record
#[derive(Debug, Clone, PartialEq)]
pub enum RowParseError {
    MissingCell { index: usize, found: usize },
    InvalidNumber { text: String },
}

impl fmt::Display for RowParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowParseError::MissingCell { index, found } => {
                write!(f, "cell {} missing (row has {} cells)", index, found)
            }
            RowParseError::InvalidNumber { text } => {
                write!(f, "market cap '{}' is not a number", text)
            }
        }
    }
}

/// Result of parsing one `<tr>`
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Parsed(BankRecord),
    /// No `<td>` cells: header or separator row
    Header,
    Skipped(RowParseError),
}

/// A dropped row and its position among the table's `<tr>` rows
#[derive(Debug, Clone, PartialEq)]
pub struct RowSkip {
    pub row: usize,
    pub reason: RowParseError,
}

/// Strip one trailing `\n`, then surrounding whitespace
pub fn clean_market_cap(raw: &str) -> &str {
    raw.strip_suffix('\n').unwrap_or(raw).trim()
}

/// Parse the text content of a row's `<td>` cells
pub fn parse_fields<S: AsRef<str>>(cells: &[S]) -> RowOutcome {
    if cells.is_empty() {
        return RowOutcome::Header;
    }

    match parse_record(cells) {
        Ok(record) => RowOutcome::Parsed(record),
        Err(reason) => RowOutcome::Skipped(reason),
    }
}

fn parse_record<S: AsRef<str>>(cells: &[S]) -> Result<BankRecord, RowParseError> {
    let name = cell(cells, NAME_CELL)?.trim();
    let market_cap = clean_market_cap(cell(cells, MARKET_CAP_CELL)?);

    let usd: f64 = market_cap
        .parse()
        .map_err(|_| RowParseError::InvalidNumber {
            text: market_cap.to_string(),
        })?;

    Ok(BankRecord::new(name, usd))
}

fn cell<S: AsRef<str>>(cells: &[S], index: usize) -> Result<&str, RowParseError> {
    cells
        .get(index)
        .map(|c| c.as_ref())
        .ok_or(RowParseError::MissingCell {
            index,
            found: cells.len(),
        })
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect()
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Everything the extractor learned from one document
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Parsed rows in document order, duplicates kept
    pub records: Vec<BankRecord>,
    pub skipped: Vec<RowSkip>,
    pub selection: TableSelection,
    pub columns: Columns,
}

/// Locate the market-cap table in `document` and parse its rows.
/// `expected_columns` names the bank-name and USD columns, in that order.
pub fn extract(
    document: &str,
    expected_columns: &[String],
    locator: &LocatorConfig,
) -> Result<Extraction, ExtractError> {
    let columns = match expected_columns {
        [name, usd] => Columns {
            name: name.clone(),
            usd: usd.clone(),
        },
        other => return Err(ExtractError::ColumnCount(other.len())),
    };

    let html = Html::parse_document(document);
    let predicate = MarkerPredicate::new(&locator.markers);
    let (table, selection) = locate_table(&html, &locator.table_class, &predicate)?;

    let row_selector = parse_selector("tr")?;
    let cell_selector = parse_selector("td")?;

    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for (row, tr) in table.select(&row_selector).enumerate() {
        let cells: Vec<String> = tr.select(&cell_selector).map(cell_text).collect();

        match parse_fields(&cells) {
            RowOutcome::Parsed(record) => records.push(record),
            RowOutcome::Header => {}
            RowOutcome::Skipped(reason) => {
                log::debug!("Skipping row {}: {}", row, reason);
                skipped.push(RowSkip { row, reason });
            }
        }
    }

    log::info!(
        "Extracted {} banks ({} rows skipped, {:?})",
        records.len(),
        skipped.len(),
        selection
    );

    Ok(Extraction {
        records,
        skipped,
        selection,
        columns,
    })
}

fn parse_selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::InvalidSelector {
        selector: css.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_columns() -> Vec<String> {
        vec!["Name".to_string(), "MC_USD_Billion".to_string()]
    }

    fn run(document: &str) -> Result<Extraction, ExtractError> {
        extract(document, &default_columns(), &LocatorConfig::default())
    }

    const MARKET_CAP_PAGE: &str = r#"
        <html><body>
        <table class="wikitable sortable">
          <tbody>
            <tr><th>Rank</th><th>Bank name</th><th>Total assets (US$ billion)</th></tr>
            <tr><td>1</td><td>ICBC</td><td>5,742.86</td></tr>
          </tbody>
        </table>
        <h2>By market capitalization</h2>
        <table class="wikitable sortable mw-collapsible">
          <tbody>
            <tr><th>Rank</th><th>Bank name</th><th>Market cap<br>(US$ billion)</th></tr>
            <tr><td>1</td><td><a href="/wiki/JPMorgan_Chase">JPMorgan Chase</a></td><td>432.92
</td></tr>
            <tr><td>2</td><td> Bank of America </td><td>231.52
</td></tr>
            <tr><td>3</td><td>Industrial and Commercial Bank of China</td><td>194.56
</td></tr>
            <tr><td colspan="3">Source: companiesmarketcap</td></tr>
            <tr><td>4</td><td>Agricultural Bank of China</td><td>n/a</td></tr>
            <tr><td>5</td><td>HDFC Bank</td><td>160.68
</td></tr>
            <tr><td>6</td><td>HDFC Bank</td><td>160.68
</td></tr>
          </tbody>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_single_matching_table() {
        let page = r#"
            <table class="wikitable">
              <tr><th>Rank</th><th>Bank name</th><th>Market cap (US$ billion)</th></tr>
              <tr><td>1</td><td>Test Bank</td><td>100.50
</td></tr>
            </table>
        "#;

        let extraction = run(page).unwrap();

        assert_eq!(extraction.records, vec![BankRecord::new("Test Bank", 100.50)]);
        assert!(extraction.skipped.is_empty());
        assert_eq!(extraction.selection, TableSelection::Matched { index: 0 });
    }

    #[test]
    fn test_selects_market_cap_table_over_first_table() {
        let extraction = run(MARKET_CAP_PAGE).unwrap();

        assert_eq!(extraction.selection, TableSelection::Matched { index: 1 });
        assert_eq!(extraction.records[0], BankRecord::new("JPMorgan Chase", 432.92));
        assert_eq!(extraction.records[1], BankRecord::new("Bank of America", 231.52));
        assert_eq!(extraction.records.len(), 5);

        println!("✅ Locator picked the market-cap table");
    }

    #[test]
    fn test_bad_rows_are_skipped_and_counted() {
        let extraction = run(MARKET_CAP_PAGE).unwrap();

        assert_eq!(extraction.skipped.len(), 2);
        assert_eq!(
            extraction.skipped[0],
            RowSkip {
                row: 4,
                reason: RowParseError::MissingCell { index: 1, found: 1 },
            }
        );
        assert_eq!(
            extraction.skipped[1].reason,
            RowParseError::InvalidNumber {
                text: "n/a".to_string()
            }
        );
    }

    #[test]
    fn test_duplicates_kept_in_document_order() {
        let extraction = run(MARKET_CAP_PAGE).unwrap();
        let names: Vec<&str> = extraction.records.iter().map(|r| r.name.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "JPMorgan Chase",
                "Bank of America",
                "Industrial and Commercial Bank of China",
                "HDFC Bank",
                "HDFC Bank",
            ]
        );
    }

    #[test]
    fn test_fallback_to_first_table() {
        let page = r#"
            <table class="other"><tr><td>0</td><td>Ignored</td><td>1.0</td></tr></table>
            <table class="wikitable">
              <tr><th>Rank</th><th>Bank</th><th>Assets</th></tr>
              <tr><td>1</td><td>First Bank</td><td>12.5</td></tr>
            </table>
            <table class="wikitable">
              <tr><td>1</td><td>Second Bank</td><td>99.0</td></tr>
            </table>
        "#;

        let extraction = run(page).unwrap();

        assert_eq!(extraction.selection, TableSelection::Fallback);
        assert_eq!(extraction.records, vec![BankRecord::new("First Bank", 12.5)]);
    }

    #[test]
    fn test_partial_marker_is_not_a_match() {
        let page = r#"
            <table class="wikitable">
              <tr><th>Rank</th><th>Bank</th><th>Market cap (EUR billion)</th></tr>
              <tr><td>1</td><td>Euro Bank</td><td>10</td></tr>
            </table>
        "#;

        let extraction = run(page).unwrap();
        assert_eq!(extraction.selection, TableSelection::Fallback);
    }

    #[test]
    fn test_no_table_of_class_is_fatal() {
        let page = r#"<table class="infobox"><tr><td>1</td><td>Bank</td><td>1.0</td></tr></table>"#;

        match run(page) {
            Err(ExtractError::NoTable(err)) => assert_eq!(err.class, "wikitable"),
            other => panic!("expected NoTable, got {:?}", other.map(|e| e.records)),
        }
    }

    #[test]
    fn test_custom_predicate() {
        let html = Html::parse_document(MARKET_CAP_PAGE);
        let assets = |t: ElementRef<'_>| t.html().contains("Total assets");

        let (_, selection) = locate_table(&html, "wikitable", &assets).unwrap();
        assert_eq!(selection, TableSelection::Matched { index: 0 });
    }

    #[test]
    fn test_expected_columns_must_be_a_pair() {
        let result = extract(MARKET_CAP_PAGE, &["Name".to_string()], &LocatorConfig::default());
        assert!(matches!(result, Err(ExtractError::ColumnCount(1))));

        let renamed = vec!["Bank".to_string(), "USD".to_string()];
        let extraction = extract(MARKET_CAP_PAGE, &renamed, &LocatorConfig::default()).unwrap();
        assert_eq!(extraction.columns.name, "Bank");
        assert_eq!(extraction.columns.usd, "USD");
    }

    #[test]
    fn test_parse_fields_well_formed_row() {
        let outcome = parse_fields(&["1", "  Test Bank\n", "100.50\n", "extra"]);
        assert_eq!(outcome, RowOutcome::Parsed(BankRecord::new("Test Bank", 100.50)));
    }

    #[test]
    fn test_parse_fields_empty_name_accepted() {
        assert_eq!(
            parse_fields(&["1", "   ", "5.0"]),
            RowOutcome::Parsed(BankRecord::new("", 5.0))
        );
    }

    #[test]
    fn test_parse_fields_short_row() {
        assert_eq!(
            parse_fields(&["1", "Test Bank"]),
            RowOutcome::Skipped(RowParseError::MissingCell { index: 2, found: 2 })
        );
    }

    #[test]
    fn test_parse_fields_thousands_separator_rejected() {
        assert_eq!(
            parse_fields(&["1", "ICBC", "5,742.86"]),
            RowOutcome::Skipped(RowParseError::InvalidNumber {
                text: "5,742.86".to_string()
            })
        );
    }

    #[test]
    fn test_parse_fields_digit_grouping_underscore_rejected() {
        assert_eq!(
            parse_fields(&["1", "ICBC", "1_000.5"]),
            RowOutcome::Skipped(RowParseError::InvalidNumber {
                text: "1_000.5".to_string()
            })
        );
    }

    #[test]
    fn test_parse_fields_empty_is_header() {
        let empty: [&str; 0] = [];
        assert_eq!(parse_fields(&empty), RowOutcome::Header);
    }

    #[test]
    fn test_clean_market_cap() {
        assert_eq!(clean_market_cap("100.50\n"), "100.50");
        assert_eq!(clean_market_cap(" 100.50 \n\n"), "100.50");
        assert_eq!(clean_market_cap("\t42"), "42");
    }
}
