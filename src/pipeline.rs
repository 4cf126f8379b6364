// 🔄 ETL Pipeline
// Provision rates → extract → transform → load (CSV, SQLite) → report queries.
// Each stage fully materializes its output before the next one starts; the
// progress log is written after every stage.

use crate::config::EtlConfig;
use crate::error::{EtlError, PageFetchError};
use crate::extract::{extract, TableSelection};
use crate::fetch::Fetcher;
use crate::progress::ProgressLog;
use crate::rates::{ensure_rate_file, load_rates, Provisioned};
use crate::sink::{close_database, open_database, run_query, write_csv, write_table, QueryResult};
use crate::transform::transform;
use std::io::Write;

/// What one run did, for callers and tests
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub provisioned: Provisioned,
    pub selection: TableSelection,
    pub records: usize,
    pub skipped: usize,
    pub queries: Vec<(String, QueryResult)>,
}

fn milestone(progress: &ProgressLog, message: &str) -> Result<(), EtlError> {
    progress.log(message).map_err(|source| EtlError::ProgressLog {
        path: progress.path().to_path_buf(),
        source,
    })
}

/// Run the whole pipeline once. Query statements and their results are printed
/// to `out`.
pub fn run(
    config: &EtlConfig,
    fetcher: &dyn Fetcher,
    out: &mut dyn Write,
) -> Result<RunSummary, EtlError> {
    let progress = ProgressLog::new(&config.log_path);

    // Preliminaries
    let provisioned = ensure_rate_file(
        fetcher,
        &config.exchange_rate_path,
        &config.exchange_rate_url,
    )?;
    milestone(&progress, "Preliminaries complete. Initiating ETL process")?;

    // Extract
    let page = fetcher
        .fetch_text(&config.page_url)
        .map_err(|source| PageFetchError {
            url: config.page_url.clone(),
            source,
        })?;
    let extraction = extract(&page, &config.table_attribs, &config.locator)?;
    milestone(&progress, "Data extraction complete. Initiating Transformation process")?;

    // Transform
    let rates = load_rates(&config.exchange_rate_path)?;
    let records = transform(&extraction.records, &rates)?;
    milestone(&progress, "Data transformation complete. Initiating Loading process")?;

    // Load
    write_csv(&records, &extraction.columns, &config.output_csv_path)?;
    milestone(&progress, "Data saved to CSV file")?;

    let conn = open_database(&config.database_path)?;
    milestone(&progress, "SQL Connection initiated")?;

    write_table(&records, &extraction.columns, &conn, &config.table_name)?;
    milestone(&progress, "Data loaded to Database as a table, Executing queries")?;

    // Report
    let mut queries = Vec::new();
    for sql in config.report_queries(&extraction.columns) {
        writeln!(out, "{}", sql).map_err(EtlError::Output)?;
        let result = run_query(&sql, &conn)?;
        writeln!(out, "{}", result).map_err(EtlError::Output)?;
        queries.push((sql, result));
    }
    milestone(&progress, "Process Complete")?;

    close_database(conn)?;
    milestone(&progress, "Server Connection closed")?;

    Ok(RunSummary {
        provisioned,
        selection: extraction.selection,
        records: records.len(),
        skipped: extraction.skipped.len(),
        queries,
    })
}
