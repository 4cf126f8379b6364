use anyhow::{anyhow, Context, Result};
use std::io;
use std::path::Path;

use banks_etl::{run, EtlConfig, HttpFetcher, DEFAULT_CONFIG_FILE};

fn main() -> Result<()> {
    env_logger::init();

    let config = EtlConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE))
        .context("Failed to load configuration")?;
    log::info!("banks-etl {} starting", banks_etl::VERSION);

    let fetcher = HttpFetcher::new().map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = run(&config, &fetcher, &mut out).context("ETL run failed")?;

    log::info!(
        "Done: {} banks loaded into {} ({} rows skipped)",
        summary.records,
        config.table_name,
        summary.skipped
    );

    Ok(())
}
