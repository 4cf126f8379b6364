// 💾 Sink Writer - CSV file + SQLite table
// Both sinks receive the same ordered ResultSet. The table is dropped and
// recreated on every write; the CSV is overwritten.

use crate::error::SinkError;
use crate::records::{BankRecord, Columns, ConvertedRecord};
use csv::{ReaderBuilder, Writer};
use prettytable::{Cell, Row, Table};
use rusqlite::types::Value;
use rusqlite::{params, Connection};
use std::fmt;
use std::path::Path;

// ============================================================================
// CSV
// ============================================================================

/// Shortest round-trip text, matching the flat files produced by pandas:
/// integral values keep a trailing `.0`, magnitudes below 1e-4 or from 1e16 up
/// use `1e-05` / `1e+16` exponent form, and NaN is left empty.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else if !value.is_finite() {
        value.to_string()
    } else if value != 0.0 && (value.abs() < 1e-4 || value.abs() >= 1e16) {
        format_exponent(value)
    } else if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// `1.5e16` → `1.5e+16`, `1e-5` → `1e-05`
fn format_exponent(value: f64) -> String {
    let text = format!("{:e}", value);
    match text.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(exp) => format!(
                "{}e{}{:02}",
                mantissa,
                if exp < 0 { '-' } else { '+' },
                exp.abs()
            ),
            Err(_) => text,
        },
        None => text,
    }
}

fn parse_float(row: usize, field: &str, value: &str) -> Result<f64, SinkError> {
    if value.is_empty() {
        return Ok(f64::NAN);
    }

    value.parse().map_err(|_| SinkError::CsvNumber {
        row,
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Write `records` to `path` with a leading 0-based index column
pub fn write_csv(
    records: &[ConvertedRecord],
    columns: &Columns,
    path: &Path,
) -> Result<(), SinkError> {
    let csv_err = |source| SinkError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = Writer::from_path(path).map_err(csv_err)?;

    let mut header = vec![""];
    header.extend(columns.all());
    writer.write_record(&header).map_err(csv_err)?;

    for (index, record) in records.iter().enumerate() {
        writer
            .write_record([
                index.to_string(),
                record.name().to_string(),
                format_float(record.market_cap_usd()),
                format_float(record.market_cap_gbp),
                format_float(record.market_cap_eur),
                format_float(record.market_cap_inr),
            ])
            .map_err(csv_err)?;
    }

    writer
        .flush()
        .map_err(|e| csv_err(csv::Error::from(e)))?;

    log::info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

/// Read a file written by `write_csv`, dropping the index column
pub fn read_csv(path: &Path) -> Result<Vec<ConvertedRecord>, SinkError> {
    const FIELDS: usize = 6;

    let csv_err = |source| SinkError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers = reader.headers().map_err(csv_err)?.clone();
    let mut records = Vec::new();

    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(csv_err)?;

        if record.len() != FIELDS {
            return Err(SinkError::CsvShape {
                row,
                found: record.len(),
                expected: FIELDS,
            });
        }

        let number = |i: usize| parse_float(row, headers.get(i).unwrap_or(""), &record[i]);

        records.push(ConvertedRecord {
            bank: BankRecord::new(&record[1], number(2)?),
            market_cap_gbp: number(3)?,
            market_cap_eur: number(4)?,
            market_cap_inr: number(5)?,
        });
    }

    Ok(records)
}

// ============================================================================
// SQLITE
// ============================================================================

/// Double-quote an SQL identifier
fn quote_identifier(name: &str) -> Result<String, SinkError> {
    if name.trim().is_empty() || name.contains('\0') {
        return Err(SinkError::TableName(name.to_string()));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

pub fn open_database(path: &Path) -> Result<Connection, SinkError> {
    let conn = Connection::open(path)?;
    log::debug!("Opened SQLite database {}", path.display());
    Ok(conn)
}

/// Close explicitly so close errors surface instead of being dropped
pub fn close_database(conn: Connection) -> Result<(), SinkError> {
    conn.close().map_err(|(_, err)| SinkError::Sqlite(err))
}

/// Replace `table_name` with one row per record. Runs in a single transaction:
/// readers see either the old table or the complete new one.
pub fn write_table(
    records: &[ConvertedRecord],
    columns: &Columns,
    conn: &Connection,
    table_name: &str,
) -> Result<usize, SinkError> {
    let table = quote_identifier(table_name)?;
    let cols = columns
        .all()
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Result<Vec<_>, _>>()?;

    let tx = conn.unchecked_transaction()?;

    tx.execute(&format!("DROP TABLE IF EXISTS {}", table), [])?;
    tx.execute(
        &format!(
            "CREATE TABLE {} (
                {} TEXT,
                {} REAL,
                {} REAL,
                {} REAL,
                {} REAL
            )",
            table, cols[0], cols[1], cols[2], cols[3], cols[4]
        ),
        [],
    )?;

    let mut inserted = 0;
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5)",
            table,
            cols.join(", ")
        ))?;

        for record in records {
            stmt.execute(params![
                record.name(),
                record.market_cap_usd(),
                record.market_cap_gbp,
                record.market_cap_eur,
                record.market_cap_inr,
            ])?;
            inserted += 1;
        }
    }

    tx.commit()?;

    log::info!("Loaded {} rows into table {}", inserted, table_name);
    Ok(inserted)
}

// ============================================================================
// QUERIES
// ============================================================================

/// Rows returned by `run_query`, in result order
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    /// First column of the first row (aggregates)
    pub fn scalar(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }

    /// Values of the named column, one per row
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => format_float(*r),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = Table::new();

        let mut titles = vec![Cell::new("")];
        titles.extend(self.columns.iter().map(|c| Cell::new(c)));
        table.set_titles(Row::new(titles));

        for (index, row) in self.rows.iter().enumerate() {
            let mut cells = vec![Cell::new(&index.to_string())];
            cells.extend(row.iter().map(|v| Cell::new(&render_value(v))));
            table.add_row(Row::new(cells));
        }

        write!(f, "{}", table)
    }
}

/// Execute a read-only statement and collect its rows
pub fn run_query(sql: &str, conn: &Connection) -> Result<QueryResult, SinkError> {
    let mut stmt = conn.prepare(sql)?;

    if !stmt.readonly() {
        return Err(SinkError::NotReadOnly(sql.to_string()));
    }

    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();
    let width = columns.len();

    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|i| row.get::<_, Value>(i))
                .collect::<Result<Vec<_>, _>>()
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QueryResult { columns, rows })
}
