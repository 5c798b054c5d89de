//! Record store access.
//!
//! The extraction tools read events through one cursor-shaped interface:
//! open with a fixed column set, advance one record at a time, read fields
//! as text. Two implementations exist — a CSV file with a header row
//! ([`CsvSource`]) and a PostgreSQL cursor ([`postgres::PgSource`], feature
//! `postgres`). Batch sizes are a latency knob only; the semantics are
//! strictly one record at a time.

pub mod csv;
#[cfg(feature = "postgres")]
pub mod postgres;

use std::path::PathBuf;

use crate::error::{Error, Result};

pub use csv::CsvSource;

/// Cursor over input records with text-valued fields.
pub trait RecordSource {
    /// Advance to the next record; `false` when exhausted.
    ///
    /// # Errors
    /// Returns [`Error::Source`] on transport problems.
    fn next(&mut self) -> Result<bool>;

    /// Raw text of a field in the current record.
    ///
    /// # Errors
    /// Returns [`Error::UnknownField`] for a field the source was not
    /// opened with, [`Error::Source`] when no current record exists.
    fn get(&self, field: &str) -> Result<&str>;

    /// Release underlying resources. Idempotent; `next` returns `false`
    /// afterwards.
    ///
    /// # Errors
    /// Returns [`Error::Source`] when teardown fails.
    fn close(&mut self) -> Result<()>;
}

/// Where a binary should read its records from.
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// CSV file to read instead of a database table.
    pub input_csv: Option<PathBuf>,
    /// Database name for the PostgreSQL store.
    pub dbname: Option<String>,
    /// Table to open the cursor over.
    pub table_name: Option<String>,
    /// Rows per cursor fetch.
    pub cursor_fetch_size: u32,
}

/// Open the record store selected by `opts` with the given column set.
///
/// `input_csv` wins when set; otherwise `dbname` and `table_name` select a
/// PostgreSQL cursor.
///
/// # Errors
/// Returns [`Error::Config`] when neither store is fully specified (or the
/// PostgreSQL store is requested from a build without the `postgres`
/// feature), and propagates open failures.
pub fn open(opts: &SourceOptions, columns: &[&str]) -> Result<Box<dyn RecordSource + Send>> {
    if let Some(path) = &opts.input_csv {
        return Ok(Box::new(CsvSource::open(path, columns)?));
    }

    match (&opts.dbname, &opts.table_name) {
        (Some(dbname), Some(table)) => open_pg(dbname, table, columns, opts.cursor_fetch_size),
        _ => Err(Error::Config(
            "either input_csv or both dbname and table_name must be given".into(),
        )),
    }
}

#[cfg(feature = "postgres")]
fn open_pg(
    dbname: &str,
    table: &str,
    columns: &[&str],
    fetch_size: u32,
) -> Result<Box<dyn RecordSource + Send>> {
    let mut source = postgres::PgSource::connect(&format!("dbname={dbname}"))?;
    source.open_cursor(table, columns, fetch_size)?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "postgres"))]
fn open_pg(
    _dbname: &str,
    _table: &str,
    _columns: &[&str],
    _fetch_size: u32,
) -> Result<Box<dyn RecordSource + Send>> {
    Err(Error::Config(
        "this build has no PostgreSQL support; rebuild with --features postgres \
         or pass input_csv"
            .into(),
    ))
}
