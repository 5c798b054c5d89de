//! PostgreSQL implementation of the record store.
//!
//! Mirrors the classic libpq cursor loop: `BEGIN`, `DECLARE ... CURSOR`,
//! `FETCH <n>` until empty, `CLOSE`, `COMMIT`. Every selected column is cast
//! to `text` in the cursor's SELECT so the source stays text-valued
//! regardless of the table's schema.

use std::collections::{HashMap, VecDeque};

use postgres::{Client, NoTls, Row};

use crate::error::{Error, Result};
use crate::source::RecordSource;

const CURSOR_NAME: &str = "decaymatch_cursor";

/// Record cursor over a PostgreSQL table.
pub struct PgSource {
    client: Client,
    cursor_open: bool,
    exhausted: bool,
    fetch_size: u32,
    pending: VecDeque<Row>,
    // requested column name -> select-list position
    columns: HashMap<String, usize>,
    cache: Vec<String>,
    has_record: bool,
}

impl PgSource {
    /// Connect with a libpq-style conninfo string (e.g. `dbname=events`).
    ///
    /// # Errors
    /// Returns [`Error::Source`] when the connection fails.
    pub fn connect(conninfo: &str) -> Result<Self> {
        let client = Client::connect(conninfo, NoTls)
            .map_err(|e| Error::Source(format!("connecting ({conninfo}): {e}")))?;
        Ok(Self {
            client,
            cursor_open: false,
            exhausted: false,
            fetch_size: 0,
            pending: VecDeque::new(),
            columns: HashMap::new(),
            cache: Vec::new(),
            has_record: false,
        })
    }

    /// Declare the cursor over `table` with the given column set.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when a cursor is already open or
    /// `fetch_size` is zero, [`Error::Source`] on database failures.
    pub fn open_cursor(&mut self, table: &str, columns: &[&str], fetch_size: u32) -> Result<()> {
        if self.cursor_open {
            return Err(Error::Config("cursor already open".into()));
        }
        if fetch_size == 0 {
            return Err(Error::Config("cursor_fetch_size must be positive".into()));
        }

        let select_list = columns
            .iter()
            .map(|c| format!("{c}::text"))
            .collect::<Vec<_>>()
            .join(", ");
        let declare =
            format!("BEGIN; DECLARE {CURSOR_NAME} CURSOR FOR SELECT {select_list} FROM {table};");
        self.client
            .batch_execute(&declare)
            .map_err(|e| Error::Source(format!("declaring cursor over {table}: {e}")))?;

        self.columns = columns
            .iter()
            .enumerate()
            .map(|(i, &c)| (c.to_owned(), i))
            .collect();
        self.cache = vec![String::new(); columns.len()];
        self.fetch_size = fetch_size;
        self.cursor_open = true;
        self.exhausted = false;
        self.has_record = false;
        Ok(())
    }
}

impl RecordSource for PgSource {
    fn next(&mut self) -> Result<bool> {
        if !self.cursor_open {
            return Ok(false);
        }
        if self.pending.is_empty() && !self.exhausted {
            let fetch = format!("FETCH {} FROM {CURSOR_NAME}", self.fetch_size);
            let rows = self
                .client
                .query(fetch.as_str(), &[])
                .map_err(|e| Error::Source(format!("fetching from cursor: {e}")))?;
            if rows.is_empty() {
                self.exhausted = true;
            }
            self.pending.extend(rows);
        }

        let Some(row) = self.pending.pop_front() else {
            self.has_record = false;
            return Ok(false);
        };
        for (i, slot) in self.cache.iter_mut().enumerate() {
            *slot = row
                .try_get::<_, Option<String>>(i)
                .map_err(|e| Error::Source(format!("reading column {i}: {e}")))?
                .unwrap_or_default();
        }
        self.has_record = true;
        Ok(true)
    }

    fn get(&self, field: &str) -> Result<&str> {
        let &pos = self
            .columns
            .get(field)
            .ok_or_else(|| Error::UnknownField(field.to_owned()))?;
        if !self.has_record {
            return Err(Error::Source("no current record".into()));
        }
        Ok(&self.cache[pos])
    }

    fn close(&mut self) -> Result<()> {
        if !self.cursor_open {
            return Ok(());
        }
        self.cursor_open = false;
        self.pending.clear();
        self.has_record = false;
        self.client
            .batch_execute(&format!("CLOSE {CURSOR_NAME}; COMMIT;"))
            .map_err(|e| Error::Source(format!("closing cursor: {e}")))
    }
}
