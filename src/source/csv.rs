//! CSV implementation of the record store.
//!
//! The first row is a header; requested columns are resolved against it at
//! open time so that later `get` calls are a straight index. Files ending in
//! `.gz` are decompressed transparently when the `compression-gzip` feature
//! is enabled.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::source::RecordSource;

/// Record cursor over a CSV file with a header row.
pub struct CsvSource {
    reader: Option<::csv::Reader<Box<dyn Read + Send>>>,
    record: ::csv::StringRecord,
    has_record: bool,
    // requested column name -> position in the file's header
    columns: HashMap<String, usize>,
}

impl CsvSource {
    /// Open `path` and resolve `columns` against its header.
    ///
    /// # Errors
    /// Returns [`Error::Io`] when the file cannot be opened,
    /// [`Error::Source`] when the header cannot be read, and
    /// [`Error::UnknownField`] when a requested column is absent.
    pub fn open(path: impl AsRef<Path>, columns: &[&str]) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(wrap_decompressor(file, path));

        let headers = reader
            .headers()
            .map_err(|e| Error::Source(format!("reading header of {}: {e}", path.display())))?;
        let header_pos: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name, i))
            .collect();

        let mut resolved = HashMap::with_capacity(columns.len());
        for &name in columns {
            let pos = *header_pos
                .get(name)
                .ok_or_else(|| Error::UnknownField(name.to_owned()))?;
            resolved.insert(name.to_owned(), pos);
        }

        Ok(Self {
            reader: Some(reader),
            record: ::csv::StringRecord::new(),
            has_record: false,
            columns: resolved,
        })
    }
}

impl RecordSource for CsvSource {
    fn next(&mut self) -> Result<bool> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(false);
        };
        self.has_record = reader
            .read_record(&mut self.record)
            .map_err(|e| Error::Source(format!("reading CSV record: {e}")))?;
        Ok(self.has_record)
    }

    fn get(&self, field: &str) -> Result<&str> {
        let &pos = self
            .columns
            .get(field)
            .ok_or_else(|| Error::UnknownField(field.to_owned()))?;
        if !self.has_record {
            return Err(Error::Source("no current record".into()));
        }
        self.record
            .get(pos)
            .ok_or_else(|| Error::Source(format!("record has no column {pos} for `{field}`")))
    }

    fn close(&mut self) -> Result<()> {
        self.reader = None;
        self.has_record = false;
        Ok(())
    }
}

/// Wrap the file in a decompressor when the extension calls for one.
#[cfg(feature = "compression-gzip")]
fn wrap_decompressor(file: File, path: &Path) -> Box<dyn Read + Send> {
    if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(flate2::read::GzDecoder::new(file))
    } else {
        Box::new(file)
    }
}

#[cfg(not(feature = "compression-gzip"))]
fn wrap_decompressor(file: File, _path: &Path) -> Box<dyn Read + Send> {
    Box::new(file)
}
