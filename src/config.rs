//! Configuration files and option resolution.
//!
//! Each binary accepts an optional `name = value` configuration file plus
//! command-line flags; flags win. The parser rejects option names outside
//! the binary's recognized set, so a typo in a config file fails loudly
//! instead of silently running with defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::source::SourceOptions;

/// Rows fetched per cursor round-trip unless configured otherwise.
pub const DEFAULT_CURSOR_FETCH_SIZE: u32 = 5000;

/// Option names shared by every extraction binary.
pub const SOURCE_KEYS: &[&str] = &["dbname", "table_name", "input_csv", "cursor_fetch_size"];

/// Resolved option map with file values overridden by flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigMap {
    values: HashMap<String, String>,
}

impl ConfigMap {
    /// Load a config file (when given) against a recognized-key set.
    ///
    /// The file format is one `name = value` pair per line; blank lines and
    /// `#` comments are ignored.
    ///
    /// # Errors
    /// Returns [`Error::Io`] when the file cannot be read and
    /// [`Error::Config`] for lines without `=` or with unrecognized names.
    pub fn load(path: Option<&Path>, allowed: &[&str]) -> Result<Self> {
        let mut values = HashMap::new();
        if let Some(path) = path {
            let text = std::fs::read_to_string(path)?;
            for (lineno, line) in text.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let Some((name, value)) = line.split_once('=') else {
                    return Err(Error::Config(format!(
                        "{}:{}: expected `name = value`",
                        path.display(),
                        lineno + 1
                    )));
                };
                let name = name.trim();
                if !allowed.contains(&name) {
                    return Err(Error::Config(format!(
                        "{}:{}: unrecognized option `{name}`",
                        path.display(),
                        lineno + 1
                    )));
                }
                values.insert(name.to_owned(), value.trim().to_owned());
            }
        }
        Ok(Self { values })
    }

    /// Override a value from a command-line flag, when the flag was given.
    pub fn set_override(&mut self, name: &str, value: Option<impl ToString>) -> &mut Self {
        if let Some(value) = value {
            self.values.insert(name.to_owned(), value.to_string());
        }
        self
    }

    /// Value of an option, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Value of a required option.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the option was never given.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name)
            .ok_or_else(|| Error::Config(format!("missing required option `{name}`")))
    }

    /// Parsed value of an option, falling back to `default`.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the value does not parse as `T`.
    pub fn get_parsed<T: std::str::FromStr>(&self, name: &str, default: T) -> Result<T> {
        match self.get(name) {
            None => Ok(default),
            Some(text) => text
                .parse()
                .map_err(|_| Error::Config(format!("option `{name}`: bad value `{text}`"))),
        }
    }

    /// Assemble the record-store selection options.
    ///
    /// # Errors
    /// Propagates [`ConfigMap::get_parsed`] failures.
    pub fn source_options(&self) -> Result<SourceOptions> {
        Ok(SourceOptions {
            input_csv: self.get("input_csv").map(PathBuf::from),
            dbname: self.get("dbname").map(str::to_owned),
            table_name: self.get("table_name").map(str::to_owned),
            cursor_fetch_size: self
                .get_parsed("cursor_fetch_size", DEFAULT_CURSOR_FETCH_SIZE)?,
        })
    }
}
