//! Bracketed-array wire form used by the event store.
//!
//! Array-valued columns arrive as `{v1,v2,...,vn}` (or `{}` when empty),
//! optionally wrapped in one pair of quote characters by the CSV layer.
//! Scalars are plain numeric text. [`encode_array`] emits the same form, so
//! `decode_array(encode_array(v)) == v` for every integer sequence.

use std::fmt::Display;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Parse a plain numeric scalar.
///
/// # Errors
/// Returns [`Error::NumberFormat`] when the text is not a valid `T`.
pub fn decode_scalar<T: FromStr>(s: &str) -> Result<T> {
    s.parse().map_err(|_| Error::NumberFormat(s.to_owned()))
}

/// Parse bracketed array text into a vector.
///
/// Accepts both quoted (`"{1,2}"`) and unquoted (`{1,2}`) forms; `{}` decodes
/// to an empty vector.
///
/// # Errors
/// Returns [`Error::MalformedArray`] when the bracket structure is absent and
/// [`Error::NumberFormat`] when an element fails numeric conversion.
pub fn decode_array<T: FromStr>(s: &str) -> Result<Vec<T>> {
    let body = strip_quotes(s);
    let inner = body
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or_else(|| Error::MalformedArray(s.to_owned()))?;

    if inner.is_empty() {
        return Ok(Vec::new());
    }
    inner.split(',').map(decode_scalar).collect()
}

/// Encode a sequence in the bracketed wire form.
pub fn encode_array<T: Display>(values: &[T]) -> String {
    let mut out = String::from("{");
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&v.to_string());
    }
    out.push('}');
    out
}

/// Strip one surrounding pair of quote characters, if present.
fn strip_quotes(s: &str) -> &str {
    for q in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}
