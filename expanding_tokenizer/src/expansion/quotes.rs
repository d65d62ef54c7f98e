//! Named text transforms applied to resolved variable values
//!
//! `${NAME:sql,attr}` passes the value of `NAME` through `sql` and then `attr`.

use crate::error::{ExpandError, ExpandResult};
use crate::utils::Location;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type QuoteFn = Arc<dyn Fn(&str, &Location) -> ExpandResult<String> + Send + Sync>;

const MILLISECOND_UNITS: &[(&str, u64)] = &[
    ("", 1),
    ("ms", 1),
    ("s", 1_000),
    ("m", 60_000),
    ("h", 3_600_000),
    ("d", 86_400_000),
];

const SECOND_UNITS: &[(&str, u64)] = &[
    ("", 1),
    ("s", 1),
    ("m", 60),
    ("h", 3_600),
    ("d", 86_400),
];

/// Immutable name to quote function mapping
#[derive(Clone)]
pub struct QuoteRegistry {
    quotes: HashMap<String, QuoteFn>,
}

impl QuoteRegistry {
    pub fn empty() -> Self {
        Self {
            quotes: HashMap::new(),
        }
    }

    /// ms, s, xml, attr, uri and sql
    pub fn builtin() -> Self {
        Self::empty()
            .with_quote("ms", to_milliseconds)
            .with_quote("s", to_seconds)
            .with_quote("xml", |text, _| Ok(escape_xml(text)))
            .with_quote("attr", |text, _| Ok(escape_attr(text)))
            .with_quote("uri", |text, _| Ok(encode_uri(text)))
            .with_quote("sql", |text, _| Ok(escape_sql(text)))
    }

    /// Add or replace a quote
    pub fn with_quote<F>(mut self, name: impl Into<String>, quote: F) -> Self
    where
        F: Fn(&str, &Location) -> ExpandResult<String> + Send + Sync + 'static,
    {
        self.quotes.insert(name.into(), Arc::new(quote));
        self
    }

    pub fn get(&self, name: &str) -> Option<&QuoteFn> {
        self.quotes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.quotes.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.quotes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for QuoteRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for QuoteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

// ============================================================================
// BUILT-IN QUOTES
// ============================================================================

pub fn to_milliseconds(text: &str, location: &Location) -> ExpandResult<String> {
    scale_duration(text, location, MILLISECOND_UNITS)
}

pub fn to_seconds(text: &str, location: &Location) -> ExpandResult<String> {
    scale_duration(text, location, SECOND_UNITS)
}

/// `<positive integer><unit>` converted to the base unit of `units`
fn scale_duration(text: &str, location: &Location, units: &[(&str, u64)]) -> ExpandResult<String> {
    let not_a_duration = || ExpandError::NotADuration {
        text: text.to_string(),
        location: location.clone(),
    };

    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, unit) = text.split_at(split);
    if digits.is_empty() || digits.starts_with('0') {
        return Err(not_a_duration());
    }

    let scale = units
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, scale)| *scale)
        .ok_or_else(not_a_duration)?;
    let count: u64 = digits.parse().map_err(|_| not_a_duration())?;

    count
        .checked_mul(scale)
        .map(|value| value.to_string())
        .ok_or_else(not_a_duration)
}

pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn escape_attr(text: &str) -> String {
    escape_xml(text).replace('"', "&quot;")
}

/// Form-style percent encoding: unreserved bytes pass, space becomes `+`
pub fn encode_uri(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'.' | b'-' | b'~' => {
                encoded.push(byte as char)
            }
            b' ' => encoded.push('+'),
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

pub fn escape_sql(text: &str) -> String {
    text.replace('\'', "''")
}
