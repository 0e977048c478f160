//! Dotted-path access into record values.
//!
//! Records are opaque [`serde_json::Value`]s; the engine only ever reads
//! them through pointers supplied by configuration (sort keys, search
//! scopes, filter paths). A [`Pointer`] is validated and split once at
//! parse time, then interpreted against any number of records.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::PointerError;

/// A validated, pre-split dotted path into a record.
///
/// # Example
///
/// ```
/// use gridstate::pointer::Pointer;
/// use serde_json::json;
///
/// let pointer = Pointer::parse("address.city").unwrap();
/// let record = json!({"address": {"city": "Ghent"}});
/// assert_eq!(pointer.resolve(&record), Some(&json!("Ghent")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pointer {
    raw: String,
    segments: Vec<String>,
}

impl Pointer {
    /// Parses and validates a dotted path.
    ///
    /// Fails on an empty path or an empty segment (`"foo..bar"`, `"foo."`).
    pub fn parse(path: &str) -> Result<Self, PointerError> {
        if path.is_empty() {
            return Err(PointerError::Empty);
        }
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(PointerError::EmptySegment(path.to_string()));
        }
        Ok(Self {
            raw: path.to_string(),
            segments,
        })
    }

    /// Returns the original path string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the split path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walks the path through a record.
    ///
    /// Returns `None` as soon as an intermediate value is missing or not
    /// traversable. A `null` leaf resolves to `Some(&Value::Null)` — absence
    /// and an explicit null are distinct.
    ///
    /// Numeric segments index into arrays, so `"tags.0"` reads the first
    /// element of a `tags` array.
    pub fn resolve<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        let mut current = record;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl FromStr for Pointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
