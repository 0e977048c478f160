//! Filter parameters: per-path clause lists.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operator of a filter clause.
///
/// Serialized names match the wire-stable operator identifiers
/// (`includes`, `isNot`, `anyOf`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    /// Substring containment (string clauses); equality otherwise.
    Includes,
    /// Strict equality.
    Is,
    /// Strict inequality.
    IsNot,
    /// Equality after type coercion.
    Equals,
    /// Inequality after type coercion.
    NotEquals,
    /// Less than.
    Lt,
    /// Greater than.
    Gt,
    /// Less than or equal.
    Lte,
    /// Greater than or equal.
    Gte,
    /// Membership in an array clause value.
    AnyOf,
}

/// Type a clause coerces both sides to before comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClauseType {
    String,
    Number,
    Boolean,
    Date,
}

/// A single filter clause: value, operator, and coercion type.
///
/// # Example
///
/// ```
/// use gridstate::state::{ClauseType, FilterClause, FilterOperator};
///
/// let clause = FilterClause::new("lau")
///     .operator(FilterOperator::Includes)
///     .clause_type(ClauseType::String);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    pub value: Value,
    pub operator: FilterOperator,
    #[serde(rename = "type")]
    pub clause_type: ClauseType,
}

impl FilterClause {
    /// Creates a clause with the default operator (`includes`) and type
    /// (`string`).
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            operator: FilterOperator::Includes,
            clause_type: ClauseType::String,
        }
    }

    /// Sets the operator.
    pub fn operator(mut self, operator: FilterOperator) -> Self {
        self.operator = operator;
        self
    }

    /// Sets the coercion type.
    pub fn clause_type(mut self, clause_type: ClauseType) -> Self {
        self.clause_type = clause_type;
        self
    }

    /// A clause only participates in evaluation when it carries a value.
    ///
    /// Empty-string and null values mean "nothing typed in the filter box
    /// yet": such clauses are removed during normalization rather than
    /// treated as always-true.
    pub fn is_effective(&self) -> bool {
        !matches!(&self.value, Value::Null)
            && !matches!(&self.value, Value::String(s) if s.is_empty())
    }
}

/// The current filter parameters: dotted record path → clause list.
///
/// A record passes the filter stage only if every path's clauses are all
/// satisfied (AND of ANDs). Invariant kept by [`merge`](Self::merge): only
/// effective clauses are stored, and a path with zero effective clauses is
/// absent from the map (and therefore from the serialized state).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec {
    clauses: BTreeMap<String, Vec<FilterClause>>,
}

impl FilterSpec {
    /// Returns the clause lists by path.
    pub fn clauses(&self) -> &BTreeMap<String, Vec<FilterClause>> {
        &self.clauses
    }

    /// Returns the clauses configured for a path, if any.
    pub fn get(&self, path: &str) -> Option<&[FilterClause]> {
        self.clauses.get(path).map(Vec::as_slice)
    }

    /// Returns `true` when no path has any effective clause.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Merges a partial update into this spec.
    ///
    /// Paths present on the patch replace their clause list; other paths
    /// are preserved. Non-effective clauses are dropped, and a path left
    /// without clauses is removed entirely — submitting an empty clause
    /// list for a path is how a filter is cleared.
    pub fn merge(&mut self, patch: FilterPatch) {
        for (path, clauses) in patch.paths {
            let effective: Vec<FilterClause> =
                clauses.into_iter().filter(FilterClause::is_effective).collect();
            if effective.is_empty() {
                self.clauses.remove(&path);
            } else {
                self.clauses.insert(path, effective);
            }
        }
    }
}

/// Partial update for [`FilterSpec`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterPatch {
    paths: BTreeMap<String, Vec<FilterClause>>,
}

impl FilterPatch {
    /// Creates an empty patch (a state-wise no-op when merged).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the clause list for a path.
    pub fn set(mut self, path: impl Into<String>, clauses: Vec<FilterClause>) -> Self {
        self.paths.insert(path.into(), clauses);
        self
    }

    /// Clears all clauses for a path.
    pub fn clear(self, path: impl Into<String>) -> Self {
        self.set(path, Vec::new())
    }
}
