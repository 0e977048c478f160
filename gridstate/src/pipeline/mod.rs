//! Pipeline stage contracts and default implementations.
//!
//! A pipeline run composes four stages — filter → search → sort → slice —
//! each built from the view-state current at execution time. The stage
//! builders are external-collaborator seams: the engine ships working
//! defaults ([`DefaultFilter`], [`DefaultSearch`], [`DefaultSort`],
//! [`DefaultSlice`]) and accepts any replacement honoring the same
//! contracts (new vectors, input order preserved for filter/search,
//! stable ordering for sort ties, out-of-range slices empty instead of
//! failing).

mod filter;
mod search;
mod slice;
mod sort;

pub use filter::DefaultFilter;
pub use search::DefaultSearch;
pub use slice::DefaultSlice;
pub use sort::DefaultSort;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StageError;
use crate::state::{FilterSpec, SearchSpec, SliceSpec, SortSpec};

/// A record tagged with its position in the original data array.
///
/// The index survives every stage, so a displayed row can be re-identified
/// in the source data regardless of how it was filtered, sorted, or
/// paginated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Position of `value` in the original data array.
    pub index: usize,
    /// The record itself.
    pub value: Value,
}

/// A stage function built from a view-state field.
///
/// Stages take ownership of the row vector and return a new one; they must
/// never mutate the records they carry.
pub type Stage = Box<dyn Fn(Vec<Row>) -> Result<Vec<Row>, StageError> + Send + Sync>;

/// Builds the ordering stage from the current sort parameters.
///
/// Contract: stable ordering for ties, identity (order-preserving) when
/// the direction is `none` or the pointer is absent.
pub trait SortFactory: Send + Sync {
    fn build(&self, spec: &SortSpec) -> Stage;
}

/// Builds the filter stage from the current filter parameters.
///
/// Contract: returns a subsequence preserving relative order; a record
/// passes only if every path's clauses are all satisfied.
pub trait FilterFactory: Send + Sync {
    fn build(&self, spec: &FilterSpec) -> Stage;
}

/// Builds the search stage from the current search parameters.
///
/// Contract: returns a subsequence preserving relative order; identity
/// when the scope is empty or the value is blank.
pub trait SearchFactory: Send + Sync {
    fn build(&self, spec: &SearchSpec) -> Stage;
}

/// Builds the pagination stage from the current slice parameters.
///
/// Contract: returns rows `[(page-1)*size, (page-1)*size + size)`; an
/// absent size means the whole input; out-of-range offsets yield an empty
/// result, never an error.
pub trait SliceFactory: Send + Sync {
    fn build(&self, spec: &SliceSpec) -> Stage;
}

/// An order-preserving stage that passes every row through unchanged.
pub(crate) fn identity_stage() -> Stage {
    Box::new(|rows| Ok(rows))
}

/// A stage that fails with the given error on every invocation, used when
/// a spec turns out to be unusable at build time (e.g. a malformed path).
pub(crate) fn failing_stage(message: String) -> Stage {
    Box::new(move |_| Err(StageError::new(message.clone())))
}
