//! Sort parameters.

use serde::{Deserialize, Serialize};

/// Sort direction for the ordering stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
    /// No ordering change: the stage must preserve input order.
    None,
}

/// The current sort parameters.
///
/// An absent pointer or a [`SortDirection::None`] direction means the sort
/// stage is an identity pass (a stable copy, not "unspecified order").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortSpec {
    /// Dotted path of the record field to order by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    /// Requested direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
}

impl SortSpec {
    /// Merges a partial update into this spec.
    ///
    /// Only the fields present on the patch are touched.
    pub fn merge(&mut self, patch: SortPatch) {
        if let Some(pointer) = patch.pointer {
            self.pointer = Some(pointer);
        }
        if let Some(direction) = patch.direction {
            self.direction = Some(direction);
        }
    }
}

/// Partial update for [`SortSpec`].
///
/// # Example
///
/// ```
/// use gridstate::state::{SortDirection, SortPatch, SortSpec};
///
/// let mut spec = SortSpec::default();
/// spec.merge(SortPatch::new().pointer("name"));
/// spec.merge(SortPatch::new().direction(SortDirection::Desc));
/// assert_eq!(spec.pointer.as_deref(), Some("name"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
}

impl SortPatch {
    /// Creates an empty patch (a state-wise no-op when merged).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field pointer.
    pub fn pointer(mut self, pointer: impl Into<String>) -> Self {
        self.pointer = Some(pointer.into());
        self
    }

    /// Sets the direction.
    pub fn direction(mut self, direction: SortDirection) -> Self {
        self.direction = Some(direction);
        self
    }
}
