//! Slice (pagination) parameters.

use serde::{Deserialize, Serialize};

/// The current pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceSpec {
    /// 1-based page number.
    pub page: u64,
    /// Page size. Absent means no slicing: the whole array is displayed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl Default for SliceSpec {
    fn default() -> Self {
        Self {
            page: 1,
            size: None,
        }
    }
}

impl SliceSpec {
    /// Merges a partial update into this spec.
    pub fn merge(&mut self, patch: SlicePatch) {
        if let Some(page) = patch.page {
            self.page = page;
        }
        if let Some(size) = patch.size {
            self.size = Some(size);
        }
    }
}

/// Partial update for [`SliceSpec`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlicePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl SlicePatch {
    /// Creates an empty patch (a state-wise no-op when merged).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the 1-based page number.
    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets the page size.
    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}
