//! View-state: the four-field structure describing the current sort,
//! filter, search, and slice parameters.
//!
//! Every field comes as a spec/patch pair: the spec is the live value held
//! by the engine, the patch is a partial update merged into it. Merging is
//! shallow at the field level — a patch only touches the keys it carries,
//! so `sort(SortPatch::new().direction(..))` keeps the current pointer.
//! This replaces the dynamic dotted-path "merge at leaf" of a generic
//! state store with explicit, typed merge functions per field.

mod filter;
mod search;
mod slice;
mod sort;

pub use filter::{ClauseType, FilterClause, FilterOperator, FilterPatch, FilterSpec};
pub use search::{SearchPatch, SearchSpec};
pub use slice::{SlicePatch, SliceSpec};
pub use sort::{SortDirection, SortPatch, SortSpec};

use serde::{Deserialize, Serialize};

/// The complete view-state of a table engine.
///
/// Plain serializable data: a snapshot obtained from
/// [`TableEngine::table_state`](crate::TableEngine::table_state) can be
/// stored, sent over a wire, and fed back into
/// [`TableEngine::eval`](crate::TableEngine::eval).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableState {
    pub sort: SortSpec,
    pub filter: FilterSpec,
    pub search: SearchSpec,
    pub slice: SliceSpec,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_serializes_compactly() {
        let state = TableState::default();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "sort": {},
                "filter": {},
                "search": {},
                "slice": {"page": 1}
            })
        );
    }

    #[test]
    fn test_state_round_trips() {
        let mut state = TableState::default();
        state.sort.merge(SortPatch::new().pointer("id").direction(SortDirection::Desc));
        state.slice.merge(SlicePatch::new().page(2).size(25));

        let json = serde_json::to_string(&state).unwrap();
        let back: TableState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
