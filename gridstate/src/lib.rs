//! Reactive in-memory data-view engine.
//!
//! `gridstate` derives a paginated, filtered, searched, and sorted display
//! subset from an array of records and republishes that subset (plus summary
//! statistics) whenever the view parameters change. It is meant to back
//! interactive list/table UIs without prescribing any rendering technology.
//!
//! The central type is [`TableEngine`]: it owns the data array and the
//! mutable [`state::TableState`], exposes the mutation operations
//! (`sort`/`filter`/`search`/`slice`), runs the filter → search → sort →
//! slice pipeline on a deferred schedule, and publishes results through a
//! typed event channel. The [`directives`] module layers stateful protocols
//! (sort cycling, pagination windows, clause builders) on top of those
//! events.
//!
//! # Example
//!
//! ```no_run
//! use gridstate::TableEngine;
//! use gridstate::state::{SlicePatch, SortDirection, SortPatch};
//! use serde_json::json;
//!
//! # async fn demo() {
//! let engine = TableEngine::builder(vec![
//!     json!({"id": 1, "name": "foo"}),
//!     json!({"id": 2, "name": "blah"}),
//!     json!({"id": 3, "name": "bip"}),
//! ])
//! .build();
//!
//! engine.on_display_change(|rows| {
//!     for row in rows {
//!         println!("{} -> {}", row.index, row.value);
//!     }
//! });
//!
//! engine.slice(SlicePatch::new().page(1).size(2));
//! engine.sort(SortPatch::new().pointer("id").direction(SortDirection::Desc));
//! # }
//! ```

pub mod directives;
pub mod engine;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod pointer;
pub mod state;

pub use engine::{ExecOptions, Summary, TableEngine, TableEngineBuilder};
pub use error::{PointerError, StageError};
pub use events::{EventKind, ListenerId, TableEvent};
pub use pipeline::Row;
