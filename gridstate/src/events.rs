//! Typed event channel.
//!
//! The engine publishes every state change and pipeline result through an
//! [`Emitter`]: a named-event registry with multiple listeners per event,
//! synchronous in-registration-order dispatch, and bulk unsubscription.
//! Event names are stable string identifiers (see [`EventKind::as_str`]);
//! payloads are the typed [`TableEvent`] variants.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::engine::Summary;
use crate::error::StageError;
use crate::pipeline::Row;
use crate::state::{FilterSpec, SearchSpec, SliceSpec, SortSpec};

/// The eight events published on an engine's channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The sort parameters changed.
    SortChanged,
    /// A pipeline run produced a new display subset.
    DisplayChanged,
    /// The slice parameters changed (page navigation or reset).
    PageChanged,
    /// A pipeline execution started or finished.
    ExecChanged,
    /// The filter parameters changed.
    FilterChanged,
    /// A pipeline run produced new summary counts.
    SummaryChanged,
    /// The search parameters changed.
    SearchChanged,
    /// A pipeline stage failed during a deferred execution.
    ExecError,
}

impl EventKind {
    /// The wire-stable identifier of this event.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::SortChanged => "TOGGLE_SORT",
            EventKind::DisplayChanged => "DISPLAY_CHANGED",
            EventKind::PageChanged => "CHANGE_PAGE",
            EventKind::ExecChanged => "EXEC_CHANGED",
            EventKind::FilterChanged => "FILTER_CHANGED",
            EventKind::SummaryChanged => "SUMMARY_CHANGED",
            EventKind::SearchChanged => "SEARCH_CHANGED",
            EventKind::ExecError => "EXEC_ERROR",
        }
    }
}

/// A published event with its payload.
#[derive(Debug)]
pub enum TableEvent {
    /// Post-merge sort parameters.
    SortChanged(SortSpec),
    /// The index-tagged visible rows of the latest pipeline run.
    DisplayChanged(Vec<Row>),
    /// Post-merge slice parameters.
    PageChanged(SliceSpec),
    /// `working: true` when an execution is scheduled, `false` once its
    /// pipeline run finished (successfully or not).
    ExecChanged { working: bool },
    /// Post-merge filter parameters.
    FilterChanged(FilterSpec),
    /// Counts of the latest pipeline run.
    SummaryChanged(Summary),
    /// Post-merge search parameters.
    SearchChanged(SearchSpec),
    /// The error raised by a pipeline stage.
    ExecError(StageError),
}

impl TableEvent {
    /// Returns the event name this payload is dispatched under.
    pub fn kind(&self) -> EventKind {
        match self {
            TableEvent::SortChanged(_) => EventKind::SortChanged,
            TableEvent::DisplayChanged(_) => EventKind::DisplayChanged,
            TableEvent::PageChanged(_) => EventKind::PageChanged,
            TableEvent::ExecChanged { .. } => EventKind::ExecChanged,
            TableEvent::FilterChanged(_) => EventKind::FilterChanged,
            TableEvent::SummaryChanged(_) => EventKind::SummaryChanged,
            TableEvent::SearchChanged(_) => EventKind::SearchChanged,
            TableEvent::ExecError(_) => EventKind::ExecError,
        }
    }
}

/// Handle to a registered listener, used for unsubscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = std::sync::Arc<dyn Fn(&TableEvent) + Send + Sync>;

/// Named-event publish/subscribe registry.
///
/// Dispatch is synchronous: all listeners registered for the event's kind
/// run before `dispatch` returns, in registration order. The listener list
/// is snapshotted before invocation, so a listener may subscribe,
/// unsubscribe, or dispatch further events while running (nested dispatch
/// completes fully before control returns to the outer loop). There is no
/// panic isolation: a panicking listener unwinds through `dispatch` and
/// later listeners for that call do not run.
#[derive(Default)]
pub struct Emitter {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<EventKind, Vec<(ListenerId, Listener)>>>,
}

impl Emitter {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for an event kind.
    pub fn on(
        &self,
        kind: EventKind,
        listener: impl Fn(&TableEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners
                .entry(kind)
                .or_default()
                .push((id, std::sync::Arc::new(listener)));
        }
        id
    }

    /// Invokes all listeners currently registered for the event's kind.
    pub fn dispatch(&self, event: &TableEvent) {
        let snapshot: Vec<Listener> = match self.listeners.lock() {
            Ok(listeners) => listeners
                .get(&event.kind())
                .map(|list| list.iter().map(|(_, l)| l.clone()).collect())
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        };
        for listener in snapshot {
            listener(event);
        }
    }

    /// Removes a single listener by handle.
    pub fn off(&self, id: ListenerId) {
        if let Ok(mut listeners) = self.listeners.lock() {
            for list in listeners.values_mut() {
                list.retain(|(lid, _)| *lid != id);
            }
        }
    }

    /// Removes every listener registered for an event kind.
    pub fn off_event(&self, kind: EventKind) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.remove(&kind);
        }
    }

    /// Removes every listener for every event.
    pub fn clear(&self) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.clear();
        }
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<(EventKind, usize)> = self
            .listeners
            .lock()
            .map(|l| l.iter().map(|(k, v)| (*k, v.len())).collect())
            .unwrap_or_default();
        f.debug_struct("Emitter").field("listeners", &counts).finish()
    }
}
