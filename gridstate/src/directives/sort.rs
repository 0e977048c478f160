//! Sort-cycle directive.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::engine::TableEngine;
use crate::events::{EventKind, ListenerId, TableEvent};
use crate::state::{SortDirection, SortPatch, SortSpec};

const DUAL: [SortDirection; 2] = [SortDirection::Desc, SortDirection::Asc];
const CYCLE: [SortDirection; 3] = [SortDirection::None, SortDirection::Asc, SortDirection::Desc];

/// Turns repeated toggle calls on one field into a bounded sequence of
/// sort directions, committed to the engine through a trailing-edge
/// debounce.
///
/// Two modes: the default dual mode alternates `asc`, `desc`, `asc`, ...;
/// [`cycle`](Self::cycle) mode runs `asc`, `desc`, `none`, `asc`, ...
/// The directive watches the engine's sort events — as soon as another
/// field is sorted, the local cycle restarts from the beginning.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use gridstate::TableEngine;
/// use gridstate::directives::SortDirective;
/// # fn demo(engine: &TableEngine) {
/// let header = SortDirective::new(engine, "address.city")
///     .cycle(true)
///     .debounce(Duration::from_millis(300));
/// header.toggle();
/// header.toggle(); // only the trailing call commits
/// # }
/// ```
pub struct SortDirective {
    table: TableEngine,
    pointer: String,
    cycle: bool,
    debounce: Duration,
    hits: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
    listeners: Mutex<Vec<ListenerId>>,
}

impl SortDirective {
    /// Creates a directive managing the given record field.
    ///
    /// If the engine's current sort state already names this field, the
    /// cycle continues from that state instead of restarting: the next
    /// toggle after an ascending (or unset) direction commits descending.
    pub fn new(table: &TableEngine, pointer: impl Into<String>) -> Self {
        let table = table.clone();
        let pointer = pointer.into();

        let current = table.table_state().sort;
        let seed = if current.pointer.as_deref() == Some(pointer.as_str()) {
            match current.direction {
                Some(SortDirection::Desc) => 2,
                _ => 1,
            }
        } else {
            0
        };
        let hits = Arc::new(AtomicU64::new(seed));

        // Another field taking over the sort resets the local cycle,
        // regardless of any pending debounced commit.
        let watched = pointer.clone();
        let counter = hits.clone();
        let reset = table.on(EventKind::SortChanged, move |event| {
            if let TableEvent::SortChanged(spec) = event
                && spec.pointer.as_deref() != Some(watched.as_str())
            {
                counter.store(0, Ordering::SeqCst);
            }
        });

        Self {
            table,
            pointer,
            cycle: false,
            debounce: Duration::ZERO,
            hits,
            pending: Mutex::new(None),
            listeners: Mutex::new(vec![reset]),
        }
    }

    /// Enables 3-state cycling (`asc`, `desc`, `none`) instead of the
    /// default dual mode.
    pub fn cycle(mut self, cycle: bool) -> Self {
        self.cycle = cycle;
        self
    }

    /// Sets the debounce window for commits. Zero (the default) commits
    /// immediately.
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Advances the cycle one step and commits the resulting direction to
    /// the engine.
    ///
    /// With a non-zero debounce the commit is scheduled after the window;
    /// a new toggle within the window cancels the pending commit and
    /// reschedules, so only the trailing direction reaches the engine.
    pub fn toggle(&self) {
        let hit = self.hits.fetch_add(1, Ordering::SeqCst) + 1;
        let direction = if self.cycle {
            CYCLE[(hit % CYCLE.len() as u64) as usize]
        } else {
            DUAL[(hit % DUAL.len() as u64) as usize]
        };
        let patch = SortPatch::new().pointer(self.pointer.clone()).direction(direction);

        if self.debounce.is_zero() {
            self.table.sort(patch);
            return;
        }

        if let Ok(mut pending) = self.pending.lock() {
            if let Some(handle) = pending.take() {
                handle.abort();
            }
            let table = self.table.clone();
            let delay = self.debounce;
            *pending = Some(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                table.sort(patch);
            }));
        }
    }

    /// Reads through to the engine's current sort state.
    pub fn state(&self) -> SortSpec {
        self.table.table_state().sort
    }

    /// Registers a listener for sort-changed events.
    pub fn on_sort_toggle(
        &self,
        listener: impl Fn(&SortSpec) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = self.table.on(EventKind::SortChanged, move |event| {
            if let TableEvent::SortChanged(spec) = event {
                listener(spec);
            }
        });
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(id);
        }
        id
    }

    /// Removes every listener this directive registered and cancels any
    /// pending debounced commit.
    pub fn detach(&self) {
        if let Ok(mut pending) = self.pending.lock()
            && let Some(handle) = pending.take()
        {
            handle.abort();
        }
        if let Ok(mut listeners) = self.listeners.lock() {
            for id in listeners.drain(..) {
                self.table.off(id);
            }
        }
    }
}

impl Drop for SortDirective {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{SlicePatch, TableState};
    use serde_json::json;

    fn engine() -> TableEngine {
        TableEngine::builder(vec![json!({"foo": {"bar": 1}}), json!({"foo": {"bar": 2}})])
            .build()
    }

    #[tokio::test]
    async fn test_dual_mode_alternates() {
        let engine = engine();
        let directive = SortDirective::new(&engine, "foo.bar");

        directive.toggle();
        assert_eq!(engine.table_state().sort.direction, Some(SortDirection::Asc));
        directive.toggle();
        assert_eq!(engine.table_state().sort.direction, Some(SortDirection::Desc));
        directive.toggle();
        assert_eq!(engine.table_state().sort.direction, Some(SortDirection::Asc));
    }

    #[tokio::test]
    async fn test_cycle_mode_includes_none() {
        let engine = engine();
        let directive = SortDirective::new(&engine, "foo.bar").cycle(true);

        let mut seen = Vec::new();
        for _ in 0..4 {
            directive.toggle();
            seen.push(engine.table_state().sort.direction.unwrap());
        }
        assert_eq!(
            seen,
            vec![
                SortDirection::Asc,
                SortDirection::Desc,
                SortDirection::None,
                SortDirection::Asc
            ]
        );
    }

    #[tokio::test]
    async fn test_seeded_from_existing_state() {
        let engine = TableEngine::builder(vec![json!({"foo": {"bar": 1}})])
            .state(serde_json::from_value::<TableState>(json!({
                "sort": {"pointer": "foo.bar", "direction": "desc"}
            })).unwrap())
            .build();
        let directive = SortDirective::new(&engine, "foo.bar");

        // Continues the sequence rather than restarting it.
        directive.toggle();
        assert_eq!(engine.table_state().sort.direction, Some(SortDirection::Asc));
    }

    #[tokio::test]
    async fn test_other_pointer_resets_cycle() {
        let engine = engine();
        let directive = SortDirective::new(&engine, "foo.bar");

        directive.toggle(); // asc
        engine.sort(SortPatch::new().pointer("other").direction(SortDirection::Asc));

        // Counter restarted: next toggle is step 1 again.
        directive.toggle();
        assert_eq!(engine.table_state().sort.pointer.as_deref(), Some("foo.bar"));
        assert_eq!(engine.table_state().sort.direction, Some(SortDirection::Asc));
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_commits_trailing_direction_only() {
        let engine = engine();
        let directive = SortDirective::new(&engine, "foo.bar")
            .debounce(Duration::from_millis(100));

        directive.toggle(); // asc, pending
        directive.toggle(); // desc, replaces the pending commit

        tokio::time::sleep(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;

        assert_eq!(engine.table_state().sort.direction, Some(SortDirection::Desc));
    }

    #[tokio::test]
    async fn test_state_reads_through() {
        let engine = engine();
        let directive = SortDirective::new(&engine, "foo.bar");
        engine.slice(SlicePatch::new().page(2));
        assert_eq!(directive.state(), engine.table_state().sort);
    }
}
