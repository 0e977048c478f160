//! Summary directive.

use std::sync::Mutex;

use crate::engine::{Summary, TableEngine};
use crate::events::{EventKind, ListenerId, TableEvent};

/// Typed subscription surface for summary events.
///
/// A pure channel adapter: no state beyond the listeners it registers.
pub struct SummaryDirective {
    table: TableEngine,
    listeners: Mutex<Vec<ListenerId>>,
}

impl SummaryDirective {
    /// Creates a directive over the engine's channel.
    pub fn new(table: &TableEngine) -> Self {
        Self {
            table: table.clone(),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Registers a listener for the summary of each pipeline run.
    pub fn on_summary_change(
        &self,
        listener: impl Fn(&Summary) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = self.table.on(EventKind::SummaryChanged, move |event| {
            if let TableEvent::SummaryChanged(summary) = event {
                listener(summary);
            }
        });
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(id);
        }
        id
    }

    /// Removes every listener this directive registered.
    pub fn detach(&self) {
        if let Ok(mut listeners) = self.listeners.lock() {
            for id in listeners.drain(..) {
                self.table.off(id);
            }
        }
    }
}

impl Drop for SummaryDirective {
    fn drop(&mut self) {
        self.detach();
    }
}
