//! Working-indicator directive.

use std::sync::Mutex;

use crate::engine::TableEngine;
use crate::events::{EventKind, ListenerId, TableEvent};

/// Typed subscription surface for execution-in-progress notifications.
///
/// Listeners receive `true` when an execution is scheduled and `false`
/// once its pipeline run finished, successfully or not — the usual driver
/// for a spinner or busy overlay.
pub struct WorkingIndicatorDirective {
    table: TableEngine,
    listeners: Mutex<Vec<ListenerId>>,
}

impl WorkingIndicatorDirective {
    /// Creates a directive over the engine's channel.
    pub fn new(table: &TableEngine) -> Self {
        Self {
            table: table.clone(),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Registers a listener for execution-state changes.
    pub fn on_execution_change(
        &self,
        listener: impl Fn(bool) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = self.table.on(EventKind::ExecChanged, move |event| {
            if let TableEvent::ExecChanged { working } = event {
                listener(*working);
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

impl Drop for WorkingIndicatorDirective {
    fn drop(&mut self) {
        self.detach();
    }
}
