//! Filter directive.

use std::sync::Mutex;

use serde_json::Value;

use crate::engine::TableEngine;
use crate::events::{EventKind, ListenerId, TableEvent};
use crate::state::{ClauseType, FilterClause, FilterOperator, FilterPatch, FilterSpec};

/// Builds single-clause filters for one record field.
///
/// The operator and clause type are fixed per directive (an `includes`
/// string filter by default); each [`filter`](Self::filter) call submits a
/// one-clause list for the field, and [`clear`](Self::clear) submits an
/// empty list — which the engine's normalization turns into removing the
/// field from the filter state entirely.
///
/// # Example
///
/// ```no_run
/// use gridstate::TableEngine;
/// use gridstate::directives::FilterDirective;
/// # fn demo(engine: &TableEngine) {
/// let by_name = FilterDirective::new(engine, "name");
/// by_name.filter("lau");
/// by_name.clear();
/// # }
/// ```
pub struct FilterDirective {
    table: TableEngine,
    pointer: String,
    operator: FilterOperator,
    clause_type: ClauseType,
    listeners: Mutex<Vec<ListenerId>>,
}

impl FilterDirective {
    /// Creates a directive for the given record field.
    pub fn new(table: &TableEngine, pointer: impl Into<String>) -> Self {
        Self {
            table: table.clone(),
            pointer: pointer.into(),
            operator: FilterOperator::Includes,
            clause_type: ClauseType::String,
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Sets the operator used for submitted clauses.
    pub fn operator(mut self, operator: FilterOperator) -> Self {
        self.operator = operator;
        self
    }

    /// Sets the coercion type used for submitted clauses.
    pub fn clause_type(mut self, clause_type: ClauseType) -> Self {
        self.clause_type = clause_type;
        self
    }

    /// Submits a single clause for this directive's field.
    pub fn filter(&self, input: impl Into<Value>) {
        let clause = FilterClause::new(input)
            .operator(self.operator)
            .clause_type(self.clause_type);
        self.table
            .filter(FilterPatch::new().set(self.pointer.clone(), vec![clause]));
    }

    /// Clears this directive's field from the filter state.
    pub fn clear(&self) {
        self.table
            .filter(FilterPatch::new().clear(self.pointer.clone()));
    }

    /// Returns the engine's current filter state.
    pub fn state(&self) -> FilterSpec {
        self.table.table_state().filter
    }

    /// Registers a listener for filter-changed events.
    pub fn on_filter_change(
        &self,
        listener: impl Fn(&FilterSpec) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = self.table.on(EventKind::FilterChanged, move |event| {
            if let TableEvent::FilterChanged(spec) = event {
                listener(spec);
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

impl Drop for FilterDirective {
    fn drop(&mut self) {
        self.detach();
    }
}
