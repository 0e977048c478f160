//! Search directive.

use std::sync::Mutex;

use crate::engine::TableEngine;
use crate::events::{EventKind, ListenerId, TableEvent};
use crate::state::{SearchPatch, SearchSpec};

/// Submits search requests over a fixed set of record fields.
///
/// # Example
///
/// ```no_run
/// use gridstate::TableEngine;
/// use gridstate::directives::SearchDirective;
/// # fn demo(engine: &TableEngine) {
/// let search = SearchDirective::new(engine, ["name", "address.city"]);
/// search.search("lau");
/// # }
/// ```
pub struct SearchDirective {
    table: TableEngine,
    scope: Vec<String>,
    listeners: Mutex<Vec<ListenerId>>,
}

impl SearchDirective {
    /// Creates a directive searching the given record fields.
    pub fn new<I, S>(table: &TableEngine, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.clone(),
            scope: scope.into_iter().map(Into::into).collect(),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Submits a search for the given text over this directive's scope.
    pub fn search(&self, input: impl Into<String>) {
        self.table
            .search(SearchPatch::new().value(input).scope(self.scope.clone()));
    }

    /// Like [`search`](Self::search), with the pattern knobs for a
    /// pattern-based search factory.
    pub fn search_with(&self, input: impl Into<String>, escape: bool, flags: Option<String>) {
        let mut patch = SearchPatch::new()
            .value(input)
            .scope(self.scope.clone())
            .escape(escape);
        if let Some(flags) = flags {
            patch = patch.flags(flags);
        }
        self.table.search(patch);
    }

    /// Returns the engine's current search state.
    pub fn state(&self) -> SearchSpec {
        self.table.table_state().search
    }

    /// Registers a listener for search-changed events.
    pub fn on_search_change(
        &self,
        listener: impl Fn(&SearchSpec) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = self.table.on(EventKind::SearchChanged, move |event| {
            if let TableEvent::SearchChanged(spec) = event {
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

impl Drop for SearchDirective {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_search_carries_scope() {
        let engine = TableEngine::builder(vec![json!({"name": "foo"})]).build();
        let directive = SearchDirective::new(&engine, ["name", "alias"]);
        directive.search("fo");

        let state = engine.table_state().search;
        assert_eq!(state.value.as_deref(), Some("fo"));
        assert_eq!(state.scope, vec!["name".to_string(), "alias".to_string()]);
    }

    #[tokio::test]
    async fn test_search_with_pattern_knobs() {
        let engine = TableEngine::builder(vec![json!({"name": "foo"})]).build();
        let directive = SearchDirective::new(&engine, ["name"]);
        directive.search_with("f.o", true, Some("i".to_string()));

        let state = engine.table_state().search;
        assert!(state.escape);
        assert_eq!(state.flags.as_deref(), Some("i"));
    }
}
