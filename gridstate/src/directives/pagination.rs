//! Pagination directive.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::engine::{Summary, TableEngine};
use crate::events::{EventKind, ListenerId, TableEvent};
use crate::state::{SlicePatch, SliceSpec};

/// The derived pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    /// Current 1-based page.
    pub page: u64,
    /// Current page size, if slicing is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Number of records after filter + search.
    #[serde(rename = "filteredCount")]
    pub filtered_count: usize,
    /// Number of pages at the current size (1 when no size is set).
    #[serde(rename = "pageCount")]
    pub page_count: u64,
}

#[derive(Debug, Clone, Copy)]
struct PageWindow {
    page: u64,
    size: Option<u64>,
    filtered_count: usize,
}

impl PageWindow {
    /// With no page size everything fits on one page — the defensive
    /// reading of an unset size, rather than an undefined division.
    fn page_count(&self) -> u64 {
        match self.size {
            Some(size) if size > 0 => (self.filtered_count as u64).div_ceil(size),
            _ => 1,
        }
    }
}

/// Derives current-page/page-count/enabled-state from the engine's summary
/// events and translates navigation calls into slice mutations.
///
/// The window (page, size, filtered count) is cached locally: it is seeded
/// from the engine at construction and then kept in sync by the summary
/// subscription, so the enabled-state queries never hit the engine
/// synchronously.
///
/// # Example
///
/// ```no_run
/// use gridstate::TableEngine;
/// use gridstate::directives::PaginationDirective;
/// # fn demo(engine: &TableEngine) {
/// let pager = PaginationDirective::new(engine);
/// if pager.is_next_page_enabled() {
///     pager.select_next_page();
/// }
/// # }
/// ```
pub struct PaginationDirective {
    table: TableEngine,
    window: Arc<Mutex<PageWindow>>,
    listeners: Mutex<Vec<ListenerId>>,
}

impl PaginationDirective {
    /// Creates a directive over the engine's slice state.
    pub fn new(table: &TableEngine) -> Self {
        let table = table.clone();
        let slice = table.table_state().slice;
        let window = Arc::new(Mutex::new(PageWindow {
            page: slice.page,
            size: slice.size,
            filtered_count: table.filtered_count(),
        }));

        let mirror = window.clone();
        let id = table.on(EventKind::SummaryChanged, move |event| {
            if let TableEvent::SummaryChanged(summary) = event
                && let Ok(mut window) = mirror.lock()
            {
                window.page = summary.page;
                window.size = summary.size;
                window.filtered_count = summary.filtered_count;
            }
        });

        Self {
            table,
            window,
            listeners: Mutex::new(vec![id]),
        }
    }

    fn window(&self) -> PageWindow {
        self.window.lock().map(|w| *w).unwrap_or(PageWindow {
            page: 1,
            size: None,
            filtered_count: 0,
        })
    }

    /// Navigates to the given 1-based page, keeping the current size.
    pub fn select_page(&self, page: u64) {
        let size = self.window().size;
        let mut patch = SlicePatch::new().page(page);
        if let Some(size) = size {
            patch = patch.size(size);
        }
        self.table.slice(patch);
    }

    /// Navigates to the page after the current one.
    pub fn select_next_page(&self) {
        self.select_page(self.window().page + 1);
    }

    /// Navigates to the page before the current one.
    pub fn select_previous_page(&self) {
        self.select_page(self.window().page.saturating_sub(1));
    }

    /// Changes the page size, always resetting to the first page.
    pub fn change_page_size(&self, size: u64) {
        self.table.slice(SlicePatch::new().page(1).size(size));
    }

    /// `true` when there is a page before the current one.
    pub fn is_previous_page_enabled(&self) -> bool {
        self.window().page > 1
    }

    /// `true` when there is a page after the current one.
    pub fn is_next_page_enabled(&self) -> bool {
        let window = self.window();
        window.page_count() > window.page
    }

    /// Returns the engine's slice state merged with the cached counts.
    pub fn state(&self) -> PaginationState {
        let slice: SliceSpec = self.table.table_state().slice;
        let window = self.window();
        PaginationState {
            page: slice.page,
            size: slice.size,
            filtered_count: window.filtered_count,
            page_count: window.page_count(),
        }
    }

    /// Registers a listener for page-changed events.
    pub fn on_page_change(
        &self,
        listener: impl Fn(&SliceSpec) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = self.table.on(EventKind::PageChanged, move |event| {
            if let TableEvent::PageChanged(slice) = event {
                listener(slice);
            }
        });
        self.push_listener(id);
        id
    }

    /// Registers a listener for summary events.
    pub fn on_summary_change(
        &self,
        listener: impl Fn(&Summary) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = self.table.on(EventKind::SummaryChanged, move |event| {
            if let TableEvent::SummaryChanged(summary) = event {
                listener(summary);
            }
        });
        self.push_listener(id);
        id
    }

    fn push_listener(&self, id: ListenerId) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(id);
        }
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

impl Drop for PaginationDirective {
    fn drop(&mut self) {
        self.detach();
    }
}
