//! The table engine: view-state owner, pipeline composer, event publisher.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StageError;
use crate::events::{Emitter, EventKind, ListenerId, TableEvent};
use crate::pipeline::{
    DefaultFilter, DefaultSearch, DefaultSlice, DefaultSort, FilterFactory, Row, SearchFactory,
    SliceFactory, SortFactory, Stage,
};
use crate::state::{FilterPatch, SearchPatch, SlicePatch, SortPatch, TableState};

/// Derived counts republished after every pipeline run.
///
/// `filtered_count` is the number of records that passed filter and search,
/// before slicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// 1-based page of the run.
    pub page: u64,
    /// Page size of the run, if slicing was configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Length of the array after filter + search, before slicing.
    #[serde(rename = "filteredCount")]
    pub filtered_count: usize,
}

/// Options for [`TableEngine::exec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOptions {
    /// Delay before the scheduled pipeline run fires.
    pub processing_delay: Duration,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            processing_delay: Duration::from_millis(20),
        }
    }
}

struct EngineInner {
    data: Arc<[Value]>,
    state: Mutex<TableState>,
    /// Count of the last published summary; data length before any run.
    filtered_count: AtomicUsize,
    /// Rows that passed filter + search in the most recent run.
    matching: Mutex<Vec<Row>>,
    emitter: Emitter,
    sort_factory: Box<dyn SortFactory>,
    filter_factory: Box<dyn FilterFactory>,
    search_factory: Box<dyn SearchFactory>,
    slice_factory: Box<dyn SliceFactory>,
}

/// Reactive data-view engine over a fixed array of records.
///
/// The engine owns the data array for its lifetime (records are only read,
/// never mutated) and a mutable [`TableState`]. Mutation operations merge a
/// patch into the matching state field, publish the post-merge value,
/// reset pagination to the first page (except [`slice`](Self::slice),
/// which *is* the page-setting operation), and schedule a deferred
/// pipeline run. The run publishes a [`Summary`] and the index-tagged
/// display rows.
///
/// Cloning is cheap: clones share the same state and channel, so
/// directives and application code can each hold their own handle.
///
/// Scheduling (`exec`, and the mutation operations that trigger it) must
/// happen within a tokio runtime.
///
/// # Example
///
/// ```no_run
/// use gridstate::TableEngine;
/// use gridstate::state::SearchPatch;
/// use serde_json::json;
///
/// let engine = TableEngine::builder(vec![
///     json!({"name": "foo"}),
///     json!({"name": "blah"}),
/// ])
/// .build();
///
/// engine.on_display_change(|rows| println!("{} rows", rows.len()));
/// engine.search(SearchPatch::new().value("bl").scope(["name"]));
/// ```
#[derive(Clone)]
pub struct TableEngine {
    inner: Arc<EngineInner>,
}

impl TableEngine {
    /// Creates a builder for an engine over the given records.
    pub fn builder(data: Vec<Value>) -> TableEngineBuilder {
        TableEngineBuilder::new(data)
    }

    // -------------------------------------------------------------------------
    // Mutation operations
    // -------------------------------------------------------------------------

    /// Merges the patch into the sort state, publishes the post-merge sort
    /// spec, resets to the first page, and schedules an execution.
    ///
    /// An empty patch leaves the state untouched but still re-runs the
    /// whole cycle.
    pub fn sort(&self, patch: SortPatch) {
        let post = {
            let mut state = match self.inner.state.lock() {
                Ok(state) => state,
                Err(_) => return,
            };
            state.sort.merge(patch);
            state.sort.clone()
        };
        trace!("sort changed: {post:?}");
        self.inner.emitter.dispatch(&TableEvent::SortChanged(post));
        self.reset_to_first_page();
        self.exec(ExecOptions::default());
    }

    /// Merges the patch into the filter state, publishes the post-merge
    /// (normalized) filter spec, resets to the first page, and schedules
    /// an execution.
    pub fn filter(&self, patch: FilterPatch) {
        let post = {
            let mut state = match self.inner.state.lock() {
                Ok(state) => state,
                Err(_) => return,
            };
            state.filter.merge(patch);
            state.filter.clone()
        };
        trace!("filter changed: {post:?}");
        self.inner.emitter.dispatch(&TableEvent::FilterChanged(post));
        self.reset_to_first_page();
        self.exec(ExecOptions::default());
    }

    /// Merges the patch into the search state, publishes the post-merge
    /// search spec, resets to the first page, and schedules an execution.
    pub fn search(&self, patch: SearchPatch) {
        let post = {
            let mut state = match self.inner.state.lock() {
                Ok(state) => state,
                Err(_) => return,
            };
            state.search.merge(patch);
            state.search.clone()
        };
        trace!("search changed: {post:?}");
        self.inner.emitter.dispatch(&TableEvent::SearchChanged(post));
        self.reset_to_first_page();
        self.exec(ExecOptions::default());
    }

    /// Merges the patch into the slice state, publishes the post-merge
    /// slice spec, and schedules an execution.
    ///
    /// Unlike the other mutation operations this does not reset the page:
    /// `slice` is the page-setting operation itself.
    pub fn slice(&self, patch: SlicePatch) {
        let post = {
            let mut state = match self.inner.state.lock() {
                Ok(state) => state,
                Err(_) => return,
            };
            state.slice.merge(patch);
            state.slice
        };
        trace!("slice changed: {post:?}");
        self.inner.emitter.dispatch(&TableEvent::PageChanged(post));
        self.exec(ExecOptions::default());
    }

    fn reset_to_first_page(&self) {
        let post = {
            let mut state = match self.inner.state.lock() {
                Ok(state) => state,
                Err(_) => return,
            };
            state.slice.page = 1;
            state.slice
        };
        self.inner.emitter.dispatch(&TableEvent::PageChanged(post));
    }

    // -------------------------------------------------------------------------
    // Execution
    // -------------------------------------------------------------------------

    /// Schedules a pipeline run after `processing_delay`.
    ///
    /// Publishes `ExecChanged { working: true }` synchronously before
    /// scheduling, and `ExecChanged { working: false }` exactly once after
    /// the run finished, whether it succeeded or failed. A stage error is
    /// published as an execution-error event and suppressed.
    ///
    /// The run reads the view-state current at fire time, not the state
    /// captured when `exec` was called; overlapping scheduled runs are
    /// allowed and each re-read current state.
    pub fn exec(&self, opts: ExecOptions) {
        self.inner
            .emitter
            .dispatch(&TableEvent::ExecChanged { working: true });
        let engine = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(opts.processing_delay).await;
            if let Err(err) = engine.run_pipeline() {
                debug!("pipeline run failed: {err}");
                engine.inner.emitter.dispatch(&TableEvent::ExecError(err));
            }
            engine
                .inner
                .emitter
                .dispatch(&TableEvent::ExecChanged { working: false });
        });
    }

    fn run_pipeline(&self) -> Result<(), StageError> {
        let state = self.table_state();
        debug!(
            "running pipeline over {} records (page {})",
            self.inner.data.len(),
            state.slice.page
        );
        let (filter, search, sort, slice) = self.build_stages(&state);

        let rows = filter(self.all_rows())?;
        let rows = search(rows)?;

        // Capture the post-filter/search collection and publish the
        // summary before ordering and slicing.
        let summary = Summary {
            page: state.slice.page,
            size: state.slice.size,
            filtered_count: rows.len(),
        };
        if let Ok(mut matching) = self.inner.matching.lock() {
            *matching = rows.clone();
        }
        self.inner
            .emitter
            .dispatch(&TableEvent::SummaryChanged(summary));

        let rows = sort(rows)?;
        let rows = slice(rows)?;
        self.inner
            .emitter
            .dispatch(&TableEvent::DisplayChanged(rows));
        Ok(())
    }

    /// Runs the pipeline against an arbitrary state without touching the
    /// engine: no events, no summary, no cached counts.
    ///
    /// Defaults to the current view-state when `state` is `None`. A stage
    /// error is returned to the caller directly, since this path has no
    /// event channel.
    ///
    /// ```no_run
    /// # use gridstate::TableEngine;
    /// # async fn demo(engine: &TableEngine) {
    /// let rows = engine.eval(None).await.unwrap();
    /// # let _ = rows;
    /// # }
    /// ```
    pub async fn eval(&self, state: Option<TableState>) -> Result<Vec<Row>, StageError> {
        let state = state.unwrap_or_else(|| self.table_state());
        let (filter, search, sort, slice) = self.build_stages(&state);
        slice(sort(search(filter(self.all_rows())?)?)?)
    }

    fn build_stages(&self, state: &TableState) -> (Stage, Stage, Stage, Stage) {
        (
            self.inner.filter_factory.build(&state.filter),
            self.inner.search_factory.build(&state.search),
            self.inner.sort_factory.build(&state.sort),
            self.inner.slice_factory.build(&state.slice),
        )
    }

    fn all_rows(&self) -> Vec<Row> {
        self.inner
            .data
            .iter()
            .enumerate()
            .map(|(index, value)| Row {
                index,
                value: value.clone(),
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Returns an independent copy of the current view-state.
    ///
    /// Mutating the returned value never affects the engine.
    pub fn table_state(&self) -> TableState {
        self.inner
            .state
            .lock()
            .map(|state| state.clone())
            .unwrap_or_default()
    }

    /// Returns a copy of the rows that passed filter + search in the most
    /// recent pipeline run (the full data set before any run).
    pub fn matching_items(&self) -> Vec<Row> {
        self.inner
            .matching
            .lock()
            .map(|matching| matching.clone())
            .unwrap_or_default()
    }

    /// The filtered count of the last published summary; the data length
    /// before any execution.
    pub fn filtered_count(&self) -> usize {
        self.inner.filtered_count.load(Ordering::SeqCst)
    }

    /// Number of records in the data array (constant).
    pub fn len(&self) -> usize {
        self.inner.data.len()
    }

    /// Returns `true` when the data array is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.data.is_empty()
    }

    // -------------------------------------------------------------------------
    // Event channel
    // -------------------------------------------------------------------------

    /// Registers a listener for an event kind.
    pub fn on(
        &self,
        kind: EventKind,
        listener: impl Fn(&TableEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        self.inner.emitter.on(kind, listener)
    }

    /// Removes a single listener.
    pub fn off(&self, id: ListenerId) {
        self.inner.emitter.off(id);
    }

    /// Removes every listener for an event kind.
    pub fn off_event(&self, kind: EventKind) {
        self.inner.emitter.off_event(kind);
    }

    /// Publishes an event on the engine's channel.
    ///
    /// Intended for external collaborators such as server-side pagination
    /// adapters: a summary dispatched here also updates the engine's
    /// [`filtered_count`](Self::filtered_count).
    pub fn dispatch(&self, event: &TableEvent) {
        self.inner.emitter.dispatch(event);
    }

    /// Registers a listener for the display rows of each pipeline run.
    pub fn on_display_change(
        &self,
        listener: impl Fn(&[Row]) + Send + Sync + 'static,
    ) -> ListenerId {
        self.on(EventKind::DisplayChanged, move |event| {
            if let TableEvent::DisplayChanged(rows) = event {
                listener(rows);
            }
        })
    }
}

impl std::fmt::Debug for TableEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableEngine")
            .field("len", &self.len())
            .field("filtered_count", &self.filtered_count())
            .finish_non_exhaustive()
    }
}

/// Builder for [`TableEngine`].
///
/// All four stage factories default to the crate's implementations; the
/// initial view-state defaults to no sort, no filter, no search, page 1
/// without slicing.
pub struct TableEngineBuilder {
    data: Vec<Value>,
    state: TableState,
    sort_factory: Box<dyn SortFactory>,
    filter_factory: Box<dyn FilterFactory>,
    search_factory: Box<dyn SearchFactory>,
    slice_factory: Box<dyn SliceFactory>,
}

impl TableEngineBuilder {
    fn new(data: Vec<Value>) -> Self {
        Self {
            data,
            state: TableState::default(),
            sort_factory: Box::new(DefaultSort),
            filter_factory: Box::new(DefaultFilter),
            search_factory: Box::new(DefaultSearch),
            slice_factory: Box::new(DefaultSlice),
        }
    }

    /// Sets the initial view-state.
    pub fn state(mut self, state: TableState) -> Self {
        self.state = state;
        self
    }

    /// Replaces the ordering stage factory.
    pub fn sort_factory(mut self, factory: impl SortFactory + 'static) -> Self {
        self.sort_factory = Box::new(factory);
        self
    }

    /// Replaces the filter stage factory.
    pub fn filter_factory(mut self, factory: impl FilterFactory + 'static) -> Self {
        self.filter_factory = Box::new(factory);
        self
    }

    /// Replaces the search stage factory.
    pub fn search_factory(mut self, factory: impl SearchFactory + 'static) -> Self {
        self.search_factory = Box::new(factory);
        self
    }

    /// Replaces the pagination stage factory.
    pub fn slice_factory(mut self, factory: impl SliceFactory + 'static) -> Self {
        self.slice_factory = Box::new(factory);
        self
    }

    /// Builds the engine.
    pub fn build(self) -> TableEngine {
        let matching: Vec<Row> = self
            .data
            .iter()
            .enumerate()
            .map(|(index, value)| Row {
                index,
                value: value.clone(),
            })
            .collect();
        let inner = Arc::new(EngineInner {
            filtered_count: AtomicUsize::new(self.data.len()),
            data: self.data.into(),
            state: Mutex::new(self.state),
            matching: Mutex::new(matching),
            emitter: Emitter::new(),
            sort_factory: self.sort_factory,
            filter_factory: self.filter_factory,
            search_factory: self.search_factory,
            slice_factory: self.slice_factory,
        });

        // Mirror the filtered count from any published summary, including
        // summaries dispatched by external collaborators (server-side
        // pagination). Weak so the subscription does not keep the engine
        // alive through its own channel.
        let weak: Weak<EngineInner> = Arc::downgrade(&inner);
        inner.emitter.on(EventKind::SummaryChanged, move |event| {
            if let (Some(inner), TableEvent::SummaryChanged(summary)) = (weak.upgrade(), event) {
                inner
                    .filtered_count
                    .store(summary.filtered_count, Ordering::SeqCst);
            }
        });

        TableEngine { inner }
    }
}
