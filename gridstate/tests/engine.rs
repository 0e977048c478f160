//! End-to-end scenarios: mutation → deferred execution → published events.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use gridstate::directives::{PaginationDirective, SortDirective, WorkingIndicatorDirective};
use gridstate::pipeline::{SortFactory, Stage};
use gridstate::state::{
    FilterClause, FilterPatch, SearchPatch, SlicePatch, SortDirection, SortPatch,
};
use gridstate::{EventKind, StageError, Summary, TableEngine, TableEvent};
use serde_json::{json, Value};

fn sample_data() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "foo"}),
        json!({"id": 2, "name": "blah"}),
        json!({"id": 3, "name": "bip"}),
    ]
}

/// Collects the kind of every published event, in dispatch order.
fn record_events(engine: &TableEngine) -> Arc<Mutex<Vec<EventKind>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    for kind in [
        EventKind::SortChanged,
        EventKind::DisplayChanged,
        EventKind::PageChanged,
        EventKind::ExecChanged,
        EventKind::FilterChanged,
        EventKind::SummaryChanged,
        EventKind::SearchChanged,
        EventKind::ExecError,
    ] {
        let log = log.clone();
        engine.on(kind, move |event| {
            log.lock().unwrap().push(event.kind());
        });
    }
    log
}

/// Lets the scheduled pipeline run fire under a paused clock.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
    tokio::task::yield_now().await;
}

#[tokio::test(start_paused = true)]
async fn test_exec_publishes_summary_and_display() {
    let engine = TableEngine::builder(sample_data()).build();

    let summaries: Arc<Mutex<Vec<Summary>>> = Arc::new(Mutex::new(Vec::new()));
    let mirror = summaries.clone();
    engine.on(EventKind::SummaryChanged, move |event| {
        if let TableEvent::SummaryChanged(summary) = event {
            mirror.lock().unwrap().push(*summary);
        }
    });
    let displayed: Arc<Mutex<Vec<Vec<usize>>>> = Arc::new(Mutex::new(Vec::new()));
    let mirror = displayed.clone();
    engine.on_display_change(move |rows| {
        mirror
            .lock()
            .unwrap()
            .push(rows.iter().map(|row| row.index).collect());
    });

    engine.slice(SlicePatch::new().page(1).size(1));
    engine.filter(FilterPatch::new().set("name", vec![FilterClause::new("b")]));
    settle().await;

    let last = *summaries.lock().unwrap().last().unwrap();
    assert_eq!(
        last,
        Summary {
            page: 1,
            size: Some(1),
            filtered_count: 2
        }
    );
    assert_eq!(engine.filtered_count(), 2);
    assert_eq!(engine.matching_items().len(), 2);
    // Page 1 of size 1 over the two matching records.
    assert_eq!(displayed.lock().unwrap().last().unwrap(), &vec![1]);
}

#[tokio::test(start_paused = true)]
async fn test_mutations_reset_page_preserving_size() {
    let engine = TableEngine::builder(sample_data()).build();
    engine.slice(SlicePatch::new().page(3).size(25));

    let pages: Arc<Mutex<Vec<(u64, Option<u64>)>>> = Arc::new(Mutex::new(Vec::new()));
    let mirror = pages.clone();
    engine.on(EventKind::PageChanged, move |event| {
        if let TableEvent::PageChanged(slice) = event {
            mirror.lock().unwrap().push((slice.page, slice.size));
        }
    });

    engine.sort(SortPatch::new().pointer("id"));
    assert_eq!(*pages.lock().unwrap().last().unwrap(), (1, Some(25)));

    engine.slice(SlicePatch::new().page(2));
    engine.search(SearchPatch::new().value("b").scope(["name"]));
    assert_eq!(*pages.lock().unwrap().last().unwrap(), (1, Some(25)));

    engine.slice(SlicePatch::new().page(2));
    engine.filter(FilterPatch::new());
    assert_eq!(engine.table_state().slice.page, 1);
    settle().await;
}

#[tokio::test(start_paused = true)]
async fn test_slice_alone_never_resets_page() {
    let engine = TableEngine::builder(sample_data()).build();
    engine.slice(SlicePatch::new().page(2).size(1));
    engine.slice(SlicePatch::new().size(2));
    assert_eq!(engine.table_state().slice.page, 2);
    settle().await;
}

#[tokio::test(start_paused = true)]
async fn test_working_flag_brackets_each_run() {
    let engine = TableEngine::builder(sample_data()).build();
    let indicator = WorkingIndicatorDirective::new(&engine);

    let flags = Arc::new(Mutex::new(Vec::new()));
    let mirror = flags.clone();
    indicator.on_execution_change(move |working| {
        mirror.lock().unwrap().push(working);
    });

    engine.exec(Default::default());
    settle().await;
    assert_eq!(*flags.lock().unwrap(), vec![true, false]);
}

#[tokio::test(start_paused = true)]
async fn test_stage_error_is_published_not_propagated() {
    struct Exploding;
    impl SortFactory for Exploding {
        fn build(&self, _spec: &gridstate::state::SortSpec) -> Stage {
            Box::new(|_| Err(StageError::new("sort blew up")))
        }
    }

    let engine = TableEngine::builder(sample_data())
        .sort_factory(Exploding)
        .build();
    let log = record_events(&engine);

    let errors = Arc::new(Mutex::new(Vec::new()));
    let mirror = errors.clone();
    engine.on(EventKind::ExecError, move |event| {
        if let TableEvent::ExecError(err) = event {
            mirror.lock().unwrap().push(err.message().to_string());
        }
    });

    engine.exec(Default::default());
    settle().await;

    assert_eq!(*errors.lock().unwrap(), vec!["sort blew up".to_string()]);
    // The summary still went out (it precedes the failing sort), no
    // display event followed, and the working flag still came back down.
    let log = log.lock().unwrap();
    assert!(log.contains(&EventKind::SummaryChanged));
    assert!(!log.contains(&EventKind::DisplayChanged));
    assert_eq!(log.last(), Some(&EventKind::ExecChanged));
}

#[tokio::test]
async fn test_eval_dispatches_nothing() {
    let engine = TableEngine::builder(sample_data()).build();
    let log = record_events(&engine);

    let rows = engine.eval(None).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_deferred_run_reads_state_at_fire_time() {
    let engine = TableEngine::builder(sample_data()).build();

    let displayed: Arc<Mutex<Vec<Vec<usize>>>> = Arc::new(Mutex::new(Vec::new()));
    let mirror = displayed.clone();
    engine.on_display_change(move |rows| {
        mirror
            .lock()
            .unwrap()
            .push(rows.iter().map(|row| row.index).collect());
    });

    // Two mutations before any scheduled run fires: every run sees the
    // final state, so both dispatch the same display.
    engine.sort(SortPatch::new().pointer("id").direction(SortDirection::Desc));
    engine.slice(SlicePatch::new().page(1).size(2));
    settle().await;

    let displayed = displayed.lock().unwrap();
    assert!(displayed.len() >= 2);
    for run in displayed.iter() {
        assert_eq!(run, &vec![2, 1]);
    }
}

#[tokio::test(start_paused = true)]
async fn test_sort_directive_drives_display_order() {
    let engine = TableEngine::builder(sample_data()).build();
    let header = SortDirective::new(&engine, "id");

    let displayed: Arc<Mutex<Vec<Vec<usize>>>> = Arc::new(Mutex::new(Vec::new()));
    let mirror = displayed.clone();
    engine.on_display_change(move |rows| {
        mirror
            .lock()
            .unwrap()
            .push(rows.iter().map(|row| row.index).collect());
    });

    header.toggle(); // asc
    settle().await;
    assert_eq!(displayed.lock().unwrap().last().unwrap(), &vec![0, 1, 2]);

    header.toggle(); // desc
    settle().await;
    assert_eq!(displayed.lock().unwrap().last().unwrap(), &vec![2, 1, 0]);
}

#[tokio::test(start_paused = true)]
async fn test_pagination_follows_pipeline_summaries() {
    let engine = TableEngine::builder(sample_data()).build();
    let pager = PaginationDirective::new(&engine);

    engine.slice(SlicePatch::new().page(1).size(2));
    settle().await;

    assert!(pager.is_next_page_enabled());
    assert!(!pager.is_previous_page_enabled());

    pager.select_next_page();
    settle().await;

    assert_eq!(engine.table_state().slice.page, 2);
    assert!(!pager.is_next_page_enabled());
    assert!(pager.is_previous_page_enabled());
    assert_eq!(pager.state().page_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_search_narrows_then_clears() {
    let engine = TableEngine::builder(sample_data()).build();

    engine.search(SearchPatch::new().value("b").scope(["name"]));
    settle().await;
    assert_eq!(engine.filtered_count(), 2);

    engine.search(SearchPatch::new().value(""));
    settle().await;
    assert_eq!(engine.filtered_count(), 3);
}
