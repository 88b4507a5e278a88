//! Integration tests: paginated acquisition against a scripted media source.
//!
//! Runs the paginator and the full orchestrator into a temp datasets dir and
//! checks search calls, fetched counts, and the files left on disk.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::scripted_source::{ScriptedSource, SearchCall};
use genrefetch_core::catalog::{Catalog, CollectionSpec};
use genrefetch_core::retry::RetryPolicy;
use genrefetch_core::scheduler::{
    search_and_fetch, Acquisition, AcquireSettings, CollectionStatus, Paginator, ProgressEvent,
    TermEnd,
};
use genrefetch_core::source::MediaSource;
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

fn settings(page_size: usize, max_workers: usize) -> AcquireSettings {
    AcquireSettings {
        page_size,
        max_workers,
        fetch_timeout: Duration::from_secs(5),
        search_timeout: Duration::from_secs(5),
        search_retry: RetryPolicy::default(),
    }
}

fn ids(query: &str, range: std::ops::Range<usize>) -> Vec<String> {
    range.map(|i| format!("{}-{}", query, i)).collect()
}

fn collection(name: &str, terms: &[&str], target: u32) -> CollectionSpec {
    CollectionSpec {
        name: name.to_string(),
        search_terms: terms.iter().map(|t| t.to_string()).collect(),
        target_count: target,
    }
}

#[tokio::test]
async fn failed_fetches_trigger_a_second_page_at_offset_fifty() {
    let scripted = Arc::new(
        ScriptedSource::new()
            .with_results("bebop", 100)
            .failing(ids("bebop", 0..10)),
    );
    let source: Arc<dyn MediaSource> = scripted.clone();
    let dir = tempdir().unwrap();
    let s = settings(50, 4);
    let cancel = CancellationToken::new();

    let report = Paginator::new(&source, dir.path(), &s, &cancel, "jazz")
        .run("bebop", 50)
        .await;

    assert_eq!(
        scripted.searches_for("bebop"),
        vec![
            SearchCall { query: "bebop".into(), limit: 50, offset: 0 },
            SearchCall { query: "bebop".into(), limit: 10, offset: 50 },
        ]
    );
    assert_eq!(report.fetched, 50);
    assert_eq!(report.attempted, 60);
    assert_eq!(report.failed, 10);
    assert_eq!(report.pages, 2);
    assert_eq!(report.next_offset, 60);
    assert_eq!(report.end, TermEnd::QuotaMet);
    assert_eq!(report.artifacts.len(), 50);
}

#[tokio::test]
async fn first_page_empty_means_one_search_and_nothing_fetched() {
    let scripted = Arc::new(ScriptedSource::new());
    let source: Arc<dyn MediaSource> = scripted.clone();
    let dir = tempdir().unwrap();
    let s = settings(50, 4);
    let cancel = CancellationToken::new();

    let report = Paginator::new(&source, dir.path(), &s, &cancel, "jazz")
        .run("nothing here", 20)
        .await;

    assert_eq!(report.fetched, 0);
    assert_eq!(report.end, TermEnd::Exhausted);
    assert_eq!(scripted.searches_for("nothing here").len(), 1);
    assert_eq!(scripted.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn short_source_stops_at_first_empty_page() {
    let scripted = Arc::new(ScriptedSource::new().with_results("drone", 5));
    let source: Arc<dyn MediaSource> = scripted.clone();
    let dir = tempdir().unwrap();
    let s = settings(50, 4);
    let cancel = CancellationToken::new();

    let report = Paginator::new(&source, dir.path(), &s, &cancel, "ambient")
        .run("drone", 10)
        .await;

    assert_eq!(report.fetched, 5);
    assert!(report.is_under_quota());
    assert_eq!(report.end, TermEnd::Exhausted);
    let calls = scripted.searches_for("drone");
    assert_eq!(calls.len(), 2);
    assert_eq!((calls[1].limit, calls[1].offset), (5, 10));
}

#[tokio::test]
async fn all_failed_page_does_not_end_the_term() {
    let scripted = Arc::new(
        ScriptedSource::new()
            .with_results("dub", 6)
            .failing(ids("dub", 0..2)),
    );
    let source: Arc<dyn MediaSource> = scripted.clone();
    let dir = tempdir().unwrap();
    let s = settings(2, 2);
    let cancel = CancellationToken::new();

    let report = Paginator::new(&source, dir.path(), &s, &cancel, "reggae")
        .run("dub", 4)
        .await;

    assert_eq!(report.fetched, 4);
    assert_eq!(report.pages, 3);
    assert_eq!(report.end, TermEnd::QuotaMet);
    let offsets: Vec<_> = scripted.searches_for("dub").iter().map(|c| c.offset).collect();
    assert_eq!(offsets, [0, 2, 4]);
}

#[tokio::test]
async fn search_outage_ends_term_unless_retried() {
    let dir = tempdir().unwrap();
    let cancel = CancellationToken::new();

    let scripted = Arc::new(ScriptedSource::new().with_results("grime", 3).flaky("grime", 1));
    let source: Arc<dyn MediaSource> = scripted.clone();
    let s = settings(10, 2);
    let report = Paginator::new(&source, dir.path(), &s, &cancel, "uk")
        .run("grime", 3)
        .await;
    assert_eq!(report.fetched, 0);
    assert!(matches!(report.end, TermEnd::SourceUnavailable(_)));
    assert_eq!(scripted.searches_for("grime").len(), 1);

    let scripted = Arc::new(ScriptedSource::new().with_results("grime", 3).flaky("grime", 2));
    let source: Arc<dyn MediaSource> = scripted.clone();
    let mut s = settings(10, 2);
    s.search_retry = RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    };
    let report = Paginator::new(&source, dir.path(), &s, &cancel, "uk")
        .run("grime", 3)
        .await;
    assert_eq!(report.fetched, 3);
    assert_eq!(report.end, TermEnd::QuotaMet);
}

#[tokio::test]
async fn hundred_over_three_terms_drops_the_remainder() {
    let scripted = Arc::new(
        ScriptedSource::new()
            .with_results("classic rock", 80)
            .with_results("hard rock", 80)
            .with_results("indie rock", 80),
    );
    let source: Arc<dyn MediaSource> = scripted.clone();
    let dir = tempdir().unwrap();

    let acquisition = Acquisition::new(source, dir.path(), settings(50, 4));
    let report = acquisition
        .run(&[collection("rock", &["classic rock", "hard rock", "indie rock"], 100)])
        .await;

    let rock = report.collection("rock").unwrap();
    assert_eq!(rock.quota_per_term, 33);
    assert_eq!(rock.fetched, 99);
    assert!(rock.terms.iter().all(|t| t.fetched == 33));
    assert_eq!(rock.status, CollectionStatus::Completed);
    assert_eq!(scripted.fetches.load(Ordering::SeqCst), 99);

    let on_disk = std::fs::read_dir(dir.path().join("rock")).unwrap().count();
    assert_eq!(on_disk, 99);
}

#[tokio::test]
async fn failures_stay_inside_their_term_or_collection() {
    let scripted = Arc::new(
        ScriptedSource::new()
            .broken("bad term")
            .with_results("good term", 10)
            .with_results("bossa", 4),
    );
    let source: Arc<dyn MediaSource> = scripted.clone();
    let dir = tempdir().unwrap();

    let catalog = Catalog::new(vec![
        collection("empty", &[], 5),
        collection("mixed", &["bad term", "good term"], 10),
        collection("brazil", &["bossa"], 4),
    ]);
    let report = Acquisition::new(source, dir.path(), settings(50, 4))
        .run(catalog.collections())
        .await;

    assert!(matches!(
        report.collection("empty").unwrap().status,
        CollectionStatus::Failed(_)
    ));
    let mixed = report.collection("mixed").unwrap();
    assert!(matches!(mixed.terms[0].end, TermEnd::Abandoned(_)));
    assert_eq!(mixed.terms[1].fetched, 5);
    assert_eq!(mixed.fetched, 5);
    assert_eq!(report.collection("brazil").unwrap().fetched, 4);
    assert_eq!(report.total_fetched(), 9);
    assert!(!report.cancelled);
}

#[tokio::test]
async fn panicking_search_abandons_only_its_term() {
    let scripted = Arc::new(
        ScriptedSource::new()
            .panicking("bad")
            .with_results("fine", 3),
    );
    let source: Arc<dyn MediaSource> = scripted.clone();
    let dir = tempdir().unwrap();

    let report = Acquisition::new(source, dir.path(), settings(10, 2))
        .run(&[collection("a", &["bad"], 3), collection("b", &["fine"], 3)])
        .await;

    let a = report.collection("a").unwrap();
    assert!(matches!(a.terms[0].end, TermEnd::Abandoned(_)));
    assert_eq!(a.fetched, 0);
    let b = report.collection("b").unwrap();
    assert_eq!(b.fetched, 3);
    assert_eq!(b.status, CollectionStatus::Completed);
}

#[tokio::test]
async fn stalled_search_times_out_and_is_retried() {
    let scripted = Arc::new(
        ScriptedSource::new()
            .with_results("slowcore", 3)
            .stalled("slowcore", Duration::from_secs(30)),
    );
    let source: Arc<dyn MediaSource> = scripted.clone();
    let dir = tempdir().unwrap();
    let cancel = CancellationToken::new();
    let mut s = settings(10, 2);
    s.search_timeout = Duration::from_millis(50);
    s.search_retry = RetryPolicy {
        max_attempts: 2,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    };

    let report = tokio::time::timeout(
        Duration::from_secs(5),
        Paginator::new(&source, dir.path(), &s, &cancel, "indie").run("slowcore", 3),
    )
    .await
    .expect("search deadline not enforced");

    match &report.end {
        TermEnd::SourceUnavailable(reason) => assert!(reason.contains("timed out"), "{reason}"),
        other => panic!("expected SourceUnavailable, got {other:?}"),
    }
    assert_eq!(report.fetched, 0);
    assert_eq!(scripted.searches_for("slowcore").len(), 2);
}

#[tokio::test]
async fn cancellation_drains_the_current_page_then_halts() {
    let token = CancellationToken::new();
    let scripted = Arc::new(
        ScriptedSource::new()
            .with_results("house", 20)
            .with_results("techno", 20)
            .cancelling(token.clone()),
    );
    let source: Arc<dyn MediaSource> = scripted.clone();
    let dir = tempdir().unwrap();

    let report = Acquisition::new(source, dir.path(), settings(5, 2))
        .with_cancellation(token)
        .run(&[
            collection("electronic", &["house"], 20),
            collection("more", &["techno"], 20),
        ])
        .await;

    assert!(report.cancelled);
    let electronic = report.collection("electronic").unwrap();
    assert_eq!(electronic.fetched, 5, "first page drains fully");
    assert_eq!(electronic.terms[0].end, TermEnd::Cancelled);
    assert_eq!(electronic.status, CollectionStatus::Cancelled);
    assert_eq!(report.collection("more").unwrap().status, CollectionStatus::Cancelled);
    assert!(scripted.searches_for("techno").is_empty());
}

#[tokio::test]
async fn progress_events_match_the_report() {
    let scripted = Arc::new(
        ScriptedSource::new()
            .with_results("salsa", 7)
            .failing(ids("salsa", 0..1)),
    );
    let source: Arc<dyn MediaSource> = scripted.clone();
    let dir = tempdir().unwrap();
    let (tx, mut rx) = tokio::sync::mpsc::channel(64);

    let report = Acquisition::new(source, dir.path(), settings(3, 2))
        .with_progress(tx)
        .run(&[collection("latin", &["salsa"], 6)])
        .await;

    let mut events = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        events.push(ev);
    }
    let last_batch_fetched = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::BatchFinished { fetched, .. } => Some(*fetched),
            _ => None,
        })
        .last();
    let latin = report.collection("latin").unwrap();
    assert_eq!(last_batch_fetched, Some(latin.fetched));
    assert!(events.iter().any(|e| matches!(
        e,
        ProgressEvent::CollectionFinished { fetched, target_count: 6, .. } if *fetched == latin.fetched
    )));
    assert!(matches!(
        events.first(),
        Some(ProgressEvent::CollectionStarted { quota_per_term: 6, .. })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn page_of_ten_runs_at_most_four_fetches_at_once() {
    let scripted = Arc::new(
        ScriptedSource::new()
            .with_results("lofi", 10)
            .with_fetch_delay(Duration::from_millis(20)),
    );
    let source: Arc<dyn MediaSource> = scripted.clone();
    let dir = tempdir().unwrap();

    let report = Acquisition::new(source, dir.path(), settings(10, 4))
        .run(&[collection("chill", &["lofi"], 10)])
        .await;

    assert_eq!(report.total_fetched(), 10);
    assert_eq!(scripted.fetches.load(Ordering::SeqCst), 10);
    assert!(scripted.peak_in_flight.load(Ordering::SeqCst) <= 4);
}

#[tokio::test]
async fn single_query_fetches_up_to_limit() {
    let scripted = Arc::new(ScriptedSource::new().with_results("sea shanty", 8));
    let source: Arc<dyn MediaSource> = scripted.clone();
    let dir = tempdir().unwrap();
    let dest = dir.path().join("one-off");

    let paths = search_and_fetch(&source, "sea shanty", 3, &dest, &settings(50, 2))
        .await
        .unwrap();

    assert_eq!(paths.len(), 3);
    assert!(paths.iter().all(|p| p.starts_with(&dest) && p.exists()));
    assert_eq!(scripted.searches_for("sea shanty")[0].limit, 3);

    let none = search_and_fetch(&source, "unknown", 3, &dest, &settings(50, 2))
        .await
        .unwrap();
    assert!(none.is_empty());
}
