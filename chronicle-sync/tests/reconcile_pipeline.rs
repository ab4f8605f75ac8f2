//! End-to-end pipeline tests against in-memory collaborator doubles.
//!
//! Covers the checkpoint-advance policy, partial-failure isolation and
//! cooperative cancellation — the behaviors the doubles exist for.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use chronicle_core::types::{Document, DocumentId, FolderId};
use chronicle_sync::{
    run, CheckpointStore, DocumentStore, ItemOutcome, ItemStatus, ListQuery, Presenter,
    RewriteReason, StoreError, SyncError, SyncSummary,
};

// ---------------------------------------------------------------------------
// Doubles
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeStore {
    documents: Vec<Document>,
    /// Document ids whose update call should fail.
    failing_updates: Vec<DocumentId>,
    list_error: Option<String>,
    uploads: RefCell<HashMap<DocumentId, String>>,
    queries: RefCell<Vec<ListQuery>>,
}

impl DocumentStore for FakeStore {
    fn list(&self, query: &ListQuery) -> Result<Vec<Document>, StoreError> {
        self.queries.borrow_mut().push(query.clone());
        if let Some(msg) = &self.list_error {
            return Err(msg.clone().into());
        }
        let mut docs = self.documents.clone();
        docs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(docs)
    }

    fn update(&self, id: &DocumentId, content: &str) -> Result<(), StoreError> {
        if self.failing_updates.contains(id) {
            return Err(format!("remote rejected {id}").into());
        }
        self.uploads
            .borrow_mut()
            .insert(id.clone(), content.to_string());
        Ok(())
    }
}

struct FakeCheckpoint {
    value: Option<DateTime<Utc>>,
    fail_persist: bool,
    persist_calls: usize,
}

impl FakeCheckpoint {
    fn unset() -> Self {
        Self { value: None, fail_persist: false, persist_calls: 0 }
    }

    fn at(value: DateTime<Utc>) -> Self {
        Self { value: Some(value), fail_persist: false, persist_calls: 0 }
    }
}

impl CheckpointStore for FakeCheckpoint {
    fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        self.value
    }
    fn set_last_sync_time(&mut self, at: DateTime<Utc>) {
        self.value = Some(at);
    }
    fn persist(&mut self) -> Result<(), StoreError> {
        self.persist_calls += 1;
        if self.fail_persist {
            return Err("disk full".into());
        }
        Ok(())
    }
}

#[derive(Default)]
struct FakePresenter {
    items: Vec<ItemOutcome>,
    summaries: Vec<SyncSummary>,
    /// Cancel once this many items have been reported.
    cancel_after: Option<usize>,
}

impl Presenter for FakePresenter {
    fn on_item(&mut self, outcome: &ItemOutcome) {
        self.items.push(outcome.clone());
    }
    fn is_cancelled(&self) -> bool {
        match self.cancel_after {
            Some(n) => self.items.len() >= n,
            None => false,
        }
    }
    fn on_summary(&mut self, summary: &SyncSummary) {
        self.summaries.push(summary.clone());
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn folder() -> FolderId {
    let _ = env_logger::builder().is_test(true).try_init();
    FolderId::from("journal-folder")
}

fn doc(id: &str, name: &str, content: &str) -> Document {
    Document {
        id: DocumentId::from(id),
        name: name.to_string(),
        remote_created_at: Utc.with_ymd_and_hms(2024, 1, 15, 0, 30, 0).unwrap(),
        remote_modified_at: Utc.with_ymd_and_hms(2024, 1, 16, 1, 0, 0).unwrap(),
        content: content.to_string(),
    }
}

const COMPLIANT: &str =
    "---\ncreated: 2024-01-15T09:30:00+09:00\nupdated: 2024-01-16T10:00:00+09:00\n---\nbody";
const MALFORMED: &str = "---\n: invalid yaml\n---\n# C";

// ---------------------------------------------------------------------------
// Checkpoint policy
// ---------------------------------------------------------------------------

#[test]
fn clean_run_advances_checkpoint_strictly_forward() {
    let before = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let store = FakeStore {
        documents: vec![doc("1", "a.md", "# bare")],
        ..FakeStore::default()
    };
    let mut checkpoint = FakeCheckpoint::at(before);
    let mut presenter = FakePresenter::default();

    let report = run(&store, &mut checkpoint, &mut presenter, Some(&folder())).unwrap();

    assert!(report.checkpoint_advanced);
    assert_eq!(checkpoint.persist_calls, 1);
    assert!(checkpoint.value.unwrap() > before, "checkpoint must move strictly later");
    assert_eq!(store.uploads.borrow().len(), 1);
}

#[test]
fn any_failure_freezes_the_checkpoint() {
    let before = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let store = FakeStore {
        documents: vec![doc("1", "a.md", MALFORMED), doc("2", "b.md", "# bare")],
        ..FakeStore::default()
    };
    let mut checkpoint = FakeCheckpoint::at(before);
    let mut presenter = FakePresenter::default();

    let report = run(&store, &mut checkpoint, &mut presenter, Some(&folder())).unwrap();

    assert!(!report.checkpoint_advanced);
    assert_eq!(checkpoint.value, Some(before), "checkpoint must not move");
    assert_eq!(checkpoint.persist_calls, 0);
}

#[test]
fn unset_checkpoint_lists_without_time_filter() {
    let store = FakeStore::default();
    let mut checkpoint = FakeCheckpoint::unset();
    let mut presenter = FakePresenter::default();

    run(&store, &mut checkpoint, &mut presenter, Some(&folder())).unwrap();

    let queries = store.queries.borrow();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].modified_since, None);
    assert_eq!(queries[0].extensions, vec!["md".to_string()]);
    assert_eq!(queries[0].folder_id, folder());
    assert!(queries[0].with_content);
}

#[test]
fn stored_checkpoint_becomes_the_modified_since_filter() {
    let at = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
    let store = FakeStore::default();
    let mut checkpoint = FakeCheckpoint::at(at);
    let mut presenter = FakePresenter::default();

    run(&store, &mut checkpoint, &mut presenter, Some(&folder())).unwrap();

    assert_eq!(store.queries.borrow()[0].modified_since, Some(at));
}

#[test]
fn persist_failure_is_fatal_but_summary_was_rendered() {
    let store = FakeStore {
        documents: vec![doc("1", "a.md", COMPLIANT)],
        ..FakeStore::default()
    };
    let mut checkpoint = FakeCheckpoint::unset();
    checkpoint.fail_persist = true;
    let mut presenter = FakePresenter::default();

    let err = run(&store, &mut checkpoint, &mut presenter, Some(&folder())).unwrap_err();

    assert!(matches!(err, SyncError::Persist { .. }));
    assert_eq!(presenter.summaries.len(), 1, "user saw the results first");
    assert_eq!(presenter.items.len(), 1);
}

// ---------------------------------------------------------------------------
// Partial-failure isolation
// ---------------------------------------------------------------------------

#[test]
fn one_malformed_document_does_not_abort_the_other_nine() {
    let mut documents = vec![doc("bad", "e-bad.md", MALFORMED)];
    for i in 0..9 {
        documents.push(doc(&format!("ok{i}"), &format!("d{i}.md"), COMPLIANT));
    }
    let store = FakeStore { documents, ..FakeStore::default() };
    let mut checkpoint = FakeCheckpoint::unset();
    let mut presenter = FakePresenter::default();

    let report = run(&store, &mut checkpoint, &mut presenter, Some(&folder())).unwrap();

    assert_eq!(report.outcomes.len(), 10);
    let failed: Vec<_> = report
        .outcomes
        .iter()
        .filter(|o| matches!(o.status, ItemStatus::Failed { .. }))
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].name, "e-bad.md");
    assert_eq!(presenter.summaries[0].no_change_count, 9);
    assert!(!report.checkpoint_advanced);
}

#[test]
fn update_failure_is_scoped_to_its_document() {
    let store = FakeStore {
        documents: vec![doc("1", "a.md", "# bare"), doc("2", "b.md", "# also bare")],
        failing_updates: vec![DocumentId::from("1")],
        ..FakeStore::default()
    };
    let mut checkpoint = FakeCheckpoint::unset();
    let mut presenter = FakePresenter::default();

    let report = run(&store, &mut checkpoint, &mut presenter, Some(&folder())).unwrap();

    match &report.outcomes[0].status {
        ItemStatus::Failed { error } => assert!(error.contains("remote update failed")),
        other => panic!("expected failed, got {other:?}"),
    }
    assert!(matches!(
        report.outcomes[1].status,
        ItemStatus::Updated { reason: RewriteReason::MissingBlock }
    ));
    assert!(store.uploads.borrow().contains_key(&DocumentId::from("2")));
    assert!(!report.checkpoint_advanced);
}

#[test]
fn fetch_failure_aborts_with_nothing_processed() {
    let store = FakeStore {
        list_error: Some("503 backend unavailable".to_string()),
        ..FakeStore::default()
    };
    let mut checkpoint = FakeCheckpoint::unset();
    let mut presenter = FakePresenter::default();

    let err = run(&store, &mut checkpoint, &mut presenter, Some(&folder())).unwrap_err();

    assert!(matches!(err, SyncError::Fetch { .. }));
    assert!(presenter.items.is_empty());
    assert!(presenter.summaries.is_empty());
    assert!(checkpoint.value.is_none());
}

// ---------------------------------------------------------------------------
// Idempotence
// ---------------------------------------------------------------------------

#[test]
fn compliant_documents_produce_no_uploads() {
    let store = FakeStore {
        documents: vec![doc("1", "a.md", COMPLIANT), doc("2", "b.md", COMPLIANT)],
        ..FakeStore::default()
    };
    let mut checkpoint = FakeCheckpoint::unset();
    let mut presenter = FakePresenter::default();

    let report = run(&store, &mut checkpoint, &mut presenter, Some(&folder())).unwrap();

    assert!(report
        .outcomes
        .iter()
        .all(|o| o.status == ItemStatus::NoChange));
    assert!(store.uploads.borrow().is_empty());
    assert!(report.checkpoint_advanced, "a clean no-change pass still advances");
}

#[test]
fn uploaded_content_is_compliant_on_the_next_pass() {
    let store = FakeStore {
        documents: vec![doc("1", "a.md", "---\nupdated: now\ntags: [x]\n---\nbody")],
        ..FakeStore::default()
    };
    let mut checkpoint = FakeCheckpoint::unset();
    let mut presenter = FakePresenter::default();
    run(&store, &mut checkpoint, &mut presenter, Some(&folder())).unwrap();

    let uploaded = store.uploads.borrow()[&DocumentId::from("1")].clone();
    let second = FakeStore {
        documents: vec![doc("1", "a.md", &uploaded)],
        ..FakeStore::default()
    };
    let mut presenter2 = FakePresenter::default();
    let report = run(&second, &mut checkpoint, &mut presenter2, Some(&folder())).unwrap();

    assert_eq!(report.outcomes[0].status, ItemStatus::NoChange);
    assert!(second.uploads.borrow().is_empty());
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[test]
fn cancellation_stops_the_loop_and_keeps_partial_results() {
    let store = FakeStore {
        documents: vec![
            doc("1", "a.md", "# bare"),
            doc("2", "b.md", "# bare"),
            doc("3", "c.md", "# bare"),
        ],
        ..FakeStore::default()
    };
    let mut checkpoint = FakeCheckpoint::unset();
    let mut presenter = FakePresenter { cancel_after: Some(2), ..FakePresenter::default() };

    let report = run(&store, &mut checkpoint, &mut presenter, Some(&folder())).unwrap();

    assert!(report.cancelled);
    assert_eq!(report.outcomes.len(), 2, "third document never visited");
    assert_eq!(store.uploads.borrow().len(), 2);
    assert!(presenter.summaries[0].cancelled);
}

#[test]
fn cancelled_run_never_advances_checkpoint_even_without_failures() {
    let before = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let store = FakeStore {
        documents: vec![doc("1", "a.md", COMPLIANT), doc("2", "b.md", COMPLIANT)],
        ..FakeStore::default()
    };
    let mut checkpoint = FakeCheckpoint::at(before);
    let mut presenter = FakePresenter { cancel_after: Some(1), ..FakePresenter::default() };

    let report = run(&store, &mut checkpoint, &mut presenter, Some(&folder())).unwrap();

    assert!(report.cancelled);
    assert!(!report.checkpoint_advanced);
    assert_eq!(checkpoint.value, Some(before));
    assert_eq!(checkpoint.persist_calls, 0);
}

// ---------------------------------------------------------------------------
// Ordering and progress events
// ---------------------------------------------------------------------------

#[test]
fn documents_are_processed_in_name_order_with_one_event_each() {
    let store = FakeStore {
        documents: vec![
            doc("2", "b.md", COMPLIANT),
            doc("1", "a.md", COMPLIANT),
            doc("3", "c.md", COMPLIANT),
        ],
        ..FakeStore::default()
    };
    let mut checkpoint = FakeCheckpoint::unset();
    let mut presenter = FakePresenter::default();

    run(&store, &mut checkpoint, &mut presenter, Some(&folder())).unwrap();

    let names: Vec<_> = presenter.items.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["a.md", "b.md", "c.md"]);
}
