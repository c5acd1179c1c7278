//! Reconciliation pass integration tests.
//!
//! These tests drive a full pass through `SyncRunner` with the mock sheet and
//! mock ticket client:
//! - Create path and write-back row numbering
//! - Update path change detection (state, content, assignees)
//! - Fail-fast behaviour
//! - Idempotence of a second pass

use std::sync::Arc;

use tokio_test::{assert_err, assert_ok};

use issuesync_core::{
    sheet::{RawRow, SheetError, TicketNumberWrite},
    sync::compose_body,
    testing::{fixtures, MockSheet, MockTicketClient, RecordedTicketCall},
    tracker::{TicketState, TicketUpdate, TrackerError},
    SyncError, SyncReport, SyncRunner,
};

/// Test helper wiring a runner to mocks.
struct TestHarness {
    sheet: MockSheet,
    tickets: MockTicketClient,
    default_assignee: Option<String>,
}

impl TestHarness {
    fn new(data_rows: Vec<RawRow>) -> Self {
        let mut rows = vec![fixtures::header()];
        rows.extend(data_rows);
        Self {
            sheet: MockSheet::new(rows),
            tickets: MockTicketClient::new(),
            default_assignee: None,
        }
    }

    fn with_default_assignee(mut self, assignee: &str) -> Self {
        self.default_assignee = Some(assignee.to_string());
        self
    }

    fn runner(&self) -> SyncRunner {
        SyncRunner::new(
            Arc::new(self.sheet.clone()),
            Arc::new(self.tickets.clone()),
            Arc::new(self.sheet.clone()),
        )
        .with_default_assignee(self.default_assignee.clone())
    }

    async fn run(&self) -> Result<SyncReport, SyncError> {
        self.runner().run().await
    }
}

fn row(cells: &[&str]) -> RawRow {
    fixtures::raw_row(cells)
}

#[tokio::test]
async fn test_empty_sheet_is_noop() {
    let harness = TestHarness {
        sheet: MockSheet::new(vec![]),
        tickets: MockTicketClient::new(),
        default_assignee: None,
    };

    let report = assert_ok!(harness.run().await);

    assert_eq!(report, SyncReport::default());
    assert!(harness.tickets.recorded_calls().await.is_empty());
    assert!(harness.sheet.write_batches().await.is_empty());
}

#[tokio::test]
async fn test_header_only_sheet_is_noop() {
    let harness = TestHarness::new(vec![]);

    let report = assert_ok!(harness.run().await);

    assert_eq!(report.rows, 0);
    assert!(harness.tickets.recorded_calls().await.is_empty());
    assert!(harness.sheet.write_batches().await.is_empty());
}

#[tokio::test]
async fn test_rows_without_ticket_numbers_are_created_and_written_back() {
    let harness = TestHarness::new(vec![
        row(&["REQ-1", "First", "One", "High"]),
        row(&["REQ-2", "Second", "Two", "", "", "", "bob"]),
        row(&["REQ-3", "Third", "Three"]),
    ]);
    harness.tickets.set_next_number(100).await;

    let report = assert_ok!(harness.run().await);

    let creates = harness.tickets.create_calls().await;
    assert_eq!(creates.len(), 3);
    assert_eq!(creates[0].title, "First");
    assert_eq!(creates[0].body, "ID: REQ-1\nPriority: High\n\nOne");
    assert_eq!(creates[0].labels, vec!["priority:high"]);
    assert!(creates[0].assignees.is_empty());
    assert!(creates[1].labels.is_empty());
    assert_eq!(creates[1].assignees, vec!["bob"]);

    let batches = harness.sheet.write_batches().await;
    assert_eq!(batches.len(), 1, "write-back is a single batch");
    assert_eq!(
        batches[0],
        vec![
            TicketNumberWrite {
                row_index: 0,
                ticket_number: 100,
            },
            TicketNumberWrite {
                row_index: 1,
                ticket_number: 101,
            },
            TicketNumberWrite {
                row_index: 2,
                ticket_number: 102,
            },
        ]
    );
    assert_eq!(
        batches[0].iter().map(|w| w.sheet_row()).collect::<Vec<_>>(),
        vec![2, 3, 4]
    );
    assert_eq!(report.created, batches[0]);

    let rows = harness.sheet.rows().await;
    assert_eq!(rows[1][5], "100");
    assert_eq!(rows[3][5], "102");
}

#[tokio::test]
async fn test_default_assignee_applies_to_created_tickets() {
    let harness = TestHarness::new(vec![
        row(&["REQ-1", "First", "One"]),
        row(&["REQ-2", "Second", "Two", "", "", "", "alice"]),
    ])
    .with_default_assignee("octocat");

    assert_ok!(harness.run().await);

    let creates = harness.tickets.create_calls().await;
    assert_eq!(creates[0].assignees, vec!["octocat"]);
    assert_eq!(creates[1].assignees, vec!["alice"]);
}

#[tokio::test]
async fn test_rows_with_ticket_numbers_never_create() {
    let harness = TestHarness::new(vec![row(&["REQ-1", "Title", "Desc", "", "Open", "7"])]);
    harness
        .tickets
        .add_ticket(fixtures::ticket(7, "Title", &compose_body("REQ-1", "", "Desc")))
        .await;

    let report = assert_ok!(harness.run().await);

    assert!(harness.tickets.create_calls().await.is_empty());
    assert!(harness.tickets.update_calls().await.is_empty());
    assert_eq!(
        harness.tickets.recorded_calls().await,
        vec![RecordedTicketCall::Get(7)]
    );
    assert!(harness.sheet.write_batches().await.is_empty());
    assert_eq!(report.total_updates(), 0);
}

#[tokio::test]
async fn test_decimal_formatted_ticket_number_is_reused() {
    let harness = TestHarness::new(vec![row(&["REQ-1", "Title", "Desc", "", "Open", "42.0"])]);
    harness
        .tickets
        .add_ticket(fixtures::ticket(42, "Title", &compose_body("REQ-1", "", "Desc")))
        .await;

    let report = assert_ok!(harness.run().await);

    assert!(harness.tickets.create_calls().await.is_empty());
    assert_eq!(
        harness.tickets.recorded_calls().await,
        vec![RecordedTicketCall::Get(42)]
    );
    assert!(report.created.is_empty());
    assert!(harness.sheet.write_batches().await.is_empty());
    assert_eq!(harness.sheet.rows().await[1][5], "42.0");
}

#[tokio::test]
async fn test_closed_status_closes_open_ticket_once() {
    let harness = TestHarness::new(vec![row(&["REQ-1", "Title", "Desc", "", "Closed", "7"])]);
    harness
        .tickets
        .add_ticket(fixtures::ticket(7, "Title", "ID: REQ-1\n\nDesc"))
        .await;

    let report = assert_ok!(harness.run().await);

    assert_eq!(
        harness.tickets.update_calls().await,
        vec![(7, TicketUpdate::state(TicketState::Closed))]
    );
    assert_eq!(report.state_updates, 1);
    assert_eq!(report.content_updates, 0);
}

#[tokio::test]
async fn test_row_assignee_added_to_unassigned_ticket() {
    let harness = TestHarness::new(vec![row(&[
        "REQ-1", "Title", "Desc", "", "open", "7", "alice",
    ])]);
    harness
        .tickets
        .add_ticket(fixtures::ticket(7, "Title", "Desc"))
        .await;

    let report = assert_ok!(harness.run().await);

    assert_eq!(
        harness.tickets.update_calls().await,
        vec![(7, TicketUpdate::assignees(vec!["alice".to_string()]))]
    );
    assert_eq!(report.assignee_updates, 1);
}

#[tokio::test]
async fn test_all_three_updates_issued_in_order() {
    let harness = TestHarness::new(vec![row(&[
        "REQ-1", "New title", "New desc", "Low", "closed", "7", "alice",
    ])]);
    let mut ticket = fixtures::ticket(7, "Old title", "Old desc");
    ticket.assignees = vec!["bob".to_string()];
    harness.tickets.add_ticket(ticket).await;

    let report = assert_ok!(harness.run().await);

    let updates = harness.tickets.update_calls().await;
    assert_eq!(
        updates,
        vec![
            (7, TicketUpdate::state(TicketState::Closed)),
            (
                7,
                TicketUpdate::content("New title", "ID: REQ-1\nPriority: Low\n\nNew desc")
            ),
            (7, TicketUpdate::assignees(vec!["alice".to_string()])),
        ]
    );
    assert_eq!(report.total_updates(), 3);
}

/// Two data rows: one new, one pointing at an open ticket that the sheet marks closed.
#[tokio::test]
async fn test_end_to_end_create_and_close() {
    let harness = TestHarness::new(vec![
        row(&["REQ-1", "New work", "Needs a ticket", "Medium", "Open", ""]),
        row(&["REQ-2", "Old work", "Already tracked", "", "Closed", "42"]),
    ]);
    harness.tickets.set_next_number(43).await;
    harness
        .tickets
        .add_ticket(fixtures::ticket(
            42,
            "Old work",
            &compose_body("REQ-2", "", "Already tracked"),
        ))
        .await;

    let report = assert_ok!(harness.run().await);

    assert_eq!(
        harness.tickets.recorded_calls().await,
        vec![
            RecordedTicketCall::Create(harness.tickets.create_calls().await[0].clone()),
            RecordedTicketCall::Get(42),
            RecordedTicketCall::Update {
                number: 42,
                update: TicketUpdate::state(TicketState::Closed),
            },
        ]
    );
    assert_eq!(harness.tickets.create_calls().await.len(), 1);

    let batches = harness.sheet.write_batches().await;
    assert_eq!(
        batches,
        vec![vec![TicketNumberWrite {
            row_index: 0,
            ticket_number: 43,
        }]]
    );
    assert_eq!(batches[0][0].sheet_row(), 2);
    assert_eq!(report.state_updates, 1);
}

#[tokio::test]
async fn test_second_pass_is_idempotent() {
    let harness = TestHarness::new(vec![
        row(&["REQ-1", "First", "One", "High", "Open", "", "alice"]),
        row(&["REQ-2", "Second", "Two", "", "Closed"]),
    ]);

    assert_ok!(harness.run().await);
    // The second row was created open but the sheet says closed.
    harness.tickets.clear_recorded().await;

    let report = assert_ok!(harness.run().await);
    assert!(harness.tickets.create_calls().await.is_empty());
    assert_eq!(
        harness.tickets.update_calls().await,
        vec![(2, TicketUpdate::state(TicketState::Closed))]
    );
    assert!(report.created.is_empty());

    harness.tickets.clear_recorded().await;
    let report = assert_ok!(harness.run().await);
    assert!(harness.tickets.update_calls().await.is_empty());
    assert_eq!(report.total_updates(), 0);
    assert_eq!(harness.sheet.write_batches().await.len(), 1);
}

#[tokio::test]
async fn test_failed_update_stops_the_pass() {
    let harness = TestHarness::new(vec![
        row(&["REQ-1", "Title", "Desc", "", "Closed", "7", "alice"]),
        row(&["REQ-2", "Later", "Never reached"]),
    ]);
    harness
        .tickets
        .add_ticket(fixtures::ticket(7, "Other title", "Desc"))
        .await;
    harness.tickets.fail_updates_for(7).await;

    let err = assert_err!(harness.run().await);
    assert!(matches!(err, SyncError::Tracker(TrackerError::Api { status: 500, .. })));

    // Only the state update was attempted; content, assignees and row 2 never ran.
    assert_eq!(harness.tickets.update_calls().await.len(), 1);
    assert!(harness.tickets.create_calls().await.is_empty());
    assert!(harness.sheet.write_batches().await.is_empty());
}

#[tokio::test]
async fn test_failed_create_skips_write_back() {
    let harness = TestHarness::new(vec![
        row(&["REQ-1", "First", "One"]),
        row(&["REQ-2", "Second", "Two"]),
    ]);
    harness.tickets.set_next_error(TrackerError::RateLimited).await;

    let err = assert_err!(harness.run().await);

    assert!(matches!(err, SyncError::Tracker(TrackerError::RateLimited)));
    assert_eq!(harness.tickets.create_calls().await.len(), 1);
    assert!(harness.sheet.write_batches().await.is_empty());
}

#[tokio::test]
async fn test_read_error_aborts_before_any_tracker_call() {
    let harness = TestHarness::new(vec![row(&["REQ-1", "First", "One"])]);
    harness
        .sheet
        .set_next_read_error(SheetError::Unauthorized("denied".to_string()))
        .await;

    let err = assert_err!(harness.run().await);
    assert!(matches!(err, SyncError::Sheet(SheetError::Unauthorized(_))));
    assert!(harness.tickets.recorded_calls().await.is_empty());
}

#[tokio::test]
async fn test_write_back_error_is_reported() {
    let harness = TestHarness::new(vec![row(&["REQ-1", "First", "One"])]);
    harness
        .sheet
        .set_next_write_error(SheetError::Api {
            status: 500,
            message: "backend".to_string(),
        })
        .await;

    let err = assert_err!(harness.run().await);
    assert!(matches!(err, SyncError::Sheet(SheetError::Api { status: 500, .. })));
    assert_eq!(harness.tickets.create_calls().await.len(), 1);
}
