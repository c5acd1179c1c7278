//! One reconciliation pass over the sheet.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::sheet::{parse_rows, RowRecord, RowSink, RowSource, TicketNumberWrite};
use crate::tracker::{TicketClient, TicketUpdate};

use super::plan::{plan_create, plan_update, UpdateKind};
use super::SyncError;

/// What a pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Data rows read (header excluded).
    pub rows: usize,
    /// Tickets created, with the row each one was written back to.
    pub created: Vec<TicketNumberWrite>,
    pub state_updates: usize,
    pub content_updates: usize,
    pub assignee_updates: usize,
}

impl SyncReport {
    pub fn total_updates(&self) -> usize {
        self.state_updates + self.content_updates + self.assignee_updates
    }

    fn record_update(&mut self, kind: UpdateKind) {
        match kind {
            UpdateKind::State => self.state_updates += 1,
            UpdateKind::Content => self.content_updates += 1,
            UpdateKind::Assignees => self.assignee_updates += 1,
        }
    }
}

/// Runs a reconciliation pass: read rows, reconcile each one in order, write back.
///
/// Every remote call is awaited before the next one starts. The first error
/// ends the pass; mutations already made stay made.
pub struct SyncRunner {
    source: Arc<dyn RowSource>,
    tickets: Arc<dyn TicketClient>,
    sink: Arc<dyn RowSink>,
    default_assignee: Option<String>,
}

impl SyncRunner {
    pub fn new(
        source: Arc<dyn RowSource>,
        tickets: Arc<dyn TicketClient>,
        sink: Arc<dyn RowSink>,
    ) -> Self {
        Self {
            source,
            tickets,
            sink,
            default_assignee: None,
        }
    }

    /// Assignee for rows that leave the assignee column blank.
    pub fn with_default_assignee(mut self, assignee: Option<String>) -> Self {
        self.default_assignee = assignee.filter(|a| !a.trim().is_empty());
        self
    }

    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let raw_rows = self.source.read_rows().await?;
        if raw_rows.is_empty() {
            info!("No data found in the sheet");
            return Ok(SyncReport::default());
        }

        let rows = parse_rows(&raw_rows);
        let mut report = SyncReport {
            rows: rows.len(),
            ..Default::default()
        };
        let mut pending: Vec<TicketNumberWrite> = Vec::new();

        for (row_index, row) in rows.iter().enumerate() {
            match row.ticket_number {
                None => {
                    let ticket_number = self.create_ticket(row).await?;
                    pending.push(TicketNumberWrite {
                        row_index,
                        ticket_number,
                    });
                }
                Some(number) => self.update_ticket(row, number, &mut report).await?,
            }
        }

        if !pending.is_empty() {
            self.sink.write_ticket_numbers(&pending).await?;
        }
        report.created = pending;

        info!(
            rows = report.rows,
            created = report.created.len(),
            updates = report.total_updates(),
            "Sync pass completed"
        );
        Ok(report)
    }

    async fn create_ticket(&self, row: &RowRecord) -> Result<u64, SyncError> {
        let new_ticket = plan_create(row, self.default_assignee.as_deref());
        let assigned = display_assignees(&new_ticket.assignees);
        let title = new_ticket.title.clone();

        let number = self.tickets.create(new_ticket).await?;
        info!(
            "Created new ticket #{} - {} (assigned to: {})",
            number, title, assigned
        );
        Ok(number)
    }

    async fn update_ticket(
        &self,
        row: &RowRecord,
        number: u64,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let ticket = self.tickets.get(number).await?;
        let plan = plan_update(row, &ticket, self.default_assignee.as_deref());
        if plan.is_empty() {
            debug!(number, "Ticket already in sync");
            return Ok(());
        }

        for planned in plan.updates {
            let summary = describe_update(&planned.update);
            self.tickets.update(number, planned.update).await?;
            report.record_update(planned.kind);
            info!("Updated ticket #{} {}", number, summary);
        }
        Ok(())
    }
}

fn display_assignees(assignees: &[String]) -> String {
    if assignees.is_empty() {
        "none".to_string()
    } else {
        assignees.join(", ")
    }
}

fn describe_update(update: &TicketUpdate) -> String {
    if let Some(state) = update.state {
        format!("state to {}", state)
    } else if let Some(assignees) = &update.assignees {
        format!("assignee to: {}", display_assignees(assignees))
    } else {
        "content".to_string()
    }
}
