//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the spreadsheet and issue
//! tracker traits, allowing reconciliation passes to be tested without
//! network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use issuesync_core::testing::{fixtures, MockSheet, MockTicketClient};
//!
//! let sheet = MockSheet::new(vec![
//!     fixtures::header(),
//!     fixtures::raw_row(&["REQ-1", "Title", "Description"]),
//! ]);
//! let tickets = MockTicketClient::new();
//!
//! // Wire into a SyncRunner...
//! ```

mod mock_sheet;
mod mock_ticket_client;

pub use mock_sheet::MockSheet;
pub use mock_ticket_client::{MockTicketClient, RecordedTicketCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::sheet::RawRow;
    use crate::tracker::{NewTicket, Ticket, TicketState};

    /// The header row of the A:G layout.
    pub fn header() -> RawRow {
        raw_row(&[
            "ID",
            "Title",
            "Description",
            "Priority",
            "Status",
            "Issue Number",
            "Assignee",
        ])
    }

    /// Build a raw row from cell strings.
    pub fn raw_row(cells: &[&str]) -> RawRow {
        cells.iter().map(|c| c.to_string()).collect()
    }

    /// An open, unassigned ticket.
    pub fn ticket(number: u64, title: &str, body: &str) -> Ticket {
        Ticket {
            number,
            title: title.to_string(),
            body: body.to_string(),
            state: TicketState::Open,
            assignees: Vec::new(),
        }
    }

    /// A create request with no labels or assignees.
    pub fn new_ticket(title: &str) -> NewTicket {
        NewTicket {
            title: title.to_string(),
            body: String::new(),
            labels: Vec::new(),
            assignees: Vec::new(),
        }
    }
}
