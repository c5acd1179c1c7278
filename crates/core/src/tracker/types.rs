use serde::{Deserialize, Serialize};
use std::fmt;

/// Open/closed state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketState {
    Open,
    Closed,
}

impl TicketState {
    /// Map a sheet status cell to a ticket state.
    ///
    /// Only "closed" (any case) is closed; every other value is open.
    pub fn from_status(status: &str) -> Self {
        if status.to_lowercase() == "closed" {
            TicketState::Closed
        } else {
            TicketState::Open
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketState::Open => "open",
            TicketState::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ticket as currently observed on the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub number: u64,
    pub title: String,
    /// Body text; empty when the tracker has none.
    pub body: String,
    pub state: TicketState,
    /// Assignee logins, in tracker order.
    pub assignees: Vec<String>,
}

/// Request to create a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTicket {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
}

/// Partial ticket update. Only the `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TicketUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<TicketState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
}

impl TicketUpdate {
    pub fn state(state: TicketState) -> Self {
        Self {
            state: Some(state),
            ..Default::default()
        }
    }

    pub fn content(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
            ..Default::default()
        }
    }

    pub fn assignees(assignees: Vec<String>) -> Self {
        Self {
            assignees: Some(assignees),
            ..Default::default()
        }
    }
}
