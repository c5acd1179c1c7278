//! Mock ticket client for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::tracker::{NewTicket, Ticket, TicketClient, TicketState, TicketUpdate, TrackerError};

/// A recorded tracker call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedTicketCall {
    Create(NewTicket),
    Get(u64),
    Update {
        number: u64,
        update: TicketUpdate,
    },
}

/// Mock implementation of the TicketClient trait.
///
/// Provides controllable behavior for testing:
/// - Serve tickets from an in-memory map (updates are applied to it)
/// - Hand out sequential numbers on create
/// - Track calls for assertions
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// use issuesync_core::testing::{MockTicketClient, fixtures};
///
/// let tickets = MockTicketClient::new();
/// tickets.add_ticket(fixtures::ticket(42, "Title", "Body")).await;
///
/// let ticket = tickets.get(42).await?;
/// assert_eq!(tickets.update_calls().await.len(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockTicketClient {
    /// Tickets by number.
    tickets: Arc<RwLock<HashMap<u64, Ticket>>>,
    /// Number handed out by the next create.
    next_number: Arc<RwLock<u64>>,
    /// Recorded calls, in order.
    calls: Arc<RwLock<Vec<RecordedTicketCall>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<TrackerError>>>,
    /// Ticket numbers whose updates fail.
    failing_updates: Arc<RwLock<HashSet<u64>>>,
}

impl Default for MockTicketClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTicketClient {
    /// Create a new mock with no tickets; creates start at #1.
    pub fn new() -> Self {
        Self {
            tickets: Arc::new(RwLock::new(HashMap::new())),
            next_number: Arc::new(RwLock::new(1)),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            failing_updates: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    // =========================================================================
    // Ticket Configuration
    // =========================================================================

    /// Add or replace a ticket.
    pub async fn add_ticket(&self, ticket: Ticket) {
        self.tickets.write().await.insert(ticket.number, ticket);
    }

    /// Set the number the next create returns.
    pub async fn set_next_number(&self, number: u64) {
        *self.next_number.write().await = number;
    }

    /// Current state of a ticket.
    pub async fn ticket(&self, number: u64) -> Option<Ticket> {
        self.tickets.read().await.get(&number).cloned()
    }

    // =========================================================================
    // Call Recording
    // =========================================================================

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedTicketCall> {
        self.calls.read().await.clone()
    }

    /// Recorded create requests.
    pub async fn create_calls(&self) -> Vec<NewTicket> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                RecordedTicketCall::Create(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    /// Recorded updates as (number, update) pairs.
    pub async fn update_calls(&self) -> Vec<(u64, TicketUpdate)> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                RecordedTicketCall::Update { number, update } => Some((*number, update.clone())),
                _ => None,
            })
            .collect()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: TrackerError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every update of the given ticket fail.
    pub async fn fail_updates_for(&self, number: u64) {
        self.failing_updates.write().await.insert(number);
    }

    async fn take_error(&self) -> Option<TrackerError> {
        self.next_error.write().await.take()
    }

    async fn record(&self, call: RecordedTicketCall) {
        self.calls.write().await.push(call);
    }
}

#[async_trait]
impl TicketClient for MockTicketClient {
    async fn create(&self, ticket: NewTicket) -> Result<u64, TrackerError> {
        self.record(RecordedTicketCall::Create(ticket.clone())).await;
        if let Some(error) = self.take_error().await {
            return Err(error);
        }

        let number = {
            let mut next = self.next_number.write().await;
            let number = *next;
            *next += 1;
            number
        };

        self.tickets.write().await.insert(
            number,
            Ticket {
                number,
                title: ticket.title,
                body: ticket.body,
                state: TicketState::Open,
                assignees: ticket.assignees,
            },
        );
        Ok(number)
    }

    async fn get(&self, number: u64) -> Result<Ticket, TrackerError> {
        self.record(RecordedTicketCall::Get(number)).await;
        if let Some(error) = self.take_error().await {
            return Err(error);
        }

        self.tickets
            .read()
            .await
            .get(&number)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(format!("issue #{}", number)))
    }

    async fn update(&self, number: u64, update: TicketUpdate) -> Result<(), TrackerError> {
        self.record(RecordedTicketCall::Update {
            number,
            update: update.clone(),
        })
        .await;
        if let Some(error) = self.take_error().await {
            return Err(error);
        }
        if self.failing_updates.read().await.contains(&number) {
            return Err(TrackerError::Api {
                status: 500,
                message: format!("simulated failure updating #{}", number),
            });
        }

        let mut tickets = self.tickets.write().await;
        let ticket = tickets
            .get_mut(&number)
            .ok_or_else(|| TrackerError::NotFound(format!("issue #{}", number)))?;

        if let Some(title) = update.title {
            ticket.title = title;
        }
        if let Some(body) = update.body {
            ticket.body = body;
        }
        if let Some(state) = update.state {
            ticket.state = state;
        }
        if let Some(assignees) = update.assignees {
            ticket.assignees = assignees;
        }
        Ok(())
    }
}
