//! Issue tracker abstraction.
//!
//! This module provides a `TicketClient` trait for the three calls the
//! reconciler needs (create, get, partial update) and a GitHub Issues
//! implementation.

mod github;
mod types;

pub use github::GithubClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the issue tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Token rejected or lacks permission.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Ticket or repository not found (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Trait for issue tracker backends.
#[async_trait]
pub trait TicketClient: Send + Sync {
    /// Create a ticket and return the number the tracker assigned to it.
    async fn create(&self, ticket: NewTicket) -> Result<u64, TrackerError>;

    /// Fetch a ticket by number.
    async fn get(&self, number: u64) -> Result<Ticket, TrackerError>;

    /// Apply the fields present in `update` to a ticket.
    async fn update(&self, number: u64, update: TicketUpdate) -> Result<(), TrackerError>;
}
