//! Spreadsheet access.
//!
//! `RowSource` reads the raw rows of the configured tab (header included) and
//! `RowSink` writes newly created ticket numbers back in one batch. Both are
//! implemented for Google Sheets by [`GoogleSheetsClient`].

mod auth;
mod google;
mod types;

pub use auth::{ServiceAccountKey, SheetsAuth};
pub use google::GoogleSheetsClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when reading or writing the spreadsheet.
#[derive(Debug, Error)]
pub enum SheetError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service account key or token exchange problem.
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// Credentials rejected or missing access to the spreadsheet.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Spreadsheet or tab not found (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Source of spreadsheet rows.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Read every row of the data range, header first.
    async fn read_rows(&self) -> Result<Vec<RawRow>, SheetError>;
}

/// Destination for ticket-number write-backs.
#[async_trait]
pub trait RowSink: Send + Sync {
    /// Write all ticket numbers in a single request. No-op for an empty slice.
    async fn write_ticket_numbers(&self, writes: &[TicketNumberWrite]) -> Result<(), SheetError>;
}
