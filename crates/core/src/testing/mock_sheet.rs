//! Mock spreadsheet for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::sheet::{RawRow, RowSink, RowSource, SheetError, TicketNumberWrite};

const TICKET_NUMBER_INDEX: usize = 5;

/// Mock implementation of RowSource and RowSink over in-memory rows.
///
/// Write-backs are recorded per batch and also applied to the rows, so a
/// second pass reads the ticket numbers the first one created.
#[derive(Debug, Clone)]
pub struct MockSheet {
    /// Rows including the header.
    rows: Arc<RwLock<Vec<RawRow>>>,
    /// Recorded write-back batches.
    batches: Arc<RwLock<Vec<Vec<TicketNumberWrite>>>>,
    /// Number of reads performed.
    reads: Arc<RwLock<usize>>,
    /// If set, the next read will fail with this error.
    next_read_error: Arc<RwLock<Option<SheetError>>>,
    /// If set, the next write will fail with this error.
    next_write_error: Arc<RwLock<Option<SheetError>>>,
}

impl Default for MockSheet {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl MockSheet {
    /// Create a mock sheet holding `rows` (header first).
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows)),
            batches: Arc::new(RwLock::new(Vec::new())),
            reads: Arc::new(RwLock::new(0)),
            next_read_error: Arc::new(RwLock::new(None)),
            next_write_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Current rows, header included.
    pub async fn rows(&self) -> Vec<RawRow> {
        self.rows.read().await.clone()
    }

    /// Recorded write-back batches.
    pub async fn write_batches(&self) -> Vec<Vec<TicketNumberWrite>> {
        self.batches.read().await.clone()
    }

    /// Number of reads performed.
    pub async fn read_count(&self) -> usize {
        *self.reads.read().await
    }

    /// Configure the next read to fail with the given error.
    pub async fn set_next_read_error(&self, error: SheetError) {
        *self.next_read_error.write().await = Some(error);
    }

    /// Configure the next write to fail with the given error.
    pub async fn set_next_write_error(&self, error: SheetError) {
        *self.next_write_error.write().await = Some(error);
    }
}

#[async_trait]
impl RowSource for MockSheet {
    async fn read_rows(&self) -> Result<Vec<RawRow>, SheetError> {
        *self.reads.write().await += 1;
        if let Some(error) = self.next_read_error.write().await.take() {
            return Err(error);
        }
        Ok(self.rows.read().await.clone())
    }
}

#[async_trait]
impl RowSink for MockSheet {
    async fn write_ticket_numbers(&self, writes: &[TicketNumberWrite]) -> Result<(), SheetError> {
        if let Some(error) = self.next_write_error.write().await.take() {
            return Err(error);
        }
        if writes.is_empty() {
            return Ok(());
        }

        let mut rows = self.rows.write().await;
        for write in writes {
            let index = write.sheet_row() - 1;
            if rows.len() <= index {
                rows.resize(index + 1, Vec::new());
            }
            let row = &mut rows[index];
            if row.len() <= TICKET_NUMBER_INDEX {
                row.resize(TICKET_NUMBER_INDEX + 1, String::new());
            }
            row[TICKET_NUMBER_INDEX] = write.ticket_number.to_string();
        }

        self.batches.write().await.push(writes.to_vec());
        Ok(())
    }
}
