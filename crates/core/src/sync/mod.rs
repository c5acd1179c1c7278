//! Sheet to tracker reconciliation.
//!
//! [`plan`] decides what each row needs without touching the network;
//! [`SyncRunner`] reads the rows, issues the calls one at a time, and writes
//! the numbers of newly created tickets back in one batch.

pub mod plan;
mod runner;

pub use plan::{
    compose_body, plan_create, plan_update, priority_labels, resolve_assignee, PlannedUpdate,
    UpdateKind, UpdatePlan,
};
pub use runner::{SyncReport, SyncRunner};

use thiserror::Error;

use crate::sheet::SheetError;
use crate::tracker::TrackerError;

/// Errors that abort a reconciliation pass.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Spreadsheet error: {0}")]
    Sheet(#[from] SheetError),

    #[error("Issue tracker error: {0}")]
    Tracker(#[from] TrackerError),
}
