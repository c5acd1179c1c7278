use serde::{Deserialize, Serialize};

/// One row as returned by the spreadsheet: cell strings, trailing blanks may be missing.
pub type RawRow = Vec<String>;

/// Column letter of the ticket-number column.
pub const TICKET_NUMBER_COLUMN: &str = "F";

/// Columns read from the tab (id through assignee).
pub const DATA_COLUMNS: &str = "A:G";

const COL_ID: usize = 0;
const COL_TITLE: usize = 1;
const COL_DESCRIPTION: usize = 2;
const COL_PRIORITY: usize = 3;
const COL_STATUS: usize = 4;
const COL_TICKET_NUMBER: usize = 5;
const COL_ASSIGNEE: usize = 6;

const DEFAULT_STATUS: &str = "Open";

/// One parsed data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Empty when the cell is empty.
    pub priority: String,
    /// "Open" when the cell is empty.
    pub status: String,
    /// `None` when the row has never been synced.
    pub ticket_number: Option<u64>,
    /// Trimmed; `None` when blank.
    pub assignee: Option<String>,
}

impl RowRecord {
    /// Build a record from raw cells. Missing cells read as empty.
    pub fn from_cells(cells: &[String]) -> Self {
        let cell = |i: usize| cells.get(i).map(String::as_str).unwrap_or("");

        let status = match cell(COL_STATUS) {
            "" => DEFAULT_STATUS.to_string(),
            s => s.to_string(),
        };
        let assignee = Some(cell(COL_ASSIGNEE).trim())
            .filter(|a| !a.is_empty())
            .map(str::to_string);

        Self {
            id: cell(COL_ID).to_string(),
            title: cell(COL_TITLE).to_string(),
            description: cell(COL_DESCRIPTION).to_string(),
            priority: cell(COL_PRIORITY).to_string(),
            status,
            ticket_number: parse_ticket_number(cell(COL_TICKET_NUMBER)),
            assignee,
        }
    }
}

/// Parse a ticket-number cell from its leading digits, so "42.0" and "42 (old)" read as 42.
/// Blank cells, cells without leading digits, and zero mean "not synced".
pub fn parse_ticket_number(cell: &str) -> Option<u64> {
    let cell = cell.trim();
    let end = cell
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(cell.len());
    cell[..end].parse::<u64>().ok().filter(|n| *n > 0)
}

/// Drop the header row and parse the remaining rows in order.
pub fn parse_rows(rows: &[RawRow]) -> Vec<RowRecord> {
    rows.iter()
        .skip(1)
        .map(|cells| RowRecord::from_cells(cells))
        .collect()
}

/// A ticket number waiting to be written back to the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketNumberWrite {
    /// Zero-based index into the rows after the header.
    pub row_index: usize,
    pub ticket_number: u64,
}

impl TicketNumberWrite {
    /// One-based sheet row: one for the header, one for 1-based numbering.
    pub fn sheet_row(&self) -> usize {
        self.row_index + 2
    }
}

/// Quote a tab name for A1 notation when it needs it.
pub fn quote_sheet_name(name: &str) -> String {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

/// A1 range covering the data columns of a tab.
pub fn data_range(sheet_name: &str) -> String {
    format!("{}!{}", quote_sheet_name(sheet_name), DATA_COLUMNS)
}

/// A1 reference of the ticket-number cell for a write.
pub fn ticket_number_cell(sheet_name: &str, write: &TicketNumberWrite) -> String {
    format!(
        "{}!{}{}",
        quote_sheet_name(sheet_name),
        TICKET_NUMBER_COLUMN,
        write.sheet_row()
    )
}
