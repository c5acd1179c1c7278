pub mod config;
pub mod sheet;
pub mod sync;
pub mod testing;
pub mod tracker;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, GithubConfig, SanitizedConfig, SheetsConfig, SyncConfig,
};
pub use sheet::{
    parse_rows, GoogleSheetsClient, RawRow, RowRecord, RowSink, RowSource, SheetError,
    SheetsAuth, TicketNumberWrite,
};
pub use sync::{SyncError, SyncReport, SyncRunner};
pub use tracker::{
    GithubClient, NewTicket, Ticket, TicketClient, TicketState, TicketUpdate, TrackerError,
};
