use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use issuesync_core::{
    load_config, load_config_from_env, validate_config, Config, GithubClient,
    GoogleSheetsClient, RowSink, RowSource, SanitizedConfig, SyncRunner, TicketClient,
};

/// Default configuration file, looked up in the working directory.
const DEFAULT_CONFIG_FILE: &str = "issuesync.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load()?;
    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = SanitizedConfig::from(&config);
    info!(
        "Configuration loaded: {}",
        serde_json::to_string(&sanitized).unwrap_or_default()
    );

    let sheet = Arc::new(
        GoogleSheetsClient::new(&config.sheets).context("Failed to create Sheets client")?,
    );
    let tickets: Arc<dyn TicketClient> = Arc::new(
        GithubClient::new(&config.github).context("Failed to create GitHub client")?,
    );
    info!(
        "Syncing {}/{} from spreadsheet {} ({})",
        config.github.owner,
        config.github.repo,
        config.sheets.spreadsheet_id,
        config.sheets.sheet_name
    );

    let source: Arc<dyn RowSource> = sheet.clone();
    let sink: Arc<dyn RowSink> = sheet;
    let report = SyncRunner::new(source, tickets, sink)
        .with_default_assignee(config.sync.default_assignee().map(str::to_string))
        .run()
        .await
        .context("Sync failed")?;

    info!(
        "Sync process completed successfully ({} rows, {} created, {} updates)",
        report.rows,
        report.created.len(),
        report.total_updates()
    );
    Ok(())
}

/// Load configuration from the config file if there is one, else from the environment.
fn load() -> Result<Config> {
    let explicit = std::env::var("ISSUESYNC_CONFIG").ok().map(PathBuf::from);
    let config_path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if explicit.is_some() || config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))
    } else {
        info!("No {} found, loading configuration from environment", DEFAULT_CONFIG_FILE);
        load_config_from_env().context("Failed to load config from environment")
    }
}
