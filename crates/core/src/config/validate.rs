use super::{types::Config, ConfigError};

fn require(value: &str, name: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{} cannot be empty",
            name
        )));
    }
    Ok(())
}

/// Validate configuration
/// Currently validates:
/// - Spreadsheet id and tab name are set
/// - At least one Sheets credential source is set
/// - GitHub token, owner and repo are set
/// - Timeouts are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let sheets = &config.sheets;
    require(&sheets.spreadsheet_id, "sheets.spreadsheet_id")?;
    require(&sheets.sheet_name, "sheets.sheet_name")?;

    let has_token = sheets
        .access_token
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty());
    let has_json = sheets
        .credentials_json
        .as_deref()
        .is_some_and(|j| !j.trim().is_empty());
    if !has_token && !has_json && sheets.credentials_path.is_none() {
        return Err(ConfigError::ValidationError(
            "one of sheets.access_token, sheets.credentials_json or sheets.credentials_path must be set"
                .to_string(),
        ));
    }

    if sheets.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "sheets.timeout_secs cannot be 0".to_string(),
        ));
    }

    let github = &config.github;
    require(&github.token, "github.token")?;
    require(&github.owner, "github.owner")?;
    require(&github.repo, "github.repo")?;

    if github.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "github.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
