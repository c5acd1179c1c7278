use figment::{
    providers::{Env, Format, Toml},
    value::{Uncased, UncasedStr},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for nested environment overrides, e.g. `ISSUESYNC_GITHUB__TOKEN`.
pub const ENV_PREFIX: &str = "ISSUESYNC_";

/// Flat environment variables understood for compatibility with older deployments.
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("GSHEET_ID", "sheets.spreadsheet_id"),
    ("SHEET_NAME", "sheets.sheet_name"),
    ("GCP_SHEETS_CREDENTIALS", "sheets.credentials_json"),
    ("GITHUB_TOKEN", "github.token"),
    ("REPO_OWNER", "github.owner"),
    ("REPO_NAME", "github.repo"),
    ("DEFAULT_ASSIGNEE", "sync.default_assignee"),
];

fn legacy_key(key: &UncasedStr) -> Uncased<'_> {
    LEGACY_ENV_KEYS
        .iter()
        .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
        .map(|(_, path)| Uncased::from(*path))
        .unwrap_or_else(|| Uncased::from(key.as_str()))
}

fn legacy_env() -> Env {
    let names: Vec<&'static str> = LEGACY_ENV_KEYS.iter().map(|(name, _)| *name).collect();
    Env::raw().only(&names).map(legacy_key)
}

fn env_providers(figment: Figment) -> Figment {
    figment
        .merge(legacy_env())
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    env_providers(Figment::new().merge(Toml::file(path)))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from environment variables only
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    env_providers(Figment::new())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
