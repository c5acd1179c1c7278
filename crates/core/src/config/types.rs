use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub sheets: SheetsConfig,
    pub github: GithubConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Google Sheets configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SheetsConfig {
    /// Spreadsheet identifier (the long id in the sheet URL).
    #[serde(deserialize_with = "lenient_string")]
    pub spreadsheet_id: String,
    /// Tab holding the rows (default: "Sheet1").
    #[serde(default = "default_sheet_name", deserialize_with = "lenient_string")]
    pub sheet_name: String,
    /// Path to a service account key file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_path: Option<PathBuf>,
    /// Inline service account key JSON.
    #[serde(
        default,
        deserialize_with = "lenient_option_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub credentials_json: Option<String>,
    /// Pre-issued OAuth access token, used instead of a service account.
    #[serde(
        default,
        deserialize_with = "lenient_option_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub access_token: Option<String>,
    /// API base URL (default: https://sheets.googleapis.com).
    #[serde(default = "default_sheets_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_sheet_name() -> String {
    "Sheet1".to_string()
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

/// GitHub Issues configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GithubConfig {
    #[serde(deserialize_with = "lenient_string")]
    pub token: String,
    #[serde(deserialize_with = "lenient_string")]
    pub owner: String,
    #[serde(deserialize_with = "lenient_string")]
    pub repo: String,
    /// REST API URL (default: https://api.github.com).
    #[serde(default = "default_github_api_url")]
    pub api_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Reconciliation settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Assignee used when a row leaves the assignee column empty.
    #[serde(
        default,
        deserialize_with = "lenient_option_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_assignee: Option<String>,
}

impl SyncConfig {
    /// The default assignee, if one is configured and non-blank.
    pub fn default_assignee(&self) -> Option<&str> {
        self.default_assignee
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }
}

/// Accepts a string, or a number or bool that an env provider typed eagerly
/// (`REPO_NAME=2024` arrives as an integer).
struct LenientString;

impl<'de> Visitor<'de> for LenientString {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string or a number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_char<E: de::Error>(self, v: char) -> Result<String, E> {
        Ok(v.to_string())
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    deserializer.deserialize_any(LenientString)
}

struct LenientOptionString;

impl<'de> Visitor<'de> for LenientOptionString {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an optional string or number")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        lenient_string(deserializer).map(Some)
    }
}

fn lenient_option_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    deserializer.deserialize_option(LenientOptionString)
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub sheets: SanitizedSheetsConfig,
    pub github: SanitizedGithubConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSheetsConfig {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub base_url: String,
    /// Which credential source is in use ("access_token", "service_account", "none").
    pub credentials: String,
    pub timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedGithubConfig {
    pub owner: String,
    pub repo: String,
    pub api_url: String,
    pub token_configured: bool,
    pub timeout_secs: u32,
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let sheets = &config.sheets;
        let credentials = if is_set(&sheets.access_token) {
            "access_token"
        } else if is_set(&sheets.credentials_json) || sheets.credentials_path.is_some() {
            "service_account"
        } else {
            "none"
        };

        Self {
            sheets: SanitizedSheetsConfig {
                spreadsheet_id: sheets.spreadsheet_id.clone(),
                sheet_name: sheets.sheet_name.clone(),
                base_url: sheets.base_url.clone(),
                credentials: credentials.to_string(),
                timeout_secs: sheets.timeout_secs,
            },
            github: SanitizedGithubConfig {
                owner: config.github.owner.clone(),
                repo: config.github.repo.clone(),
                api_url: config.github.api_url.clone(),
                token_configured: !config.github.token.is_empty(),
                timeout_secs: config.github.timeout_secs,
            },
            sync: config.sync.clone(),
        }
    }
}
