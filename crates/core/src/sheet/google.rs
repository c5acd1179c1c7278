//! Google Sheets v4 backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::SheetsConfig;

use super::auth::TokenProvider;
use super::{
    data_range, ticket_number_cell, RawRow, RowSink, RowSource, SheetError, SheetsAuth,
    TicketNumberWrite,
};

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateRequest {
    value_input_option: &'static str,
    data: Vec<CellUpdate>,
}

#[derive(Debug, Serialize)]
struct CellUpdate {
    range: String,
    values: Vec<Vec<String>>,
}

/// Render a cell value as the sheet would display it.
fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Client for one tab of one spreadsheet.
pub struct GoogleSheetsClient {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    sheet_name: String,
    tokens: TokenProvider,
}

impl GoogleSheetsClient {
    /// Create a client using the credential source named in `config`.
    pub fn new(config: &SheetsConfig) -> Result<Self, SheetError> {
        let auth = SheetsAuth::from_config(config)?;
        Self::with_auth(config, auth)
    }

    /// Create a client with explicit credentials.
    pub fn with_auth(config: &SheetsConfig, auth: SheetsAuth) -> Result<Self, SheetError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            sheet_name: config.sheet_name.clone(),
            tokens: TokenProvider::new(auth),
        })
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url,
            urlencoding::encode(&self.spreadsheet_id),
            urlencoding::encode(range)
        )
    }

    fn batch_update_url(&self) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values:batchUpdate",
            self.base_url,
            urlencoding::encode(&self.spreadsheet_id)
        )
    }

    async fn check_status(&self, response: Response) -> Result<Response, SheetError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message: String = body.chars().take(200).collect();
        match status.as_u16() {
            401 | 403 => Err(SheetError::Unauthorized(message)),
            404 => Err(SheetError::NotFound(format!(
                "spreadsheet {} tab {}",
                self.spreadsheet_id, self.sheet_name
            ))),
            code => Err(SheetError::Api {
                status: code,
                message,
            }),
        }
    }
}

#[async_trait]
impl RowSource for GoogleSheetsClient {
    async fn read_rows(&self) -> Result<Vec<RawRow>, SheetError> {
        let range = data_range(&self.sheet_name);
        debug!(range = %range, "Reading sheet rows");

        let token = self.tokens.bearer_token(&self.client).await?;
        let response = self
            .client
            .get(self.values_url(&range))
            .bearer_auth(token)
            .send()
            .await?;
        let response = self.check_status(response).await?;

        let value_range: ValueRange = response
            .json()
            .await
            .map_err(|e| SheetError::Parse(format!("Failed to parse value range: {}", e)))?;

        Ok(value_range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }
}

#[async_trait]
impl RowSink for GoogleSheetsClient {
    async fn write_ticket_numbers(&self, writes: &[TicketNumberWrite]) -> Result<(), SheetError> {
        if writes.is_empty() {
            return Ok(());
        }

        let request = BatchUpdateRequest {
            value_input_option: "RAW",
            data: writes
                .iter()
                .map(|write| CellUpdate {
                    range: ticket_number_cell(&self.sheet_name, write),
                    values: vec![vec![write.ticket_number.to_string()]],
                })
                .collect(),
        };

        let token = self.tokens.bearer_token(&self.client).await?;
        let response = self
            .client
            .post(self.batch_update_url())
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;
        self.check_status(response).await?;

        info!(count = writes.len(), "Wrote ticket numbers back to the sheet");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleSheetsClient {
        let config = SheetsConfig {
            spreadsheet_id: "abc123".to_string(),
            sheet_name: "My Tab".to_string(),
            credentials_path: None,
            credentials_json: None,
            access_token: Some("token".to_string()),
            base_url: "https://sheets.googleapis.com/".to_string(),
            timeout_secs: 30,
        };
        GoogleSheetsClient::new(&config).unwrap()
    }

    #[test]
    fn test_values_url_encodes_range() {
        let client = client();
        assert_eq!(
            client.values_url(&data_range("My Tab")),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/%27My%20Tab%27%21A%3AG"
        );
    }

    #[test]
    fn test_batch_update_url() {
        assert_eq!(
            client().batch_update_url(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values:batchUpdate"
        );
    }

    #[test]
    fn test_value_range_without_values() {
        let range: ValueRange =
            serde_json::from_str(r#"{"range": "Sheet1!A1:G1000", "majorDimension": "ROWS"}"#)
                .unwrap();
        assert!(range.values.is_empty());
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(Value::String("x".into())), "x");
        assert_eq!(cell_to_string(serde_json::json!(42)), "42");
        assert_eq!(cell_to_string(serde_json::json!(true)), "true");
        assert_eq!(cell_to_string(Value::Null), "");
    }

    #[test]
    fn test_batch_update_request_shape() {
        let request = BatchUpdateRequest {
            value_input_option: "RAW",
            data: vec![CellUpdate {
                range: "Sheet1!F2".to_string(),
                values: vec![vec!["17".to_string()]],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "valueInputOption": "RAW",
                "data": [{ "range": "Sheet1!F2", "values": [["17"]] }]
            })
        );
    }
}
