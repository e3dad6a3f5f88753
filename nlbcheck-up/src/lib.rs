//! Spreadsheet upload for produced reports
//!
//! Publishes one availability report to a Google spreadsheet: the CSV
//! replaces the spreadsheet's contents (Drive media upload), then the
//! first worksheet is renamed to a timestamp-derived title so each upload
//! is identifiable in the sheet UI.

use chrono::{DateTime, Local};
use nlbcheck_common::config::{self, TomlConfig};
use nlbcheck_common::{Error, Result};
use reqwest::blocking::Client;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::info;

const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Per-call timeout for upload requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Uploads one report CSV to the configured spreadsheet
pub struct Uploader {
    http_client: Client,
    spreadsheet_id: String,
    token: String,
}

impl Uploader {
    pub fn new(spreadsheet_id: String, token: String) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http_client,
            spreadsheet_id,
            token,
        })
    }

    /// Build an uploader from the TOML configuration (`spreadsheet_id`
    /// plus the bearer token from env or config).
    pub fn from_config(toml_config: &TomlConfig) -> Result<Self> {
        let spreadsheet_id = toml_config.spreadsheet_id.clone().ok_or_else(|| {
            Error::Config("spreadsheet_id not configured for upload".to_string())
        })?;
        let token = config::resolve_upload_token(toml_config)?;
        Self::new(spreadsheet_id, token)
    }

    /// Replace the spreadsheet contents with the report and retitle the
    /// first worksheet.
    pub fn upload(&self, csv_path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(csv_path)?;
        self.replace_contents(content)?;

        let title = worksheet_title(Local::now());
        self.rename_first_sheet(&title)?;
        info!("Uploaded {} as worksheet {}", csv_path.display(), title);
        Ok(())
    }

    fn replace_contents(&self, content: String) -> Result<()> {
        let url = format!(
            "{}/{}?uploadType=media",
            DRIVE_UPLOAD_URL, self.spreadsheet_id
        );
        let response = self
            .http_client
            .patch(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "text/csv")
            .body(content)
            .send()
            .map_err(|e| Error::Internal(format!("Spreadsheet upload failed: {}", e)))?;
        ensure_success(response, "Spreadsheet upload")
    }

    fn rename_first_sheet(&self, title: &str) -> Result<()> {
        let url = format!("{}/{}:batchUpdate", SHEETS_API_URL, self.spreadsheet_id);
        let body = json!({
            "requests": [{
                "updateSheetProperties": {
                    "properties": { "sheetId": 0, "title": title },
                    "fields": "title"
                }
            }]
        });
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .map_err(|e| Error::Internal(format!("Worksheet rename failed: {}", e)))?;
        ensure_success(response, "Worksheet rename")
    }
}

fn ensure_success(response: reqwest::blocking::Response, action: &str) -> Result<()> {
    if response.status().is_success() {
        return Ok(());
    }
    let status = response.status();
    let body = response.text().unwrap_or_default();
    Err(Error::Internal(format!(
        "{} returned {}: {}",
        action, status, body
    )))
}

/// Timestamp-derived worksheet title, e.g. `caa20260807-153045`
fn worksheet_title(now: DateTime<Local>) -> String {
    format!("caa{}", now.format("%Y%m%d-%H%M%S"))
}

// ============================================================================
// Tests
// ============================================================================
