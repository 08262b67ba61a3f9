//! Topic source backed by the Google Sheets values API.
//!
//! Reads topic rows (primary keywords, auxiliary keywords, title) from a
//! spreadsheet via the read-only `values/{range}` endpoint. Rows are never
//! written back; the spreadsheet remains the source of truth.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};

use inkpress_shared::{InkpressError, Result, SheetsConfig, TopicRow, resolve_env_secret};

/// User-Agent string for sheet requests.
const USER_AGENT: &str = concat!("Inkpress/", env!("CARGO_PKG_VERSION"));

/// Default timeout in seconds for sheet reads.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Response body of `GET /v4/spreadsheets/{id}/values/{range}`.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

// ---------------------------------------------------------------------------
// TopicSource
// ---------------------------------------------------------------------------

/// Read-only client for the topic spreadsheet.
#[derive(Debug)]
pub struct TopicSource {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    range: String,
    api_key: String,
}

impl TopicSource {
    /// Create a new topic source from config. Resolves the API key from the
    /// configured env var and fails early when it is missing.
    pub fn new(config: &SheetsConfig) -> Result<Self> {
        if config.spreadsheet_id.is_empty() {
            return Err(InkpressError::config(
                "sheets.spreadsheet_id is not set — run `inkpress config init` and edit the file",
            ));
        }

        let api_key = resolve_env_secret(&config.api_key_env)?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| InkpressError::source(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            range: config.range.clone(),
            api_key,
        })
    }

    /// Fetch all topic rows in sheet order.
    ///
    /// Rows with fewer than three populated cells are skipped; indices are
    /// 1-based positions within the configured range and stay stable across
    /// skips.
    #[instrument(skip(self), fields(spreadsheet = %self.spreadsheet_id))]
    pub async fn list_topics(&self) -> Result<Vec<TopicRow>> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url, self.spreadsheet_id, self.range
        );

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| InkpressError::source(format!("sheet request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InkpressError::source(format!(
                "sheet read failed: HTTP {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let value_range: ValueRange = response
            .json()
            .await
            .map_err(|e| InkpressError::source(format!("malformed sheet response: {e}")))?;

        let mut topics = Vec::new();
        for (i, row) in value_range.values.iter().enumerate() {
            let index = (i + 1) as u32;
            if row.len() < 3 || row[2].trim().is_empty() {
                debug!(index, cells = row.len(), "skipping incomplete row");
                continue;
            }
            topics.push(TopicRow {
                index,
                primary_keywords: split_keywords(&row[0]),
                auxiliary_keywords: split_keywords(&row[1]),
                title: row[2].trim().to_string(),
            });
        }

        info!(count = topics.len(), "loaded topic rows");
        Ok(topics)
    }

    /// Fetch a single topic row by its 1-based index.
    pub async fn get_topic(&self, index: u32) -> Result<TopicRow> {
        let topics = self.list_topics().await?;
        topics
            .into_iter()
            .find(|t| t.index == index)
            .ok_or_else(|| InkpressError::source(format!("row {index} not found in sheet")))
    }
}

/// Split a comma-separated keyword cell into trimmed, non-empty keywords.
fn split_keywords(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
