use crate::domain::ports::TableSource;
use crate::utils::error::{CompatError, ErrorCategory, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

/// Reads tables over HTTP from a URL template containing `{table}`.
pub struct HttpSheetSource {
    client: Client,
    url_template: String,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl HttpSheetSource {
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url_template: url_template.into(),
            retry_attempts: 0,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Public CSV export of a Google spreadsheet, one sheet per table.
    pub fn google_sheets(base_url: &str, spreadsheet_id: &str, timeout: Duration) -> Result<Self> {
        let template = format!(
            "{}/spreadsheets/d/{}/gviz/tq?tqx=out:csv&sheet={{table}}",
            base_url.trim_end_matches('/'),
            spreadsheet_id.trim()
        );
        Self::new(template, timeout)
    }

    pub fn with_retries(mut self, retry_attempts: u32, retry_delay: Duration) -> Self {
        self.retry_attempts = retry_attempts;
        self.retry_delay = retry_delay;
        self
    }

    pub fn table_url(&self, table: &str) -> String {
        // byte_serialize escapes a literal '+', so every remaining '+' is a space
        let encoded: String = url::form_urlencoded::byte_serialize(table.as_bytes())
            .collect::<String>()
            .replace('+', "%20");
        self.url_template.replace("{table}", &encoded)
    }

    async fn fetch_once(&self, table: &str, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!("Sheet response status for '{}': {}", table, status);

        if !status.is_success() {
            return Err(CompatError::HttpStatusError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false);
        let body = response.bytes().await?;

        if is_html || looks_like_html(&body) {
            return Err(CompatError::data_format(
                table,
                "received an HTML page instead of CSV, check that the sheet is shared for reading",
            ));
        }

        Ok(body.to_vec())
    }
}

fn looks_like_html(body: &[u8]) -> bool {
    let start = body
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(body.len());
    let head = &body[start..body.len().min(start + 15)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

#[async_trait]
impl TableSource for HttpSheetSource {
    async fn fetch_table(&self, table: &str) -> Result<Vec<u8>> {
        let url = self.table_url(table);
        let mut attempt = 0;

        loop {
            tracing::debug!("Fetching table '{}' from {}", table, url);
            match self.fetch_once(table, &url).await {
                Ok(body) => {
                    tracing::debug!("Fetched table '{}' ({} bytes)", table, body.len());
                    return Ok(body);
                }
                Err(e) if e.category() == ErrorCategory::Connection && attempt < self.retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        "Fetching table '{}' failed ({}), retry {}/{}",
                        table,
                        e,
                        attempt,
                        self.retry_attempts
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn describe(&self) -> String {
        self.url_template.clone()
    }
}
