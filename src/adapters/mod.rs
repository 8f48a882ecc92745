// Adapters layer: concrete sheet sources behind the `TableSource` port.

pub mod http;
pub mod storage;

use crate::config::toml_config::SourceKind;
use crate::domain::ports::{ConfigProvider, TableSource};
use crate::utils::error::Result;
use crate::utils::validation::validate_required_field;
use std::sync::Arc;
use std::time::Duration;

pub use http::HttpSheetSource;
pub use storage::{LocalCsvSource, LocalStorage};

/// Builds the table source selected by `source.type`.
pub fn build_source<C: ConfigProvider>(config: &C) -> Result<Arc<dyn TableSource>> {
    let source = config.source();
    source.validate_source()?;

    let timeout = Duration::from_secs(source.timeout_seconds);
    let retry_delay = Duration::from_secs(source.retry_delay_seconds);

    let table_source: Arc<dyn TableSource> = match source.r#type {
        SourceKind::GoogleSheets => {
            let spreadsheet_id =
                validate_required_field("source.spreadsheet_id", &source.spreadsheet_id)?;
            Arc::new(
                HttpSheetSource::google_sheets(&source.base_url, spreadsheet_id, timeout)?
                    .with_retries(source.retry_attempts, retry_delay),
            )
        }
        SourceKind::CsvUrl => {
            let template = validate_required_field("source.url_template", &source.url_template)?;
            Arc::new(
                HttpSheetSource::new(template.clone(), timeout)?
                    .with_retries(source.retry_attempts, retry_delay),
            )
        }
        SourceKind::Local => {
            let directory = validate_required_field("source.directory", &source.directory)?;
            Arc::new(LocalCsvSource::new(LocalStorage::new(directory.clone())))
        }
    };

    tracing::debug!("Using table source: {}", table_source.describe());
    Ok(table_source)
}
