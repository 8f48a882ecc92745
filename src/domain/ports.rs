use crate::config::toml_config::{SourceConfig, TableNames};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn source(&self) -> &SourceConfig;
    fn tables(&self) -> &TableNames;
}

/// Read access to one named table of the external spreadsheet, as CSV bytes.
#[async_trait]
pub trait TableSource: Send + Sync {
    async fn fetch_table(&self, table: &str) -> Result<Vec<u8>>;

    /// Human readable location, used in logs.
    fn describe(&self) -> String;
}
