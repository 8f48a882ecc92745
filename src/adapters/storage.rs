use crate::domain::ports::{Storage, TableSource};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }
}

/// Tables exported as `{table}.csv` files.
pub struct LocalCsvSource<S: Storage> {
    storage: S,
    location: String,
}

impl LocalCsvSource<LocalStorage> {
    pub fn new(storage: LocalStorage) -> Self {
        let location = storage.base_path().to_string();
        Self { storage, location }
    }
}

impl<S: Storage> LocalCsvSource<S> {
    pub fn with_storage(storage: S, location: impl Into<String>) -> Self {
        Self {
            storage,
            location: location.into(),
        }
    }
}

#[async_trait]
impl<S: Storage> TableSource for LocalCsvSource<S> {
    async fn fetch_table(&self, table: &str) -> Result<Vec<u8>> {
        let file_name = format!("{}.csv", table);
        tracing::debug!("Reading table '{}' from {}/{}", table, self.location, file_name);
        self.storage.read_file(&file_name).await
    }

    fn describe(&self) -> String {
        format!("local directory {}", self.location)
    }
}
