use crate::adapters::build_source;
use crate::config::toml_config::TableNames;
use crate::core::parser;
use crate::domain::model::Dataset;
use crate::domain::ports::{ConfigProvider, TableSource};
use crate::utils::error::{CompatError, Result};
use std::collections::HashSet;
use std::sync::Arc;

/// Fetches the three tables and assembles a [`Dataset`] snapshot.
pub struct SheetLoader {
    source: Arc<dyn TableSource>,
    tables: TableNames,
}

impl SheetLoader {
    pub fn new(source: Arc<dyn TableSource>, tables: TableNames) -> Self {
        Self { source, tables }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Ok(Self::new(build_source(config)?, config.tables().clone()))
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    pub async fn load(&self) -> Result<Dataset> {
        tracing::info!("📥 Loading compatibility tables from {}", self.source.describe());

        let (chemicals_csv, biologicals_csv, compatibility_csv) = tokio::try_join!(
            self.source.fetch_table(&self.tables.chemicals),
            self.source.fetch_table(&self.tables.biologicals),
            self.source.fetch_table(&self.tables.compatibility),
        )?;

        reject_identical_tables(&[
            (self.tables.chemicals.as_str(), chemicals_csv.as_slice()),
            (self.tables.biologicals.as_str(), biologicals_csv.as_slice()),
            (self.tables.compatibility.as_str(), compatibility_csv.as_slice()),
        ])?;

        let chemicals = parser::parse_chemicals(&self.tables.chemicals, &chemicals_csv)?;
        let biologicals = parser::parse_biologicals(&self.tables.biologicals, &biologicals_csv)?;
        let records =
            parser::parse_compatibilities(&self.tables.compatibility, &compatibility_csv)?;

        let dataset = Dataset::new(chemicals, biologicals, records)
            .map_err(|e| CompatError::data_format(&self.tables.compatibility, e.to_string()))?;

        warn_dangling_references(&dataset);

        let summary = dataset.summary();
        tracing::info!(
            "✅ Loaded {} chemicals, {} biologicals, {} compatibility records",
            summary.chemicals,
            summary.biologicals,
            summary.compatibilities
        );

        Ok(dataset)
    }
}

/// Google answers an unknown sheet name with the first tab, so a misspelt
/// table name shows up as two tables with the same body. Header-only tables
/// may legitimately match.
fn reject_identical_tables(tables: &[(&str, &[u8])]) -> Result<()> {
    for (i, (name, body)) in tables.iter().enumerate() {
        if !has_data_rows(body) {
            continue;
        }
        if let Some((other, _)) = tables[i + 1..].iter().find(|(_, b)| b == body) {
            return Err(CompatError::data_format(
                *other,
                format!(
                    "table '{}' has the same content as table '{}'; check that the sheet name exists, Google returns the first tab for unknown names",
                    other, name
                ),
            ));
        }
    }
    Ok(())
}

fn has_data_rows(body: &[u8]) -> bool {
    body.split(|b| *b == b'\n')
        .filter(|line| line.iter().any(|b| !b.is_ascii_whitespace()))
        .nth(1)
        .is_some()
}

/// Records pointing at unknown products stay in the snapshot but no name lookup reaches them.
fn warn_dangling_references(dataset: &Dataset) {
    let chemical_ids: HashSet<_> = dataset.chemicals().iter().map(|c| &c.id).collect();
    let biological_ids: HashSet<_> = dataset.biologicals().iter().map(|b| &b.id).collect();

    for record in dataset.compatibilities() {
        if !chemical_ids.contains(&record.chemical_id) {
            tracing::warn!(
                "Compatibility record references unknown chemical ID {}",
                record.chemical_id
            );
        }
        if !biological_ids.contains(&record.biological_id) {
            tracing::warn!(
                "Compatibility record references unknown biological ID {}",
                record.biological_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CompatibilityResult, ProductId};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct MemorySource {
        tables: HashMap<String, String>,
    }

    impl MemorySource {
        fn new(tables: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                tables: tables
                    .iter()
                    .map(|(name, body)| (name.to_string(), body.to_string()))
                    .collect(),
            })
        }
    }

    #[async_trait]
    impl TableSource for MemorySource {
        async fn fetch_table(&self, table: &str) -> Result<Vec<u8>> {
            self.tables
                .get(table)
                .map(|body| body.as_bytes().to_vec())
                .ok_or_else(|| CompatError::HttpStatusError {
                    status: 404,
                    url: format!("memory://{}", table),
                })
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    #[tokio::test]
    async fn test_load_joins_three_tables() {
        let source = MemorySource::new(&[
            ("Quimicos", "ID,Nome\n1,Herbicida X\n"),
            ("Biologicos", "ID,Nome\n10,Fungo Y\n"),
            ("Compatibilidade", "ID_Quimico,ID_Biologico,Resultado\n1,10,Compatível\n"),
        ]);
        let loader = SheetLoader::new(source, TableNames::default());

        let dataset = loader.load().await.unwrap();

        assert_eq!(dataset.chemicals().len(), 1);
        assert_eq!(dataset.biologicals().len(), 1);
        assert_eq!(
            dataset
                .record_for(&ProductId::new("1"), &ProductId::new("10"))
                .unwrap()
                .result,
            CompatibilityResult::Compatible
        );
    }

    #[tokio::test]
    async fn test_missing_table_fails_the_load() {
        let source = MemorySource::new(&[
            ("Quimicos", "ID,Nome\n1,Herbicida X\n"),
            ("Biologicos", "ID,Nome\n10,Fungo Y\n"),
        ]);
        let loader = SheetLoader::new(source, TableNames::default());

        let err = loader.load().await.unwrap_err();

        assert!(matches!(err, CompatError::HttpStatusError { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_conflicting_records_fail_the_load() {
        let source = MemorySource::new(&[
            ("Quimicos", "ID,Nome\n1,Herbicida X\n"),
            ("Biologicos", "ID,Nome\n10,Fungo Y\n"),
            (
                "Compatibilidade",
                "ChemicalID,BiologicalID,Result\n1,10,Compatible\n1,10,Incompatible\n",
            ),
        ]);
        let loader = SheetLoader::new(source, TableNames::default());

        let err = loader.load().await.unwrap_err();

        assert!(matches!(err, CompatError::DataFormatError { ref table, .. } if table == "Compatibilidade"));
    }

    #[tokio::test]
    async fn test_identical_tables_fail_the_load() {
        let products = "ID,Nome\n1,Herbicida X\n";
        let source = MemorySource::new(&[
            ("Quimicos", products),
            ("Biologicos", products),
            ("Compatibilidade", "ID_Quimico,ID_Biologico,Resultado\n"),
        ]);
        let loader = SheetLoader::new(source, TableNames::default());

        let err = loader.load().await.unwrap_err();

        match err {
            CompatError::DataFormatError { table, message } => {
                assert_eq!(table, "Biologicos");
                assert!(message.contains("Quimicos"));
            }
            other => panic!("expected data format error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_header_only_tables_may_match() {
        let source = MemorySource::new(&[
            ("Quimicos", "ID,Nome\n"),
            ("Biologicos", "ID,Nome\n"),
            ("Compatibilidade", "ID_Quimico,ID_Biologico,Resultado\n"),
        ]);
        let loader = SheetLoader::new(source, TableNames::default());

        let dataset = loader.load().await.unwrap();

        assert!(dataset.is_empty());
    }

    #[test]
    fn test_source_description_names_the_source() {
        let loader = SheetLoader::new(MemorySource::new(&[]), TableNames::default());
        assert_eq!(loader.source_description(), "memory");
    }

    #[tokio::test]
    async fn test_custom_table_names() {
        let source = MemorySource::new(&[
            ("Chemicals", "ID,Name\n1,Herbicida X\n"),
            ("Biologicals", "ID,Name\n10,Fungo Y\n"),
            ("Results", "ChemicalID,BiologicalID,Result\n"),
        ]);
        let tables = TableNames {
            chemicals: "Chemicals".to_string(),
            biologicals: "Biologicals".to_string(),
            compatibility: "Results".to_string(),
        };

        let dataset = SheetLoader::new(source, tables).load().await.unwrap();

        assert!(dataset.compatibilities().is_empty());
        assert_eq!(dataset.chemicals()[0].name, "Herbicida X");
    }
}
