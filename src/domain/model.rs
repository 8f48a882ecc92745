use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier of a product row, kept as the trimmed cell text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChemicalProduct {
    pub id: ProductId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiologicalProduct {
    pub id: ProductId,
    pub name: String,
}

/// Tested outcome stored in the compatibility table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityResult {
    Compatible,
    Incompatible,
}

impl CompatibilityResult {
    pub fn label(&self) -> &'static str {
        match self {
            CompatibilityResult::Compatible => "Compatível",
            CompatibilityResult::Incompatible => "Incompatível",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityRecord {
    pub chemical_id: ProductId,
    pub biological_id: ProductId,
    pub result: CompatibilityResult,
    pub notes: Option<String>,
}

/// Read-only snapshot of the three tables.
///
/// Built through [`Dataset::new`], which enforces one record per
/// (chemical, biological) pair and indexes the tables for lookups.
#[derive(Debug, Clone)]
pub struct Dataset {
    chemicals: Vec<ChemicalProduct>,
    biologicals: Vec<BiologicalProduct>,
    compatibilities: Vec<CompatibilityRecord>,
    pair_index: HashMap<(ProductId, ProductId), usize>,
    loaded_at: DateTime<Utc>,
}

/// Why a set of tables cannot form a [`Dataset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetError {
    ConflictingRecords {
        chemical_id: ProductId,
        biological_id: ProductId,
    },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::ConflictingRecords {
                chemical_id,
                biological_id,
            } => write!(
                f,
                "conflicting results for chemical {} and biological {}",
                chemical_id, biological_id
            ),
        }
    }
}

impl std::error::Error for DatasetError {}

impl Dataset {
    /// Identical duplicate rows collapse into the first one; conflicting
    /// duplicates are rejected.
    pub fn new(
        chemicals: Vec<ChemicalProduct>,
        biologicals: Vec<BiologicalProduct>,
        records: Vec<CompatibilityRecord>,
    ) -> Result<Self, DatasetError> {
        let mut compatibilities: Vec<CompatibilityRecord> = Vec::with_capacity(records.len());
        let mut pair_index = HashMap::with_capacity(records.len());

        for record in records {
            let key = (record.chemical_id.clone(), record.biological_id.clone());
            if let Some(&existing) = pair_index.get(&key) {
                let kept: &CompatibilityRecord = &compatibilities[existing];
                if kept.result != record.result {
                    return Err(DatasetError::ConflictingRecords {
                        chemical_id: key.0,
                        biological_id: key.1,
                    });
                }
                tracing::warn!(
                    "Duplicate compatibility row for chemical {} and biological {}, keeping the first",
                    key.0,
                    key.1
                );
                continue;
            }
            pair_index.insert(key, compatibilities.len());
            compatibilities.push(record);
        }

        Ok(Self {
            chemicals,
            biologicals,
            compatibilities,
            pair_index,
            loaded_at: Utc::now(),
        })
    }

    pub fn empty() -> Self {
        Self {
            chemicals: Vec::new(),
            biologicals: Vec::new(),
            compatibilities: Vec::new(),
            pair_index: HashMap::new(),
            loaded_at: Utc::now(),
        }
    }

    pub fn chemicals(&self) -> &[ChemicalProduct] {
        &self.chemicals
    }

    pub fn biologicals(&self) -> &[BiologicalProduct] {
        &self.biologicals
    }

    pub fn compatibilities(&self) -> &[CompatibilityRecord] {
        &self.compatibilities
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn is_empty(&self) -> bool {
        self.chemicals.is_empty() && self.biologicals.is_empty() && self.compatibilities.is_empty()
    }

    /// First chemical in table order with exactly this name.
    pub fn chemical_by_name(&self, name: &str) -> Option<&ChemicalProduct> {
        self.chemicals.iter().find(|c| c.name == name)
    }

    /// First biological in table order with exactly this name.
    pub fn biological_by_name(&self, name: &str) -> Option<&BiologicalProduct> {
        self.biologicals.iter().find(|b| b.name == name)
    }

    pub fn record_for(
        &self,
        chemical_id: &ProductId,
        biological_id: &ProductId,
    ) -> Option<&CompatibilityRecord> {
        self.pair_index
            .get(&(chemical_id.clone(), biological_id.clone()))
            .map(|&i| &self.compatibilities[i])
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            chemicals: self.chemicals.len(),
            biologicals: self.biologicals.len(),
            compatibilities: self.compatibilities.len(),
            loaded_at: self.loaded_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub chemicals: usize,
    pub biologicals: usize,
    pub compatibilities: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Both products of a resolved pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductPair {
    pub chemical: ChemicalProduct,
    pub biological: BiologicalProduct,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeDetails {
    #[serde(flatten)]
    pub pair: ProductPair,
    pub notes: Option<String>,
}

/// Result of resolving a pair that exists in both product tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Compatible(OutcomeDetails),
    Incompatible(OutcomeDetails),
    Untested(ProductPair),
}

impl Outcome {
    pub fn pair(&self) -> &ProductPair {
        match self {
            Outcome::Compatible(details) | Outcome::Incompatible(details) => &details.pair,
            Outcome::Untested(pair) => pair,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Chemical,
    Biological,
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductKind::Chemical => f.write_str("chemical"),
            ProductKind::Biological => f.write_str("biological"),
        }
    }
}

/// A name that matched no product. Reported as a warning, never as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupMiss {
    pub kind: ProductKind,
    pub name: String,
    pub suggestions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(chem: &str, bio: &str, result: CompatibilityResult) -> CompatibilityRecord {
        CompatibilityRecord {
            chemical_id: ProductId::new(chem),
            biological_id: ProductId::new(bio),
            result,
            notes: None,
        }
    }

    #[test]
    fn test_identical_duplicates_collapse() {
        let dataset = Dataset::new(
            vec![],
            vec![],
            vec![
                record("1", "10", CompatibilityResult::Compatible),
                record("1", "10", CompatibilityResult::Compatible),
                record("2", "10", CompatibilityResult::Incompatible),
            ],
        )
        .unwrap();

        assert_eq!(dataset.compatibilities().len(), 2);
        assert_eq!(
            dataset
                .record_for(&ProductId::new("2"), &ProductId::new("10"))
                .unwrap()
                .result,
            CompatibilityResult::Incompatible
        );
    }

    #[test]
    fn test_conflicting_duplicates_rejected() {
        let err = Dataset::new(
            vec![],
            vec![],
            vec![
                record("1", "10", CompatibilityResult::Compatible),
                record("1", "10", CompatibilityResult::Incompatible),
            ],
        )
        .unwrap_err();

        assert_eq!(
            err,
            DatasetError::ConflictingRecords {
                chemical_id: ProductId::new("1"),
                biological_id: ProductId::new("10"),
            }
        );
    }

    #[test]
    fn test_first_name_match_wins() {
        let dataset = Dataset::new(
            vec![
                ChemicalProduct {
                    id: ProductId::new("1"),
                    name: "Herbicida X".to_string(),
                },
                ChemicalProduct {
                    id: ProductId::new("2"),
                    name: "Herbicida X".to_string(),
                },
            ],
            vec![],
            vec![],
        )
        .unwrap();

        assert_eq!(
            dataset.chemical_by_name("Herbicida X").unwrap().id,
            ProductId::new("1")
        );
        assert!(dataset.chemical_by_name("herbicida x").is_none());
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::empty();
        assert!(dataset.is_empty());
        assert_eq!(dataset.summary().compatibilities, 0);
    }
}
