use crate::core::loader::SheetLoader;
use crate::domain::model::{Dataset, LookupMiss, Outcome, ProductPair};
use crate::domain::ports::ConfigProvider;
use crate::domain::services::resolve;
use crate::utils::error::{CompatError, ErrorSeverity};
use serde::Serialize;

/// Why the session holds no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    pub message: String,
    pub suggestion: String,
    #[serde(skip)]
    pub severity: ErrorSeverity,
}

impl From<&CompatError> for LoadFailure {
    fn from(error: &CompatError) -> Self {
        Self {
            message: error.user_friendly_message(),
            suggestion: error.recovery_suggestion().to_string(),
            severity: error.severity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResponse {
    Resolved(Outcome),
    Miss(LookupMiss),
    Unavailable(LoadFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestRequest {
    /// Acknowledged only; nothing is written back to the sheet.
    Accepted(ProductPair),
    AlreadyTested(Outcome),
    Miss(LookupMiss),
    Unavailable(LoadFailure),
}

/// One snapshot per invocation. A failed load leaves the session degraded
/// with an empty dataset, and every check then reports the failure.
pub struct LookupSession {
    dataset: Dataset,
    failure: Option<LoadFailure>,
}

impl LookupSession {
    /// A `source.*` setting that cannot produce a source degrades the session
    /// the same way an unreachable sheet does.
    pub async fn from_config<C: ConfigProvider>(config: &C) -> Self {
        match SheetLoader::from_config(config) {
            Ok(loader) => Self::open(&loader).await,
            Err(e) => {
                tracing::error!("❌ Could not create sheet source: {}", e);
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                Self::degraded(&e)
            }
        }
    }

    pub async fn open(loader: &SheetLoader) -> Self {
        match loader.load().await {
            Ok(dataset) => Self::ready(dataset),
            Err(e) => {
                tracing::error!(
                    "❌ Loading compatibility data from {} failed: {} (Category: {:?}, Severity: {:?})",
                    loader.source_description(),
                    e,
                    e.category(),
                    e.severity()
                );
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                Self::degraded(&e)
            }
        }
    }

    pub fn ready(dataset: Dataset) -> Self {
        Self {
            dataset,
            failure: None,
        }
    }

    pub fn degraded(error: &CompatError) -> Self {
        Self {
            dataset: Dataset::empty(),
            failure: Some(LoadFailure::from(error)),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }

    pub fn failure(&self) -> Option<&LoadFailure> {
        self.failure.as_ref()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn chemical_names(&self) -> Vec<&str> {
        self.dataset.chemicals().iter().map(|c| c.name.as_str()).collect()
    }

    pub fn biological_names(&self) -> Vec<&str> {
        self.dataset
            .biologicals()
            .iter()
            .map(|b| b.name.as_str())
            .collect()
    }

    pub fn check(&self, chemical_name: &str, biological_name: &str) -> CheckResponse {
        if let Some(failure) = &self.failure {
            return CheckResponse::Unavailable(failure.clone());
        }

        match resolve(chemical_name, biological_name, &self.dataset) {
            Ok(outcome) => {
                tracing::debug!("Resolved {:?}", outcome);
                CheckResponse::Resolved(outcome)
            }
            Err(miss) => {
                tracing::warn!("⚠️ Unknown {} product '{}'", miss.kind, miss.name);
                CheckResponse::Miss(miss)
            }
        }
    }

    pub fn request_test(&self, chemical_name: &str, biological_name: &str) -> TestRequest {
        match self.check(chemical_name, biological_name) {
            CheckResponse::Resolved(Outcome::Untested(pair)) => {
                tracing::info!(
                    "📝 Test requested for {} + {} (not persisted)",
                    pair.chemical.name,
                    pair.biological.name
                );
                TestRequest::Accepted(pair)
            }
            CheckResponse::Resolved(outcome) => TestRequest::AlreadyTested(outcome),
            CheckResponse::Miss(miss) => TestRequest::Miss(miss),
            CheckResponse::Unavailable(failure) => TestRequest::Unavailable(failure),
        }
    }
}
