use crate::core::session::{CheckResponse, LoadFailure, LookupSession, TestRequest};
use crate::domain::model::{DatasetSummary, LookupMiss, Outcome, ProductPair};
use crate::utils::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// How prominently a message is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Visual class of a resolved pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualClass {
    Compatible,
    Incompatible,
    Untested,
}

impl VisualClass {
    pub fn css_class(&self) -> &'static str {
        match self {
            VisualClass::Compatible => "compatible",
            VisualClass::Incompatible => "incompatible",
            VisualClass::Untested => "untested",
        }
    }
}

impl From<&Outcome> for VisualClass {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Compatible(_) => VisualClass::Compatible,
            Outcome::Incompatible(_) => VisualClass::Incompatible,
            Outcome::Untested(_) => VisualClass::Untested,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    pub level: DisplayLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<VisualClass>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl Rendered {
    fn new(level: DisplayLevel, message: String) -> Self {
        Self {
            level,
            class: None,
            message,
            notes: None,
            suggestions: Vec::new(),
        }
    }
}

fn pair_label(pair: &ProductPair) -> String {
    format!("{} + {}", pair.chemical.name, pair.biological.name)
}

pub fn render_outcome(outcome: &Outcome) -> Rendered {
    let class = VisualClass::from(outcome);
    let (level, message, notes) = match outcome {
        Outcome::Compatible(details) => (
            DisplayLevel::Success,
            format!("✅ {}: Compatível", pair_label(&details.pair)),
            details.notes.clone(),
        ),
        Outcome::Incompatible(details) => (
            DisplayLevel::Error,
            format!("❌ {}: Incompatível", pair_label(&details.pair)),
            details.notes.clone(),
        ),
        Outcome::Untested(pair) => (
            DisplayLevel::Warning,
            format!(
                "⚠️ {}: combination not tested yet, use `request-test` to ask for it",
                pair_label(pair)
            ),
            None,
        ),
    };

    Rendered {
        level,
        class: Some(class),
        message,
        notes,
        suggestions: Vec::new(),
    }
}

pub fn render_miss(miss: &LookupMiss) -> Rendered {
    let mut rendered = Rendered::new(
        DisplayLevel::Warning,
        format!("⚠️ Unknown {} product '{}'", miss.kind, miss.name),
    );
    rendered.suggestions = miss.suggestions.clone();
    rendered
}

pub fn render_failure(failure: &LoadFailure) -> Rendered {
    let mut rendered = Rendered::new(
        DisplayLevel::Error,
        format!("❌ Compatibility data unavailable: {}", failure.message),
    );
    rendered.notes = Some(failure.suggestion.clone());
    rendered
}

pub fn render_check(response: &CheckResponse) -> Rendered {
    match response {
        CheckResponse::Resolved(outcome) => render_outcome(outcome),
        CheckResponse::Miss(miss) => render_miss(miss),
        CheckResponse::Unavailable(failure) => render_failure(failure),
    }
}

pub fn render_test_request(request: &TestRequest) -> Rendered {
    match request {
        TestRequest::Accepted(pair) => {
            let mut rendered = Rendered::new(
                DisplayLevel::Info,
                format!(
                    "📝 Test request noted for {} (requests are not stored yet)",
                    pair_label(pair)
                ),
            );
            rendered.class = Some(VisualClass::Untested);
            rendered
        }
        TestRequest::AlreadyTested(outcome) => {
            let mut rendered = render_outcome(outcome);
            rendered.level = DisplayLevel::Info;
            rendered.message = format!("{} (already tested)", rendered.message);
            rendered
        }
        TestRequest::Miss(miss) => render_miss(miss),
        TestRequest::Unavailable(failure) => render_failure(failure),
    }
}

/// Selectable product names, as offered to the user.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogView<'a> {
    pub chemicals: Vec<&'a str>,
    pub biologicals: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<DatasetSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Rendered>,
}

pub fn render_catalog(session: &LookupSession) -> CatalogView<'_> {
    CatalogView {
        chemicals: session.chemical_names(),
        biologicals: session.biological_names(),
        summary: (!session.is_degraded()).then(|| session.dataset().summary()),
        error: session.failure().map(render_failure),
    }
}

pub fn format_rendered(rendered: &Rendered, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rendered)?),
        OutputFormat::Text => {
            let tag = match rendered.class {
                Some(class) => class.css_class(),
                None => match rendered.level {
                    DisplayLevel::Success => "success",
                    DisplayLevel::Info => "info",
                    DisplayLevel::Warning => "warning",
                    DisplayLevel::Error => "error",
                },
            };
            let mut lines = vec![format!("[{}] {}", tag, rendered.message)];
            if let Some(notes) = &rendered.notes {
                lines.push(format!("    {}", notes));
            }
            if !rendered.suggestions.is_empty() {
                lines.push(format!("    Did you mean: {}?", rendered.suggestions.join(", ")));
            }
            Ok(lines.join("\n"))
        }
    }
}

pub fn format_catalog(view: &CatalogView<'_>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(view)?),
        OutputFormat::Text => {
            let mut lines = Vec::new();
            if let Some(error) = &view.error {
                lines.push(format_rendered(error, OutputFormat::Text)?);
            }
            lines.push(format!("Chemical products ({}):", view.chemicals.len()));
            lines.extend(view.chemicals.iter().map(|name| format!("  - {}", name)));
            lines.push(format!("Biological products ({}):", view.biologicals.len()));
            lines.extend(view.biologicals.iter().map(|name| format!("  - {}", name)));
            if let Some(summary) = &view.summary {
                lines.push(format!(
                    "{} tested combinations, loaded at {}",
                    summary.compatibilities,
                    summary.loaded_at.format("%Y-%m-%d %H:%M:%S UTC")
                ));
            }
            Ok(lines.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        BiologicalProduct, ChemicalProduct, Dataset, OutcomeDetails, ProductId, ProductKind,
    };
    use crate::utils::error::CompatError;

    fn pair() -> ProductPair {
        ProductPair {
            chemical: ChemicalProduct {
                id: ProductId::new("1"),
                name: "Herbicida X".to_string(),
            },
            biological: BiologicalProduct {
                id: ProductId::new("10"),
                name: "Fungo Y".to_string(),
            },
        }
    }

    #[test]
    fn test_render_compatible() {
        let rendered = render_outcome(&Outcome::Compatible(OutcomeDetails {
            pair: pair(),
            notes: Some("Aplicar em até 2h".to_string()),
        }));

        assert_eq!(rendered.level, DisplayLevel::Success);
        assert_eq!(rendered.class, Some(VisualClass::Compatible));
        assert_eq!(rendered.message, "✅ Herbicida X + Fungo Y: Compatível");

        let text = format_rendered(&rendered, OutputFormat::Text).unwrap();
        assert!(text.starts_with("[compatible] ✅"));
        assert!(text.contains("Aplicar em até 2h"));
    }

    #[test]
    fn test_render_untested_is_warning() {
        let rendered = render_outcome(&Outcome::Untested(pair()));

        assert_eq!(rendered.level, DisplayLevel::Warning);
        assert_eq!(rendered.class, Some(VisualClass::Untested));
    }

    #[test]
    fn test_render_miss_with_suggestions() {
        let rendered = render_miss(&LookupMiss {
            kind: ProductKind::Biological,
            name: "fungo".to_string(),
            suggestions: vec!["Fungo Y".to_string()],
        });

        let text = format_rendered(&rendered, OutputFormat::Text).unwrap();
        assert!(text.starts_with("[warning] ⚠️ Unknown biological product 'fungo'"));
        assert!(text.contains("Did you mean: Fungo Y?"));
    }

    #[test]
    fn test_json_output() {
        let rendered = render_outcome(&Outcome::Incompatible(OutcomeDetails {
            pair: pair(),
            notes: None,
        }));

        let json = format_rendered(&rendered, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["level"], "error");
        assert_eq!(value["class"], "incompatible");
        assert!(value.get("notes").is_none());
    }

    #[test]
    fn test_catalog_of_degraded_session() {
        let session = LookupSession::degraded(&CompatError::ConfigError {
            message: "no sheet".to_string(),
        });

        let view = render_catalog(&session);
        assert!(view.summary.is_none());
        assert!(view.chemicals.is_empty());

        let text = format_catalog(&view, OutputFormat::Text).unwrap();
        assert!(text.starts_with("[error] ❌ Compatibility data unavailable"));
        assert!(text.contains("Chemical products (0):"));
    }

    #[test]
    fn test_catalog_of_ready_session() {
        let p = pair();
        let session = LookupSession::ready(
            Dataset::new(vec![p.chemical], vec![p.biological], vec![]).unwrap(),
        );

        let view = render_catalog(&session);
        let text = format_catalog(&view, OutputFormat::Text).unwrap();

        assert!(text.contains("  - Herbicida X"));
        assert!(text.contains("  - Fungo Y"));
        assert!(text.contains("0 tested combinations"));
    }
}
