use crate::domain::model::{
    CompatibilityResult, Dataset, LookupMiss, Outcome, OutcomeDetails, ProductKind, ProductPair,
};
use crate::utils::text::fold_key;

const MAX_SUGGESTIONS: usize = 5;

/// Resolves two product names against a snapshot.
///
/// Names are trimmed and then matched exactly; when a name appears more than
/// once the first row wins. A pair without a compatibility record is
/// [`Outcome::Untested`]. Only an unknown name produces a [`LookupMiss`],
/// and the chemical name is checked first.
pub fn resolve(
    chemical_name: &str,
    biological_name: &str,
    dataset: &Dataset,
) -> Result<Outcome, LookupMiss> {
    let chemical_name = chemical_name.trim();
    let biological_name = biological_name.trim();

    let chemical = dataset.chemical_by_name(chemical_name).ok_or_else(|| LookupMiss {
        kind: ProductKind::Chemical,
        name: chemical_name.to_string(),
        suggestions: suggest(chemical_name, dataset.chemicals().iter().map(|c| c.name.as_str())),
    })?;

    let biological = dataset
        .biological_by_name(biological_name)
        .ok_or_else(|| LookupMiss {
            kind: ProductKind::Biological,
            name: biological_name.to_string(),
            suggestions: suggest(
                biological_name,
                dataset.biologicals().iter().map(|b| b.name.as_str()),
            ),
        })?;

    let pair = ProductPair {
        chemical: chemical.clone(),
        biological: biological.clone(),
    };

    let outcome = match dataset.record_for(&chemical.id, &biological.id) {
        None => Outcome::Untested(pair),
        Some(record) => {
            let details = OutcomeDetails {
                pair,
                notes: record.notes.clone(),
            };
            match record.result {
                CompatibilityResult::Compatible => Outcome::Compatible(details),
                CompatibilityResult::Incompatible => Outcome::Incompatible(details),
            }
        }
    };

    Ok(outcome)
}

/// Names equal to the input up to case and accents come first, then names
/// that contain it or are contained in it.
fn suggest<'a>(input: &str, names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let needle = fold_key(input);
    if needle.is_empty() {
        return Vec::new();
    }

    let mut exact = Vec::new();
    let mut partial = Vec::new();
    for name in names {
        let key = fold_key(name);
        if key.is_empty() {
            continue;
        }
        if key == needle {
            exact.push(name);
        } else if key.contains(&needle) || needle.contains(&key) {
            partial.push(name);
        }
    }

    let mut suggestions: Vec<String> = Vec::new();
    for name in exact.into_iter().chain(partial) {
        if suggestions.len() == MAX_SUGGESTIONS {
            break;
        }
        if !suggestions.iter().any(|s| s == name) {
            suggestions.push(name.to_string());
        }
    }
    suggestions
}
