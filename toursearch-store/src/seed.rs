//! Departure seed import.
//!
//! Accepts the upstream departures export, a list of single-key objects
//! (`[{"<external_id>": {...}}]`), or one object keyed by external id.
//! All records are validated before anything is written.

use std::path::Path;

use serde_json::Value;
use toursearch_core::{NewTour, TourError, TourRepository, TourResult, ValidTour};
use tracing::info;

fn records(document: Value) -> TourResult<Vec<(String, Value)>> {
    match document {
        Value::Array(list) => {
            let mut records = Vec::new();
            for entry in list {
                let Value::Object(departure) = entry else {
                    return Err(TourError::Seed("each departure must be an object keyed by external id".to_string()));
                };
                records.extend(departure);
            }
            Ok(records)
        }
        Value::Object(keyed) => Ok(keyed.into_iter().collect()),
        _ => Err(TourError::Seed("expected a list of departures or an object keyed by external id".to_string())),
    }
}

fn validate(external_id: String, attributes: &Value) -> TourResult<ValidTour> {
    let parsed = NewTour::from_json(attributes).and_then(|mut tour| {
        tour.external_id = Some(external_id.clone());
        tour.into_valid()
    });
    parsed.map_err(|errors| TourError::InvalidSeed { external_id, errors })
}

/// Parses and validates a seed document. Fails on the first invalid record,
/// with field errors for values of the wrong type as well as failed rules.
pub fn parse_departures(json: &str) -> TourResult<Vec<ValidTour>> {
    let document: Value = serde_json::from_str(json).map_err(|e| TourError::Seed(e.to_string()))?;

    records(document)?
        .into_iter()
        .map(|(external_id, attributes)| validate(external_id, &attributes))
        .collect()
}

pub async fn import(repo: &dyn TourRepository, tours: &[ValidTour]) -> TourResult<usize> {
    for tour in tours {
        repo.upsert(tour).await?;
    }
    info!("Seeded {} tours", tours.len());
    Ok(tours.len())
}

pub async fn import_file(repo: &dyn TourRepository, path: impl AsRef<Path>) -> TourResult<usize> {
    let path = path.as_ref();
    info!("Importing departures from {}", path.display());
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| TourError::Seed(format!("{}: {}", path.display(), e)))?;
    let tours = parse_departures(&json)?;
    import(repo, &tours).await
}
