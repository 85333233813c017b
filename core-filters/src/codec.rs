//! Wire codec for filter records
//!
//! A filter is stored as a flat record of strings keyed by its id:
//!
//! ```json
//! {
//!   "6F1C...": {
//!     "owner": "user-1",
//!     "alias": "시안",
//!     "systemName": "CIColorMonochrome",
//!     "inputColor": "0 1 1 1",
//!     "inputIntensity": "1.0",
//!     "inputLevels": "0.0",
//!     "inputRadius": "0.0"
//!   }
//! }
//! ```
//!
//! Every field is always written. Numbers the kind does not use are written
//! as `"0.0"` and an unused color as `"0 0 0 0"`. Decoding only reads the
//! fields the kind declares and rebuilds the filter through the catalog, so
//! stored records get the same validation as new filters.

use crate::catalog::FilterCatalog;
use crate::error::{FilterError, Result};
use crate::models::{
    CameraFilter, Color, FilterId, FilterKind, ParameterKey, ParameterValue, Parameters,
};
use core_runtime::document::Documents;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Stored form of a filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRecord {
    pub owner: String,
    pub alias: String,
    pub system_name: String,
    #[serde(default)]
    pub input_color: Option<String>,
    #[serde(default)]
    pub input_intensity: Option<String>,
    #[serde(default)]
    pub input_levels: Option<String>,
    #[serde(default)]
    pub input_radius: Option<String>,
}

impl FilterRecord {
    pub fn from_filter(owner: &str, filter: &CameraFilter) -> Self {
        let number = |value: Option<f32>| format_number(value.unwrap_or(0.0));
        Self {
            owner: owner.to_string(),
            alias: filter.display_name().to_string(),
            system_name: filter.system_name().to_string(),
            input_color: Some(filter.color().unwrap_or(Color::ZERO).to_string()),
            input_intensity: Some(number(filter.intensity())),
            input_levels: Some(number(filter.levels())),
            input_radius: Some(number(filter.radius())),
        }
    }

    fn field(&self, key: ParameterKey) -> Option<&str> {
        match key {
            ParameterKey::Color => self.input_color.as_deref(),
            ParameterKey::Intensity => self.input_intensity.as_deref(),
            ParameterKey::Radius => self.input_radius.as_deref(),
            ParameterKey::Levels => self.input_levels.as_deref(),
        }
    }
}

/// Write a number with at least one fractional digit (`1.0`, `0.5`).
pub fn format_number(value: f32) -> String {
    format!("{:?}", value)
}

/// Encode a filter as its stored record
pub fn encode(owner: &str, filter: &CameraFilter) -> Value {
    // A struct of strings always serializes.
    serde_json::to_value(FilterRecord::from_filter(owner, filter)).unwrap_or(Value::Null)
}

/// Encode a filter as a single-entry document map `{ "<id>": record }`
pub fn encode_document(owner: &str, filter: &CameraFilter) -> Documents {
    let mut documents = Documents::new();
    documents.insert(filter.id().to_string(), encode(owner, filter));
    documents
}

/// Decode one stored record
///
/// # Errors
///
/// [`FilterError::InvalidRecord`] when the record is not an object of
/// strings, the system name is unknown, or a field the kind needs is
/// missing or malformed.
pub fn decode(catalog: &FilterCatalog, id: &str, value: &Value) -> Result<CameraFilter> {
    let invalid = |message: String| FilterError::InvalidRecord {
        id: id.to_string(),
        message,
    };

    let filter_id = FilterId::from_string(id)?;
    let record: FilterRecord =
        serde_json::from_value(value.clone()).map_err(|e| invalid(e.to_string()))?;

    let kind = FilterKind::from_system_name(&record.system_name)
        .ok_or_else(|| invalid(format!("unknown systemName '{}'", record.system_name)))?;

    let mut parameters = Parameters::new();
    for &key in kind.parameter_keys() {
        let raw = record
            .field(key)
            .ok_or_else(|| invalid(format!("missing field '{}'", key.input_key())))?;
        let value: ParameterValue = if key == ParameterKey::Color {
            raw.parse::<Color>()
                .map_err(|e| invalid(format!("{}: {}", key.input_key(), e)))?
                .into()
        } else {
            raw.trim()
                .parse::<f32>()
                .map_err(|e| invalid(format!("{} '{}': {}", key.input_key(), raw, e)))?
                .into()
        };
        parameters.insert(key, value);
    }

    catalog
        .build(filter_id, record.alias, kind, &parameters)
        .map_err(|e| match e {
            FilterError::InvalidRecord { .. } => e,
            other => invalid(other.to_string()),
        })
}

/// Decode every record of a query result
///
/// The first bad record fails the whole batch.
pub fn decode_documents(catalog: &FilterCatalog, documents: &Documents) -> Result<Vec<CameraFilter>> {
    documents
        .iter()
        .map(|(id, value)| {
            decode(catalog, id, value).map_err(|e| {
                warn!(filter_id = %id, error = %e, "Discarding fetch with undecodable record");
                e
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::CpuFilterBackend;
    use serde_json::json;
    use std::sync::Arc;

    const CYAN_ID: &str = "0C7B8F0A-8E0B-4D7E-9A55-3C5A3D0F4C11";

    fn catalog() -> FilterCatalog {
        FilterCatalog::new(Arc::new(CpuFilterBackend::new()))
    }

    fn cyan_record() -> Value {
        json!({
            "owner": "user-1",
            "alias": "시안",
            "systemName": "CIColorMonochrome",
            "inputColor": "0 1 1 1",
            "inputIntensity": "1.0",
            "inputLevels": "0.0",
            "inputRadius": "0.0"
        })
    }

    #[test]
    fn test_format_number_keeps_fraction() {
        assert_eq!(format_number(1.0), "1.0");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(10.0), "10.0");
        assert_eq!(format_number(0.0), "0.0");
    }

    #[test]
    fn test_decode_cyan_monochrome() {
        let filter = decode(&catalog(), CYAN_ID, &cyan_record()).unwrap();

        assert_eq!(filter.id().as_str(), CYAN_ID);
        assert_eq!(filter.display_name(), "시안");
        assert_eq!(filter.kind(), FilterKind::Monochrome);
        assert_eq!(filter.color(), Some(Color::CYAN));
        assert_eq!(filter.intensity(), Some(1.0));
    }

    #[test]
    fn test_cyan_round_trip_is_byte_identical() {
        let catalog = catalog();
        let filter = decode(&catalog, CYAN_ID, &cyan_record()).unwrap();

        assert_eq!(encode("user-1", &filter), cyan_record());

        let documents = encode_document("user-1", &filter);
        let again = decode_documents(&catalog, &documents).unwrap();
        assert_eq!(again, vec![filter]);
    }

    #[test]
    fn test_encode_fills_absent_fields() {
        let filter = catalog().blur("soft", 4.5).unwrap();
        let value = encode("owner-7", &filter);

        assert_eq!(value["systemName"], "CIBoxBlur");
        assert_eq!(value["inputRadius"], "4.5");
        assert_eq!(value["inputIntensity"], "0.0");
        assert_eq!(value["inputLevels"], "0.0");
        assert_eq!(value["inputColor"], "0 0 0 0");
        assert_eq!(value["owner"], "owner-7");
    }

    #[test]
    fn test_decode_ignores_fields_of_other_kinds() {
        let value = json!({
            "owner": "u",
            "alias": "old film",
            "systemName": "CIPhotoEffectTransfer",
            "inputIntensity": "garbage"
        });
        let filter = decode(&catalog(), "abc", &value).unwrap();
        assert_eq!(filter.kind(), FilterKind::Vintage);
        assert!(filter.parameters().is_empty());
    }

    #[test]
    fn test_decode_failures_are_invalid_record() {
        let catalog = catalog();
        let cases = vec![
            json!({ "owner": "u", "alias": "x", "systemName": "CIUnknown" }),
            json!({ "owner": "u", "alias": "x", "systemName": "CISepiaTone" }),
            json!({ "owner": "u", "alias": "x", "systemName": "CISepiaTone", "inputIntensity": "lots" }),
            json!({ "owner": "u", "alias": "x", "systemName": "CISepiaTone", "inputIntensity": "3.0" }),
            json!({ "owner": "u", "systemName": "CISepiaTone", "inputIntensity": "0.5" }),
            json!("not a record"),
        ];

        for value in cases {
            let err = decode(&catalog, "abc", &value).unwrap_err();
            assert!(
                matches!(err, FilterError::InvalidRecord { ref id, .. } if id == "abc"),
                "{:?} -> {:?}",
                value,
                err
            );
        }
    }

    #[test]
    fn test_one_bad_record_fails_the_batch() {
        let catalog = catalog();
        let mut documents = encode_document("u", &catalog.sepia("warm", 0.4).unwrap());
        documents.insert("bad".to_string(), json!({ "owner": "u" }));

        assert!(decode_documents(&catalog, &documents).is_err());
    }
}
