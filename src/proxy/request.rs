//! Inbound scoring request: validation and the outbound envelope.
//!
//! The dashboard posts its form state as loosely typed JSON: coordinates and
//! area may arrive as numbers or numeric strings depending on how the inputs
//! were edited. [`ScoringRequest::from_json`] turns that into a typed value
//! or a [`ProxyError`] naming the offending field. Fields other than the four
//! numeric ones are carried through untouched.

use serde::Serialize;
use serde_json::{Map, Value};

use super::error::ProxyError;

/// Key the scoring service expects the request to be nested under.
pub const ENVELOPE_KEY: &str = "agriFinance";

/// A validated scoring request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub land_area: f64,
    pub yield_estimation_year: i64,
    /// Everything else the caller sent (`region`, `crop_type`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScoringRequest {
    /// Parse and coerce a raw request body.
    pub fn from_json(body: &str) -> Result<Self, ProxyError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| ProxyError::InvalidBody(e.to_string()))?;

        let Value::Object(mut fields) = value else {
            return Err(ProxyError::InvalidBody(
                "expected a JSON object".to_string(),
            ));
        };

        let latitude = coerce_float("latitude", fields.remove("latitude"))?;
        let longitude = coerce_float("longitude", fields.remove("longitude"))?;
        let land_area = coerce_float("land_area", fields.remove("land_area"))?;
        let yield_estimation_year =
            coerce_integer("yield_estimation_year", fields.remove("yield_estimation_year"))?;

        Ok(Self {
            latitude,
            longitude,
            land_area,
            yield_estimation_year,
            extra: fields,
        })
    }

    /// The outbound body: `{ "agriFinance": { ...fields } }`.
    pub fn envelope(&self) -> Value {
        let mut outer = Map::new();
        // Serializing plain f64/i64/Map fields cannot fail
        outer.insert(
            ENVELOPE_KEY.to_string(),
            serde_json::to_value(self).unwrap_or(Value::Null),
        );
        Value::Object(outer)
    }
}

/// Coerce a JSON number or numeric string to a finite `f64`.
fn coerce_float(field: &'static str, value: Option<Value>) -> Result<f64, ProxyError> {
    let parsed = match value {
        None | Some(Value::Null) => return Err(ProxyError::MissingField(field)),
        Some(Value::Number(ref n)) => n.as_f64(),
        Some(Value::String(ref s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match parsed {
        Some(f) if f.is_finite() => Ok(f),
        _ => Err(invalid(field, value)),
    }
}

/// Coerce a JSON number or numeric string to an integer, truncating any
/// fractional part (`"2025.9"` → `2025`).
fn coerce_integer(field: &'static str, value: Option<Value>) -> Result<i64, ProxyError> {
    let parsed = match value {
        None | Some(Value::Null) => return Err(ProxyError::MissingField(field)),
        Some(Value::Number(ref n)) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
        Some(Value::String(ref s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate))
        }
        Some(_) => None,
    };

    parsed.ok_or_else(|| invalid(field, value))
}

fn truncate(f: f64) -> Option<i64> {
    if f.is_finite() && f.abs() < i64::MAX as f64 {
        Some(f.trunc() as i64)
    } else {
        None
    }
}

fn invalid(field: &'static str, value: Option<Value>) -> ProxyError {
    ProxyError::InvalidField {
        field,
        value: value.map(|v| v.to_string()).unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_FORM: &str = r#"{
        "region": "afar",
        "latitude": 8.6,
        "longitude": 36.5,
        "land_area": 2,
        "crop_type": "potato",
        "yield_estimation_year": 2025
    }"#;

    #[test]
    fn parses_numeric_form() {
        let req = ScoringRequest::from_json(DEFAULT_FORM).unwrap();
        assert_eq!(req.latitude, 8.6);
        assert_eq!(req.longitude, 36.5);
        assert_eq!(req.land_area, 2.0);
        assert_eq!(req.yield_estimation_year, 2025);
        assert_eq!(req.extra["region"], "afar");
        assert_eq!(req.extra["crop_type"], "potato");
    }

    #[test]
    fn coerces_numeric_strings() {
        let body = r#"{
            "latitude": "9.03",
            "longitude": " 38.74 ",
            "land_area": "1.5",
            "yield_estimation_year": "2027"
        }"#;
        let req = ScoringRequest::from_json(body).unwrap();
        assert_eq!(req.latitude, 9.03);
        assert_eq!(req.longitude, 38.74);
        assert_eq!(req.land_area, 1.5);
        assert_eq!(req.yield_estimation_year, 2027);
    }

    #[test]
    fn truncates_fractional_year() {
        let body = r#"{"latitude": 1, "longitude": 2, "land_area": 3, "yield_estimation_year": "2025.9"}"#;
        assert_eq!(
            ScoringRequest::from_json(body).unwrap().yield_estimation_year,
            2025
        );

        let body = r#"{"latitude": 1, "longitude": 2, "land_area": 3, "yield_estimation_year": 2026.4}"#;
        assert_eq!(
            ScoringRequest::from_json(body).unwrap().yield_estimation_year,
            2026
        );
    }

    #[test]
    fn missing_latitude_is_reported() {
        let body = r#"{"longitude": 36.5, "land_area": 2, "yield_estimation_year": 2025}"#;
        let err = ScoringRequest::from_json(body).unwrap_err();
        assert!(matches!(err, ProxyError::MissingField("latitude")));
    }

    #[test]
    fn null_field_counts_as_missing() {
        let body = r#"{"latitude": 1, "longitude": null, "land_area": 2, "yield_estimation_year": 2025}"#;
        let err = ScoringRequest::from_json(body).unwrap_err();
        assert!(matches!(err, ProxyError::MissingField("longitude")));
    }

    #[test]
    fn non_numeric_field_is_rejected() {
        let body = r#"{"latitude": 1, "longitude": 2, "land_area": "two", "yield_estimation_year": 2025}"#;
        match ScoringRequest::from_json(body).unwrap_err() {
            ProxyError::InvalidField { field, value } => {
                assert_eq!(field, "land_area");
                assert_eq!(value, "\"two\"");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let body = r#"{"latitude": [1], "longitude": 2, "land_area": 2, "yield_estimation_year": 2025}"#;
        assert!(matches!(
            ScoringRequest::from_json(body).unwrap_err(),
            ProxyError::InvalidField { field: "latitude", .. }
        ));
    }

    #[test]
    fn non_finite_strings_are_rejected() {
        let body = r#"{"latitude": "NaN", "longitude": 2, "land_area": 2, "yield_estimation_year": 2025}"#;
        assert!(matches!(
            ScoringRequest::from_json(body).unwrap_err(),
            ProxyError::InvalidField { field: "latitude", .. }
        ));
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        assert!(matches!(
            ScoringRequest::from_json("[1, 2]").unwrap_err(),
            ProxyError::InvalidBody(_)
        ));
        assert!(matches!(
            ScoringRequest::from_json("not json").unwrap_err(),
            ProxyError::InvalidBody(_)
        ));
        assert!(matches!(
            ScoringRequest::from_json("").unwrap_err(),
            ProxyError::InvalidBody(_)
        ));
    }

    #[test]
    fn envelope_nests_all_fields() {
        let body = r#"{
            "region": "oromia",
            "latitude": "8.6",
            "longitude": 36.5,
            "land_area": "2",
            "crop_type": "teff",
            "yield_estimation_year": "2025",
            "farmer_ref": "A-17"
        }"#;
        let envelope = ScoringRequest::from_json(body).unwrap().envelope();
        let inner = &envelope[ENVELOPE_KEY];

        assert_eq!(envelope.as_object().unwrap().len(), 1);
        assert!(inner["latitude"].is_f64());
        assert!(inner["longitude"].is_f64());
        assert!(inner["land_area"].is_f64());
        assert!(inner["yield_estimation_year"].is_i64());
        assert_eq!(inner["land_area"], 2.0);
        assert_eq!(inner["yield_estimation_year"], 2025);
        assert_eq!(inner["region"], "oromia");
        assert_eq!(inner["crop_type"], "teff");
        assert_eq!(inner["farmer_ref"], "A-17");
    }
}
