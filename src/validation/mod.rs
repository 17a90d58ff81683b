//! Request schema validation
//!
//! Checks a JSON payload against the 25-field observation schema and
//! collects every field error into a nested map of messages:
//!
//! ```json
//! {"koi_period": ["Must be greater than or equal to 0.1 and less than or equal to 10000."]}
//! ```
//!
//! Batch payloads nest item errors under the item index.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::features::{RawObservation, RAW_FEATURE_COUNT};

/// Largest accepted batch
pub const MAX_BATCH_SIZE: usize = 100;

const MISSING: &str = "Missing data for required field.";
const NULL: &str = "Field may not be null.";
const UNKNOWN: &str = "Unknown field.";
const INVALID_TYPE: &str = "Invalid input type.";
const NOT_A_NUMBER: &str = "Not a valid number.";
const NOT_AN_INTEGER: &str = "Not a valid integer.";
const SPECIAL_NUMBER: &str = "Special numeric values (nan or infinity) are not permitted.";
const NOT_A_LIST: &str = "Not a valid list.";
const SCHEMA_KEY: &str = "_schema";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Float,
    Integer,
}

/// One schema entry: name, numeric kind and inclusive range
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub min: f64,
    pub max: f64,
}

const fn float(name: &'static str, min: f64, max: f64) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Float,
        min,
        max,
    }
}

const fn flag(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Integer,
        min: 0.0,
        max: 1.0,
    }
}

/// The observation schema, in canonical column order
pub const OBSERVATION_FIELDS: [FieldSpec; RAW_FEATURE_COUNT] = [
    float("koi_period", 0.1, 10000.0),
    float("koi_prad", 0.1, 100.0),
    float("koi_sma", 0.01, 100.0),
    float("koi_incl", 0.0, 180.0),
    float("koi_teq", 50.0, 5000.0),
    float("koi_insol", 0.001, 100000.0),
    float("koi_impact", 0.0, 2.0),
    float("koi_duration", 0.1, 50.0),
    float("koi_depth", 0.1, 100000.0),
    float("koi_dor", 1.0, 1000.0),
    float("koi_eccen", 0.0, 1.0),
    float("koi_ror", 0.001, 1.0),
    float("koi_steff", 2000.0, 10000.0),
    float("koi_slogg", 3.0, 6.0),
    float("koi_smet", -2.0, 1.0),
    float("koi_srad", 0.1, 10.0),
    float("koi_smass", 0.1, 5.0),
    float("koi_srho", 0.01, 100.0),
    float("koi_num_transits", 1.0, 1000.0),
    float("koi_count", 1.0, 10.0),
    float("koi_model_snr", 0.1, 1000.0),
    flag("koi_fpflag_nt"),
    flag("koi_fpflag_ss"),
    flag("koi_fpflag_co"),
    flag("koi_fpflag_ec"),
];

/// Field-level validation messages, keyed by field name (or item index)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Map<String, Value>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Append a message to a field's list
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let entry = self
            .0
            .entry(field.into())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(list) = entry {
            list.push(Value::String(message.into()));
        }
    }

    /// Attach a nested error map under `key`
    pub fn nest(&mut self, key: impl Into<String>, inner: ValidationErrors) {
        self.0.insert(key.into(), Value::Object(inner.0));
    }

    /// Messages recorded for a field, if it holds a flat list
    pub fn messages(&self, field: &str) -> Vec<&str> {
        match self.0.get(field) {
            Some(Value::Array(list)) => list.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}

impl std::error::Error for ValidationErrors {}

fn range_message(spec: &FieldSpec) -> String {
    format!(
        "Must be greater than or equal to {} and less than or equal to {}.",
        spec.min, spec.max
    )
}

fn coerce_float(value: &Value) -> Result<f64, &'static str> {
    let parsed = match value {
        Value::Number(n) => n.as_f64().ok_or(NOT_A_NUMBER)?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| NOT_A_NUMBER)?,
        _ => return Err(NOT_A_NUMBER),
    };
    if !parsed.is_finite() {
        return Err(SPECIAL_NUMBER);
    }
    Ok(parsed)
}

fn coerce_integer(value: &Value) -> Result<f64, &'static str> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i as f64);
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 => Ok(f),
                _ => Err(NOT_AN_INTEGER),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(|i| i as f64)
            .map_err(|_| NOT_AN_INTEGER),
        _ => Err(NOT_AN_INTEGER),
    }
}

fn check_field(spec: &FieldSpec, value: Option<&Value>) -> Result<f64, String> {
    let value = match value {
        None => return Err(MISSING.to_string()),
        Some(Value::Null) => return Err(NULL.to_string()),
        Some(v) => v,
    };
    let number = match spec.kind {
        FieldKind::Float => coerce_float(value),
        FieldKind::Integer => coerce_integer(value),
    }
    .map_err(str::to_string)?;

    if number < spec.min || number > spec.max {
        return Err(range_message(spec));
    }
    Ok(number)
}

/// Validate one observation payload.
///
/// Every field is checked, so the error map lists all problems at once.
/// Keys outside the schema are rejected.
pub fn validate_observation(payload: &Value) -> Result<RawObservation, ValidationErrors> {
    let object = match payload.as_object() {
        Some(o) => o,
        None => return Err(ValidationErrors::single(SCHEMA_KEY, INVALID_TYPE)),
    };

    let mut errors = ValidationErrors::new();
    let mut values = [0.0; RAW_FEATURE_COUNT];
    for (slot, spec) in values.iter_mut().zip(OBSERVATION_FIELDS.iter()) {
        match check_field(spec, object.get(spec.name)) {
            Ok(v) => *slot = v,
            Err(msg) => errors.add(spec.name, msg),
        }
    }
    for key in object.keys() {
        if !OBSERVATION_FIELDS.iter().any(|s| s.name == key) {
            errors.add(key.clone(), UNKNOWN);
        }
    }

    if errors.is_empty() {
        Ok(RawObservation::from_array(values))
    } else {
        Err(errors)
    }
}

/// Validate a `{"data": [...]}` batch payload holding 1 to
/// [`MAX_BATCH_SIZE`] observations.
pub fn validate_batch(payload: &Value) -> Result<Vec<RawObservation>, ValidationErrors> {
    let object = match payload.as_object() {
        Some(o) => o,
        None => return Err(ValidationErrors::single(SCHEMA_KEY, INVALID_TYPE)),
    };

    let mut errors = ValidationErrors::new();
    for key in object.keys().filter(|k| k.as_str() != "data") {
        errors.add(key.clone(), UNKNOWN);
    }

    let items = match object.get("data") {
        None => {
            errors.add("data", MISSING);
            return Err(errors);
        }
        Some(Value::Null) => {
            errors.add("data", NULL);
            return Err(errors);
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            errors.add("data", NOT_A_LIST);
            return Err(errors);
        }
    };

    let mut item_errors = ValidationErrors::new();
    let mut rows = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        match validate_observation(item) {
            Ok(obs) => rows.push(obs),
            Err(e) => item_errors.nest(idx.to_string(), e),
        }
    }

    if !item_errors.is_empty() {
        errors.nest("data", item_errors);
    } else if items.is_empty() || items.len() > MAX_BATCH_SIZE {
        errors.add(
            "data",
            format!("Length must be between 1 and {}.", MAX_BATCH_SIZE),
        );
    }

    if errors.is_empty() {
        Ok(rows)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::raw_columns;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "koi_period": 41.749, "koi_prad": 2.94, "koi_sma": 0.228, "koi_incl": 89.77,
            "koi_teq": 486.0, "koi_insol": 13.22, "koi_impact": 0.226, "koi_duration": 5.6098,
            "koi_depth": 1055.4, "koi_dor": 57.11, "koi_eccen": 0.0, "koi_ror": 0.029414,
            "koi_steff": 5506.0, "koi_slogg": 4.473, "koi_smet": 0.04, "koi_srad": 0.914,
            "koi_smass": 0.904, "koi_srho": 2.02141, "koi_num_transits": 34.0, "koi_count": 3,
            "koi_model_snr": 95.0, "koi_fpflag_nt": 0, "koi_fpflag_ss": 0, "koi_fpflag_co": 0,
            "koi_fpflag_ec": 0
        })
    }

    #[test]
    fn test_schema_order_matches_columns() {
        let names: Vec<&str> = OBSERVATION_FIELDS.iter().map(|s| s.name).collect();
        assert_eq!(names, raw_columns());
    }

    #[test]
    fn test_valid_sample() {
        let obs = validate_observation(&sample()).unwrap();
        assert_eq!(obs.koi_period, 41.749);
        assert_eq!(obs.koi_count, 3.0);
        assert_eq!(obs.koi_fpflag_ec, 0);
    }

    #[test]
    fn test_missing_fields_all_reported() {
        let errors = validate_observation(&json!({ "koi_period": 41.749 })).unwrap_err();
        assert_eq!(errors.len(), RAW_FEATURE_COUNT - 1);
        assert_eq!(errors.messages("koi_prad"), vec![MISSING]);
        assert!(errors.get("koi_period").is_none());
    }

    #[test]
    fn test_out_of_range() {
        let mut payload = sample();
        payload["koi_period"] = json!(-1);
        let errors = validate_observation(&payload).unwrap_err();
        assert_eq!(
            errors.messages("koi_period"),
            vec!["Must be greater than or equal to 0.1 and less than or equal to 10000."]
        );
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let mut payload = sample();
        payload["koi_incl"] = json!(0);
        payload["koi_smet"] = json!(-2);
        payload["koi_eccen"] = json!(1);
        assert!(validate_observation(&payload).is_ok());
    }

    #[test]
    fn test_type_errors() {
        let mut payload = sample();
        payload["koi_period"] = json!("not_a_number");
        payload["koi_prad"] = json!(true);
        payload["koi_fpflag_nt"] = json!(0.5);
        payload["koi_fpflag_ss"] = json!(null);
        let errors = validate_observation(&payload).unwrap_err();
        assert_eq!(errors.messages("koi_period"), vec![NOT_A_NUMBER]);
        assert_eq!(errors.messages("koi_prad"), vec![NOT_A_NUMBER]);
        assert_eq!(errors.messages("koi_fpflag_nt"), vec![NOT_AN_INTEGER]);
        assert_eq!(errors.messages("koi_fpflag_ss"), vec![NULL]);
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let mut payload = sample();
        payload["koi_period"] = json!(" 41.749 ");
        payload["koi_fpflag_co"] = json!("1");
        payload["koi_fpflag_ec"] = json!(1.0);
        let obs = validate_observation(&payload).unwrap();
        assert_eq!(obs.koi_period, 41.749);
        assert_eq!(obs.koi_fpflag_co, 1);
        assert_eq!(obs.koi_fpflag_ec, 1);
    }

    #[test]
    fn test_special_values_rejected() {
        let mut payload = sample();
        payload["koi_depth"] = json!("nan");
        payload["koi_dor"] = json!("inf");
        let errors = validate_observation(&payload).unwrap_err();
        assert_eq!(errors.messages("koi_depth"), vec![SPECIAL_NUMBER]);
        assert_eq!(errors.messages("koi_dor"), vec![SPECIAL_NUMBER]);
    }

    #[test]
    fn test_unknown_field() {
        let mut payload = sample();
        payload["koi_score"] = json!(0.9);
        let errors = validate_observation(&payload).unwrap_err();
        assert_eq!(errors.messages("koi_score"), vec![UNKNOWN]);
    }

    #[test]
    fn test_non_object() {
        let errors = validate_observation(&json!([1, 2])).unwrap_err();
        assert_eq!(errors.messages("_schema"), vec![INVALID_TYPE]);
    }

    #[test]
    fn test_batch_ok() {
        let rows = validate_batch(&json!({ "data": [sample(), sample()] })).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_batch_length_limits() {
        let errors = validate_batch(&json!({ "data": [] })).unwrap_err();
        assert_eq!(errors.messages("data"), vec!["Length must be between 1 and 100."]);

        let many: Vec<Value> = (0..=MAX_BATCH_SIZE).map(|_| sample()).collect();
        let errors = validate_batch(&json!({ "data": many })).unwrap_err();
        assert_eq!(errors.messages("data"), vec!["Length must be between 1 and 100."]);

        let max: Vec<Value> = (0..MAX_BATCH_SIZE).map(|_| sample()).collect();
        assert_eq!(validate_batch(&json!({ "data": max })).unwrap().len(), MAX_BATCH_SIZE);
    }

    #[test]
    fn test_batch_item_errors_nest_by_index() {
        let mut bad = sample();
        bad["koi_teq"] = json!(10);
        let errors = validate_batch(&json!({ "data": [sample(), bad] })).unwrap_err();
        let nested = errors.get("data").unwrap();
        assert!(nested.get("0").is_none());
        assert_eq!(
            nested["1"]["koi_teq"][0],
            "Must be greater than or equal to 50 and less than or equal to 5000."
        );
    }

    #[test]
    fn test_batch_shape_errors() {
        assert_eq!(
            validate_batch(&json!({})).unwrap_err().messages("data"),
            vec![MISSING]
        );
        assert_eq!(
            validate_batch(&json!({ "data": sample() })).unwrap_err().messages("data"),
            vec![NOT_A_LIST]
        );
        assert_eq!(
            validate_batch(&json!("data")).unwrap_err().messages("_schema"),
            vec![INVALID_TYPE]
        );
    }
}
