//! Student Records
//!
//! Raw input as received from callers, and the resolved form with defaults
//! applied and values clamped into their domains.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

// ============================================================================
// RAW RECORD
// ============================================================================

/// Raw per-student attributes
///
/// Required fields are `Option` so a missing value surfaces as a
/// `ValidationError` instead of failing deserialization of a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,

    /// Required, 0.0 - 4.0
    #[serde(deserialize_with = "lenient_real")]
    pub current_gpa: Option<f32>,
    /// Required, 0.0 - 1.0
    #[serde(deserialize_with = "lenient_real")]
    pub attendance_rate: Option<f32>,
    /// Required, non-negative
    #[serde(deserialize_with = "lenient_integer")]
    pub total_credits: Option<i64>,

    #[serde(deserialize_with = "lenient_real")]
    pub gpa_trend: Option<f32>,
    /// 1.0 - 5.0
    #[serde(deserialize_with = "lenient_real")]
    pub course_difficulty_avg: Option<f32>,
    #[serde(deserialize_with = "lenient_integer")]
    pub credits_attempted: Option<i64>,
    #[serde(deserialize_with = "lenient_integer")]
    pub age: Option<i64>,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_first_generation: Option<bool>,
}

impl StudentRecord {
    /// Record with only the required fields set
    pub fn new(current_gpa: f32, attendance_rate: f32, total_credits: i64) -> Self {
        Self {
            current_gpa: Some(current_gpa),
            attendance_rate: Some(attendance_rate),
            total_credits: Some(total_credits),
            ..Default::default()
        }
    }

    pub fn with_student_id(mut self, id: impl Into<String>) -> Self {
        self.student_id = Some(id.into());
        self
    }

    /// Map an arbitrary JSON value onto a record
    ///
    /// Wrong types are reported per record; unknown keys are ignored.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ValidationError> {
        if !value.is_object() {
            return Err(ValidationError::Malformed("expected a JSON object".to_string()));
        }
        serde_json::from_value(value.clone()).map_err(|e| ValidationError::Malformed(e.to_string()))
    }

    /// Student id carried by a JSON value, if any
    pub fn json_student_id(value: &serde_json::Value) -> Option<String> {
        match value.get("student_id")? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

// Numbers past the f32 range saturate to +/-f32::MAX so the engineer clamps
// them into their domain instead of seeing an infinity.
fn lenient_real<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.map(|f| f.clamp(f32::MIN as f64, f32::MAX as f64) as f32))
}

// Integral floats like `15.0` are accepted, `15.5` is not. Values past the
// i64 range saturate.
fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Number>::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(i));
            }
            if n.as_u64().is_some() {
                return Ok(Some(i64::MAX));
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 => Ok(Some(f as i64)),
                _ => Err(serde::de::Error::custom(format!("expected an integer, got {}", n))),
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolLike {
    Bool(bool),
    Int(i64),
}

// Accepts `true`/`false` and `1`/`0`.
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<BoolLike>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolLike::Bool(b)) => Ok(Some(b)),
        Some(BoolLike::Int(0)) => Ok(Some(false)),
        Some(BoolLike::Int(1)) => Ok(Some(true)),
        Some(BoolLike::Int(other)) => Err(serde::de::Error::custom(format!(
            "expected a boolean, got {}",
            other
        ))),
    }
}

// ============================================================================
// DEFAULTS
// ============================================================================

/// Values used for absent optional fields
///
/// `credits_attempted` always defaults to `total_credits`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordDefaults {
    pub student_id: String,
    pub gpa_trend: f32,
    pub course_difficulty_avg: f32,
    pub age: u32,
    pub is_first_generation: bool,
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self {
            student_id: "unknown".to_string(),
            gpa_trend: 0.0,
            course_difficulty_avg: 3.0,
            age: 20,
            is_first_generation: false,
        }
    }
}

// ============================================================================
// RESOLVED RECORD
// ============================================================================

/// Record after defaults and domain clamping
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRecord {
    pub student_id: String,
    pub current_gpa: f32,
    pub attendance_rate: f32,
    pub total_credits: u32,
    pub gpa_trend: f32,
    pub course_difficulty_avg: f32,
    pub credits_attempted: u32,
    pub age: u32,
    pub is_first_generation: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_minimal() {
        let record = StudentRecord::from_json(&json!({
            "current_gpa": 3.7,
            "attendance_rate": 0.95,
            "total_credits": 16
        }))
        .unwrap();

        assert_eq!(record, StudentRecord::new(3.7, 0.95, 16));
        assert!(record.student_id.is_none());
    }

    #[test]
    fn test_from_json_missing_required_is_not_a_parse_error() {
        let record = StudentRecord::from_json(&json!({ "student_id": "incomplete" })).unwrap();
        assert_eq!(record.student_id.as_deref(), Some("incomplete"));
        assert!(record.current_gpa.is_none());
        assert!(record.total_credits.is_none());
    }

    #[test]
    fn test_from_json_lenient_numbers() {
        let record = StudentRecord::from_json(&json!({
            "current_gpa": 2,
            "attendance_rate": 1,
            "total_credits": 15.0,
            "is_first_generation": 1,
            "age": null
        }))
        .unwrap();

        assert_eq!(record.current_gpa, Some(2.0));
        assert_eq!(record.total_credits, Some(15));
        assert_eq!(record.is_first_generation, Some(true));
        assert_eq!(record.age, None);
    }

    #[test]
    fn test_from_json_rejects_wrong_types() {
        let err = StudentRecord::from_json(&json!({
            "current_gpa": "high",
            "attendance_rate": 0.9,
            "total_credits": 12
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));

        assert!(StudentRecord::from_json(&json!({ "total_credits": 12.5 })).is_err());
        assert!(StudentRecord::from_json(&json!({ "is_first_generation": 3 })).is_err());
        assert!(StudentRecord::from_json(&json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_from_json_saturates_huge_numbers() {
        let record = StudentRecord::from_json(&json!({
            "current_gpa": 1e39,
            "attendance_rate": -1e300,
            "total_credits": 1e20,
            "credits_attempted": 18446744073709551615u64,
            "age": -1e30
        }))
        .unwrap();

        assert_eq!(record.current_gpa, Some(f32::MAX));
        assert_eq!(record.attendance_rate, Some(f32::MIN));
        assert_eq!(record.total_credits, Some(i64::MAX));
        assert_eq!(record.credits_attempted, Some(i64::MAX));
        assert_eq!(record.age, Some(i64::MIN));
    }

    #[test]
    fn test_json_student_id() {
        assert_eq!(
            StudentRecord::json_student_id(&json!({ "student_id": "s-1" })),
            Some("s-1".to_string())
        );
        assert_eq!(StudentRecord::json_student_id(&json!({ "student_id": 42 })), Some("42".to_string()));
        assert_eq!(StudentRecord::json_student_id(&json!({})), None);
    }

    #[test]
    fn test_defaults() {
        let defaults = RecordDefaults::default();
        assert_eq!(defaults.course_difficulty_avg, 3.0);
        assert_eq!(defaults.age, 20);
        assert!(!defaults.is_first_generation);
    }
}
