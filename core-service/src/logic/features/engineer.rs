//! Feature Engineer
//!
//! Turns a raw `StudentRecord` into the versioned 15-feature vector.
//! Pure: no I/O, no shared state, no dependency on other records.

use crate::error::{DomainClampWarning, ValidationError};

use super::layout::{
    DIFFICULTY_SMOOTHING, FULL_TIME_CREDITS, HEALTHY_ATTENDANCE, RISK_ATTENDANCE_BELOW,
    RISK_CREDITS_ABOVE, RISK_GPA_BELOW,
};
use super::record::{RecordDefaults, ResolvedRecord, StudentRecord};
use super::vector::FeatureVector;

// ============================================================================
// DOMAINS
// ============================================================================

pub const GPA_RANGE: (f32, f32) = (0.0, 4.0);
pub const ATTENDANCE_RANGE: (f32, f32) = (0.0, 1.0);
pub const DIFFICULTY_RANGE: (f32, f32) = (1.0, 5.0);
/// A term-over-term change can't exceed the GPA scale
pub const TREND_RANGE: (f32, f32) = (-4.0, 4.0);
pub const MIN_AGE: i64 = 1;

/// Output of a detailed derivation
#[derive(Debug, Clone)]
pub struct Derivation {
    pub record: ResolvedRecord,
    pub vector: FeatureVector,
    pub warnings: Vec<DomainClampWarning>,
}

// ============================================================================
// ENGINEER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct FeatureEngineer {
    defaults: RecordDefaults,
}

impl FeatureEngineer {
    pub fn new(defaults: RecordDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &RecordDefaults {
        &self.defaults
    }

    /// Derive the feature vector only
    pub fn derive(&self, record: &StudentRecord) -> Result<FeatureVector, ValidationError> {
        self.derive_detailed(record).map(|d| d.vector)
    }

    /// Derive using the default student id for records without one
    pub fn derive_detailed(&self, record: &StudentRecord) -> Result<Derivation, ValidationError> {
        self.derive_detailed_as(record, &self.defaults.student_id)
    }

    /// Derive, naming id-less records `fallback_id`
    pub fn derive_detailed_as(
        &self,
        record: &StudentRecord,
        fallback_id: &str,
    ) -> Result<Derivation, ValidationError> {
        let (resolved, warnings) = self.resolve(record, fallback_id)?;

        for warning in &warnings {
            log::warn!("Student {}: {}", resolved.student_id, warning);
        }

        let vector = vectorize(&resolved);
        Ok(Derivation { record: resolved, vector, warnings })
    }

    /// Apply defaults, check required fields and clamp into domains
    pub fn resolve(
        &self,
        record: &StudentRecord,
        fallback_id: &str,
    ) -> Result<(ResolvedRecord, Vec<DomainClampWarning>), ValidationError> {
        let gpa = record.current_gpa.ok_or(ValidationError::MissingField("current_gpa"))?;
        let attendance = record
            .attendance_rate
            .ok_or(ValidationError::MissingField("attendance_rate"))?;
        let credits = record
            .total_credits
            .ok_or(ValidationError::MissingField("total_credits"))?;

        let trend = record.gpa_trend.unwrap_or(self.defaults.gpa_trend);
        let difficulty = record
            .course_difficulty_avg
            .unwrap_or(self.defaults.course_difficulty_avg);

        require_finite("current_gpa", gpa)?;
        require_finite("attendance_rate", attendance)?;
        require_finite("gpa_trend", trend)?;
        require_finite("course_difficulty_avg", difficulty)?;

        let mut warnings = Vec::new();

        let total_credits = clamp_count("total_credits", credits, 0, &mut warnings);
        let credits_attempted = match record.credits_attempted {
            Some(attempted) => clamp_count("credits_attempted", attempted, 0, &mut warnings),
            None => total_credits,
        };
        let age = match record.age {
            Some(age) => clamp_count("age", age, MIN_AGE, &mut warnings),
            None => self.defaults.age,
        };

        let resolved = ResolvedRecord {
            student_id: record
                .student_id
                .clone()
                .unwrap_or_else(|| fallback_id.to_string()),
            current_gpa: clamp_real("current_gpa", gpa, GPA_RANGE, &mut warnings),
            attendance_rate: clamp_real("attendance_rate", attendance, ATTENDANCE_RANGE, &mut warnings),
            total_credits,
            gpa_trend: clamp_real("gpa_trend", trend, TREND_RANGE, &mut warnings),
            course_difficulty_avg: clamp_real(
                "course_difficulty_avg",
                difficulty,
                DIFFICULTY_RANGE,
                &mut warnings,
            ),
            credits_attempted,
            age,
            is_first_generation: record
                .is_first_generation
                .unwrap_or(self.defaults.is_first_generation),
        };

        Ok((resolved, warnings))
    }
}

/// Feature formulas, in layout order
pub fn vectorize(record: &ResolvedRecord) -> FeatureVector {
    let gpa = record.current_gpa;
    let attendance = record.attendance_rate;
    let credits = record.total_credits as f32;
    let attempted = record.credits_attempted as f32;
    let trend = record.gpa_trend;
    let difficulty = record.course_difficulty_avg;

    let risk_factor_count = [
        gpa < RISK_GPA_BELOW,
        attendance < RISK_ATTENDANCE_BELOW,
        credits > RISK_CREDITS_ABOVE,
    ]
    .iter()
    .filter(|hit| **hit)
    .count() as f32;

    FeatureVector::from_values([
        gpa,
        attendance,
        credits,
        trend,
        attendance * gpa,
        gpa / (difficulty + DIFFICULTY_SMOOTHING),
        difficulty,
        attempted,
        flag(credits >= FULL_TIME_CREDITS),
        (gpa + trend).clamp(GPA_RANGE.0, GPA_RANGE.1),
        flag(attendance >= HEALTHY_ATTENDANCE),
        attempted / credits.max(1.0),
        risk_factor_count,
        record.age as f32,
        flag(record.is_first_generation),
    ])
}

fn flag(condition: bool) -> f32 {
    if condition { 1.0 } else { 0.0 }
}

fn require_finite(field: &'static str, value: f32) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFinite { field })
    }
}

fn clamp_real(
    field: &'static str,
    value: f32,
    (min, max): (f32, f32),
    warnings: &mut Vec<DomainClampWarning>,
) -> f32 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        warnings.push(DomainClampWarning {
            field,
            value: value as f64,
            clamped_to: clamped as f64,
        });
    }
    clamped
}

fn clamp_count(field: &'static str, value: i64, min: i64, warnings: &mut Vec<DomainClampWarning>) -> u32 {
    let clamped = value.clamp(min, u32::MAX as i64);
    if clamped != value {
        warnings.push(DomainClampWarning {
            field,
            value: value as f64,
            clamped_to: clamped as f64,
        });
    }
    clamped as u32
}
