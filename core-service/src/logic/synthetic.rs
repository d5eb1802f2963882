//! Synthetic Cohorts
//!
//! Seeded generator of plausible student records for demos, load tests and
//! batch tests. Same seed, same cohort.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::logic::features::StudentRecord;

/// Spread of the term-over-term GPA change
pub const TREND_STD_DEV: f32 = 0.2;

/// Share of first-generation students
pub const FIRST_GENERATION_SHARE: f64 = 0.3;

/// Generate `n` records from `seed`
pub fn generate_cohort(n: usize, seed: u64) -> Vec<StudentRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|i| generate_student(&mut rng, i)).collect()
}

fn generate_student(rng: &mut StdRng, index: usize) -> StudentRecord {
    let total_credits: i64 = rng.gen_range(0..18);
    let z: f32 = rng.sample(StandardNormal);

    StudentRecord {
        student_id: Some(format!("synthetic_{:05}", index + 1)),
        current_gpa: Some(rng.gen_range(0.0..4.0)),
        attendance_rate: Some(rng.gen_range(0.5..1.0)),
        total_credits: Some(total_credits),
        gpa_trend: Some(z * TREND_STD_DEV),
        course_difficulty_avg: Some(rng.gen_range(1.5..4.5)),
        credits_attempted: Some(total_credits + rng.gen_range(0..=3)),
        age: Some(rng.gen_range(18..30)),
        is_first_generation: Some(rng.gen_bool(FIRST_GENERATION_SHARE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FeatureEngineer;

    #[test]
    fn test_same_seed_same_cohort() {
        assert_eq!(generate_cohort(50, 42), generate_cohort(50, 42));
        assert_ne!(generate_cohort(50, 42), generate_cohort(50, 43));
    }

    #[test]
    fn test_records_are_complete_and_in_domain() {
        let engineer = FeatureEngineer::default();
        for record in generate_cohort(500, 7) {
            let derived = engineer.derive_detailed(&record).unwrap();
            assert!(derived.warnings.is_empty(), "{:?}", derived.warnings);

            let credits = record.total_credits.unwrap();
            assert!((0..18).contains(&credits));
            assert!(record.credits_attempted.unwrap() >= credits);
            assert!((18..30).contains(&record.age.unwrap()));
        }
    }

    #[test]
    fn test_ids_follow_position() {
        let cohort = generate_cohort(3, 1);
        assert_eq!(cohort[2].student_id.as_deref(), Some("synthetic_00003"));
    }
}
