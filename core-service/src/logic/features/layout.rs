//! Feature Layout
//!
//! Input contract between the feature engineer and trained forests. Adding,
//! reordering or re-deriving a feature bumps `FEATURE_VERSION`; forests carry
//! the version and hash they were trained on and are refused on mismatch.

use crc32fast::Hasher;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Academic standing (0-3) ===
    "current_gpa",                // 0: GPA, clamped to 0.0-4.0
    "attendance_rate",            // 1: Attendance, clamped to 0.0-1.0
    "total_credits",              // 2: Current credit load
    "gpa_trend",                  // 3: Signed GPA change vs previous term

    // === Interactions (4-6) ===
    "attendance_gpa_interaction", // 4: attendance * gpa
    "gpa_difficulty_interaction", // 5: gpa / (difficulty + 0.1)
    "course_difficulty_avg",      // 6: Mean course difficulty, 1.0-5.0

    // === Load (7-8) ===
    "credits_attempted",          // 7: Credits attempted
    "credit_load_status",         // 8: 1 if full-time load (>= 15 credits)

    // === Derived indicators (9-12) ===
    "projected_gpa",              // 9: gpa + trend, clamped to 0.0-4.0
    "attendance_status",          // 10: 1 if attendance >= 0.8
    "credit_load_ratio",          // 11: attempted / max(total, 1)
    "risk_factor_count",          // 12: Count of hard risk indicators

    // === Demographics (13-14) ===
    "age",                        // 13: Age in years
    "is_first_generation",        // 14: 1 if first-generation student
];

/// Total number of features
pub const FEATURE_COUNT: usize = 15;

// ============================================================================
// DERIVATION CONSTANTS (part of the layout contract)
// ============================================================================

/// Smoothing added to difficulty before dividing
pub const DIFFICULTY_SMOOTHING: f32 = 0.1;

/// Full-time credit load
pub const FULL_TIME_CREDITS: f32 = 15.0;

/// Attendance considered healthy
pub const HEALTHY_ATTENDANCE: f32 = 0.8;

/// Risk factor cut-offs counted in `risk_factor_count`
pub const RISK_GPA_BELOW: f32 = 2.5;
pub const RISK_ATTENDANCE_BELOW: f32 = 0.7;
pub const RISK_CREDITS_ABOVE: f32 = 18.0;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the version byte and the NUL-separated feature names
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);
    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// A forest was trained against another layout
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), got v{actual_version} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

pub fn validate_layout(version: u8, hash: u32) -> Result<(), LayoutMismatchError> {
    let expected_hash = layout_hash();
    if version == FEATURE_VERSION && hash == expected_hash {
        return Ok(());
    }
    Err(LayoutMismatchError {
        expected_version: FEATURE_VERSION,
        expected_hash,
        actual_version: version,
        actual_hash: hash,
    })
}

/// Position of a named feature in the layout
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_size() {
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_hash_tracks_version() {
        let err = validate_layout(FEATURE_VERSION + 1, layout_hash()).unwrap_err();
        assert_eq!(err.actual_version, FEATURE_VERSION + 1);
        assert!(validate_layout(FEATURE_VERSION, layout_hash()).is_ok());

        let err = validate_layout(FEATURE_VERSION, layout_hash().wrapping_add(1)).unwrap_err();
        assert_eq!(err.expected_hash, layout_hash());
        assert!(err.to_string().contains("layout mismatch"));
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("current_gpa"), Some(0));
        assert_eq!(feature_index("credit_load_ratio"), Some(11));
        assert_eq!(feature_index("is_first_generation"), Some(14));
        assert_eq!(feature_index("shoe_size"), None);
    }
}
