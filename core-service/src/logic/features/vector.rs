//! Feature Vector - Classifier input
//!
//! Fixed-size values in `FEATURE_LAYOUT` order. Version and hash checks
//! happen once, when a model artifact is validated against the layout.

use super::layout::{feature_index, FEATURE_COUNT};

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    /// All-zero vector
    pub fn new() -> Self {
        Self::from_values([0.0; FEATURE_COUNT])
    }

    pub fn from_values(values: [f32; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn as_array(&self) -> &[f32; FEATURE_COUNT] {
        &self.values
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Value of a named feature; `None` outside the layout
    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        feature_index(name).and_then(|i| self.get(i))
    }

    /// Returns false for names outside the layout
    pub fn set_by_name(&mut self, name: &str, value: f32) -> bool {
        match feature_index(name) {
            Some(index) => {
                self.values[index] = value;
                true
            }
            None => false,
        }
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::new()
    }
}

impl From<[f32; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f32; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        assert!(FeatureVector::new().as_array().iter().all(|v| *v == 0.0));
        assert_eq!(FeatureVector::default(), FeatureVector::new());
    }

    #[test]
    fn test_set_by_name() {
        let mut vector = FeatureVector::new();
        assert!(vector.set_by_name("attendance_rate", 0.85));
        assert_eq!(vector.get_by_name("attendance_rate"), Some(0.85));
        assert_eq!(vector.get(1), Some(0.85));

        assert!(!vector.set_by_name("shoe_size", 1.0));
        assert_eq!(vector.get_by_name("shoe_size"), None);
        assert_eq!(vector.get(FEATURE_COUNT), None);
    }

    #[test]
    fn test_from_array() {
        let vector = FeatureVector::from([2.0; FEATURE_COUNT]);
        assert_eq!(vector.get_by_name("is_first_generation"), Some(2.0));
        assert_eq!(vector.as_slice().len(), FEATURE_COUNT);
    }
}
