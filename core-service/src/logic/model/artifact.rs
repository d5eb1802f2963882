//! Model Artifacts
//!
//! A trained forest arrives as a JSON document produced by the training
//! pipeline. Bytes are checksummed (optional), parsed, then validated
//! against the current feature layout before anything can score with them.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::ModelError;

use super::ensemble::TreeEnsemble;

/// Hex SHA-256 of artifact bytes
pub fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Parse and validate an artifact held in memory
pub fn parse_artifact(bytes: &[u8], expected_sha256: Option<&str>) -> Result<TreeEnsemble, ModelError> {
    if let Some(expected) = expected_sha256 {
        let actual = checksum(bytes);
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            return Err(ModelError::ChecksumMismatch {
                expected: expected.trim().to_lowercase(),
                actual,
            });
        }
    }

    let ensemble: TreeEnsemble = serde_json::from_slice(bytes)?;
    ensemble.validate()?;
    Ok(ensemble)
}

/// Read, parse and validate an artifact file
pub fn read_artifact(path: &Path, expected_sha256: Option<&str>) -> Result<TreeEnsemble, ModelError> {
    let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_artifact(&bytes, expected_sha256)
}
