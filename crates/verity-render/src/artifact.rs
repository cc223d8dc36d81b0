use serde::{Deserialize, Serialize};
use verity_core::{sha256_hex, EvaluatorStamp};

/// Bytes of one rendered figure plus where they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedArtifact {
    /// File name.
    pub name: String,
    /// Media type (`text/csv`, `application/json`).
    pub media_type: String,
    /// Rendered content.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Hex SHA-256 of `bytes`.
    pub sha256: String,
    /// Evaluator that produced the source record.
    pub evaluator: EvaluatorStamp,
    /// Checksum of the snapshot behind the source record.
    pub source_checksum: String,
    /// Hash of the source record.
    pub record_hash: String,
}

impl RenderedArtifact {
    pub(crate) fn new(
        name: &str,
        media_type: &str,
        bytes: Vec<u8>,
        evaluator: EvaluatorStamp,
        source_checksum: &str,
        record_hash: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            media_type: media_type.to_string(),
            sha256: sha256_hex(&bytes),
            bytes,
            evaluator,
            source_checksum: source_checksum.to_string(),
            record_hash: record_hash.to_string(),
        }
    }
}
