use serde::{Deserialize, Serialize};
use verity_core::{EvaluatorStamp, Tolerance};

/// One ledger line: which run produced which value for which claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    /// Position in the ledger, starting at 1.
    pub sequence: u64,
    /// Verification run that appended the entry.
    pub run_id: String,
    /// Claim the value was published under.
    pub claim_id: String,
    /// Checksum over every snapshot the claim's sources cite.
    pub snapshot_checksum: String,
    /// Evaluators (identity and version) that fed the value.
    pub evaluators: Vec<EvaluatorStamp>,
    /// Observed value; absent when the claim errored before producing one.
    #[serde(default)]
    pub observed: Option<f64>,
    /// Whether the claim passed in that run.
    pub passed: bool,
    /// Tolerance in force, kept so drift can be recomputed offline.
    pub tolerance: Tolerance,
    /// RFC 3339 time of the append.
    pub timestamp: String,
}

/// Entry contents supplied by the caller; the ledger assigns sequence and time.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    /// Verification run id.
    pub run_id: String,
    /// Claim id.
    pub claim_id: String,
    /// Combined snapshot checksum.
    pub snapshot_checksum: String,
    /// Contributing evaluators.
    pub evaluators: Vec<EvaluatorStamp>,
    /// Observed value, if any.
    pub observed: Option<f64>,
    /// Pass flag.
    pub passed: bool,
    /// Tolerance policy.
    pub tolerance: Tolerance,
}

impl EntryDraft {
    pub(crate) fn seal(self, sequence: u64, timestamp: String) -> ProvenanceEntry {
        ProvenanceEntry {
            sequence,
            run_id: self.run_id,
            claim_id: self.claim_id,
            snapshot_checksum: self.snapshot_checksum,
            evaluators: self.evaluators,
            observed: self.observed,
            passed: self.passed,
            tolerance: self.tolerance,
            timestamp,
        }
    }
}
