use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::entry::ProvenanceEntry;

/// Floating point slack used when comparing a re-verified value with the last
/// published one.
pub const DEFAULT_DRIFT_ROUNDING: f64 = 1e-12;

/// Whether a claim's current value still matches what was last published.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DriftStatus {
    /// Same inputs, or new inputs whose value stayed within tolerance.
    Unchanged,
    /// New inputs moved the value beyond tolerance; the number needs to be
    /// re-published.
    Drifted {
        /// Value recorded by the earlier run.
        old: f64,
        /// Value recorded by the latest run.
        new: f64,
    },
    /// No run has recorded a value for this claim.
    NeverRecorded,
}

impl DriftStatus {
    /// Whether the status asks for human review.
    pub fn is_drifted(&self) -> bool {
        matches!(self, DriftStatus::Drifted { .. })
    }
}

/// Compares the two most recent valued entries of one claim's history.
/// Entries from errored runs carry no value and are skipped. Inputs count as
/// changed when either the snapshot checksum or an evaluator version differs.
pub(crate) fn assess<'a, I>(claim_id: &str, history: I, rounding: f64) -> DriftStatus
where
    I: DoubleEndedIterator<Item = &'a ProvenanceEntry>,
{
    let mut valued = history
        .rev()
        .filter_map(|entry| entry.observed.map(|value| (entry, value)));
    let Some((latest, new)) = valued.next() else {
        return DriftStatus::NeverRecorded;
    };
    let Some((previous, old)) = valued.next() else {
        return DriftStatus::Unchanged;
    };
    if latest.snapshot_checksum == previous.snapshot_checksum
        && latest.evaluators == previous.evaluators
    {
        return DriftStatus::Unchanged;
    }
    if latest.tolerance.drifted(old, new, rounding) {
        warn!(
            claim = claim_id,
            old,
            new,
            checksum = %latest.snapshot_checksum,
            previous_checksum = %previous.snapshot_checksum,
            "published value drifted beyond tolerance"
        );
        DriftStatus::Drifted { old, new }
    } else {
        debug!(claim = claim_id, old, new, "inputs changed; value within tolerance");
        DriftStatus::Unchanged
    }
}
