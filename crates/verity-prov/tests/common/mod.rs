#![allow(dead_code)]

use std::sync::Arc;

use verity_core::{EvaluatorId, EvaluatorStamp, SchemaVersion, Tolerance};
use verity_prov::{EntryDraft, FixedClock, ProvenanceLedger};

pub const STAMP_TIME: &str = "2024-05-01T12:00:00Z";

pub fn fixed_ledger() -> ProvenanceLedger {
    ProvenanceLedger::in_memory().with_clock(Arc::new(FixedClock::new(STAMP_TIME)))
}

pub fn draft(run: &str, claim: &str, checksum: &str, observed: Option<f64>, tolerance: Tolerance) -> EntryDraft {
    EntryDraft {
        run_id: run.to_string(),
        claim_id: claim.to_string(),
        snapshot_checksum: checksum.to_string(),
        evaluators: vec![EvaluatorStamp {
            id: EvaluatorId::new("fracture"),
            version: SchemaVersion::new(1, 0, 0),
        }],
        observed,
        passed: observed.is_some(),
        tolerance,
    }
}
