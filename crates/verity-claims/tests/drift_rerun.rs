mod common;

use std::sync::Arc;

use common::{
    deflection_snapshot, evaluator_set, fixed_ledger, suppression_registry, suppression_store, verifier,
    DeflectionEvaluator, ScaledEvaluator,
};
use verity_claims::{Claim, ClaimRegistry};
use verity_core::{ParameterStore, SchemaVersion, Tolerance, VerityError};
use verity_eval::EvaluatorSet;
use verity_prov::DriftStatus;

#[test]
fn unchanged_snapshots_never_drift() -> Result<(), VerityError> {
    let deflection = DeflectionEvaluator::default();
    let set = evaluator_set(&deflection)?;
    let registry = suppression_registry(&set)?;
    let store = suppression_store(9.1)?;
    let verifier = verifier(set, 2);
    let mut ledger = fixed_ledger();

    for id in registry.ids() {
        assert_eq!(ledger.check_drift(id), DriftStatus::NeverRecorded);
    }
    verifier.verify(&registry, &store, &mut ledger)?;
    verifier.verify(&registry, &store, &mut ledger)?;
    for id in registry.ids() {
        assert_eq!(ledger.check_drift(id), DriftStatus::Unchanged, "claim {id}");
    }
    ledger.check_consistency()?;
    Ok(())
}

#[test]
fn changing_one_parameter_drifts_only_dependent_claims() -> Result<(), VerityError> {
    let deflection = DeflectionEvaluator::default();
    let set = evaluator_set(&deflection)?;
    let registry = suppression_registry(&set)?;
    let verifier = verifier(set, 2);
    let mut ledger = fixed_ledger();

    let before = verifier.verify(&registry, &suppression_store(9.1)?, &mut ledger)?;
    assert!(before.all_passed());
    let after = verifier.verify(&registry, &suppression_store(15.2)?, &mut ledger)?;
    assert!(!after.all_passed());

    match ledger.check_drift("suppression-factor") {
        DriftStatus::Drifted { old, new } => {
            assert!((old - 115.6 / 9.1).abs() < 1e-12);
            assert!((new - 115.6 / 15.2).abs() < 1e-12);
        }
        other => panic!("expected drift, got {other:?}"),
    }
    assert!(ledger.check_drift("treatment-deflection").is_drifted());
    assert_eq!(ledger.check_drift("critical-pressure"), DriftStatus::Unchanged);
    ledger.check_consistency()?;
    Ok(())
}

fn scaled_set(version: SchemaVersion, factor: f64) -> Result<EvaluatorSet, VerityError> {
    let mut set = EvaluatorSet::new();
    set.register(Arc::new(ScaledEvaluator { version, factor }))?;
    Ok(set)
}

#[test]
fn new_evaluator_version_on_same_snapshot_drifts() -> Result<(), VerityError> {
    let store = ParameterStore::from_snapshots([deflection_snapshot("cell", 10.0)?])?;
    let v1 = scaled_set(SchemaVersion::new(1, 0, 0), 1.0)?;
    let v2 = scaled_set(SchemaVersion::new(2, 0, 0), 3.0)?;
    let mut registry = ClaimRegistry::new();
    registry.register(
        &v1,
        Claim::value("scaled-deflection", "Scaled deflection", 10.0, Tolerance::Absolute(0.5))
            .source("scaled", "scaled_deflection_nm", "cell"),
    )?;
    let mut ledger = fixed_ledger();

    verifier(v1, 1).verify(&registry, &store, &mut ledger)?;
    let revised = verifier(v2, 1);
    for _ in 0..3 {
        revised.verify(&registry, &store, &mut ledger)?;
    }
    assert_eq!(ledger.len(), 4);
    let entries = ledger.entries();
    assert_eq!(entries[0].snapshot_checksum, entries[3].snapshot_checksum);
    assert_ne!(entries[0].evaluators, entries[3].evaluators);

    // Latest two runs share snapshot and evaluator version.
    assert_eq!(ledger.check_drift("scaled-deflection"), DriftStatus::Unchanged);
    ledger.check_consistency()?;
    Ok(())
}

#[test]
fn first_run_under_new_evaluator_version_is_flagged() -> Result<(), VerityError> {
    let store = ParameterStore::from_snapshots([deflection_snapshot("cell", 10.0)?])?;
    let v1 = scaled_set(SchemaVersion::new(1, 0, 0), 1.0)?;
    let v2 = scaled_set(SchemaVersion::new(2, 0, 0), 3.0)?;
    let mut registry = ClaimRegistry::new();
    registry.register(
        &v1,
        Claim::value("scaled-deflection", "Scaled deflection", 10.0, Tolerance::Absolute(0.5))
            .source("scaled", "scaled_deflection_nm", "cell"),
    )?;
    let mut ledger = fixed_ledger();

    verifier(v1, 1).verify(&registry, &store, &mut ledger)?;
    let report = verifier(v2, 1).verify(&registry, &store, &mut ledger)?;
    assert!(!report.all_passed());
    assert_eq!(
        ledger.check_drift("scaled-deflection"),
        DriftStatus::Drifted { old: 10.0, new: 30.0 }
    );
    ledger.check_consistency()?;
    Ok(())
}
