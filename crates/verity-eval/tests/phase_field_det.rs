use verity_core::{codes, VerityError};
use verity_eval::phase_field::trap_threshold_mpa;
use verity_eval::{Evaluator, PhaseFieldEvaluator};

mod common;

#[test]
fn replay_is_bit_identical() -> Result<(), VerityError> {
    let snapshot = common::phase_field_snapshot("pf", 400.0)?;
    let evaluator = PhaseFieldEvaluator::default();
    let first = evaluator.evaluate(&snapshot)?;
    let second = evaluator.evaluate(&snapshot)?;
    assert_eq!(first, second);
    assert_eq!(first.record_hash(), second.record_hash());
    Ok(())
}

#[test]
fn graded_stiffness_suppresses_deflection() -> Result<(), VerityError> {
    let snapshot = common::phase_field_snapshot("pf", 1500.0)?;
    let record = PhaseFieldEvaluator::default().evaluate(&snapshot)?;
    let baseline = record.value("baseline_max_deflection_nm").unwrap();
    let treatment = record.value("treatment_max_deflection_nm").unwrap();
    assert!(baseline > 0.0);
    assert!(treatment < baseline);
    assert!(
        record.value("treatment_penetration_pct").unwrap()
            < record.value("baseline_penetration_pct").unwrap()
    );
    assert_eq!(record.series("baseline_front").map(|s| s.len()), Some(24));
    Ok(())
}

#[test]
fn runaway_front_is_reported_as_divergence() -> Result<(), VerityError> {
    let snapshot = common::phase_field_snapshot("runaway", 4000.0)?
        .to_builder("runaway")
        .scalar("driving_force", 3.0, "")
        .build()?;
    let err = PhaseFieldEvaluator::default().evaluate(&snapshot).unwrap_err();
    assert!(matches!(err, VerityError::Simulation(_)));
    assert_eq!(err.code(), codes::DIVERGED_SIMULATION);
    Ok(())
}

#[test]
fn unstable_time_step_is_refused() -> Result<(), VerityError> {
    let snapshot = common::phase_field_snapshot("coarse", 10.0)?
        .to_builder("coarse")
        .scalar("dt", 0.2, "")
        .build()?;
    let err = PhaseFieldEvaluator::default().evaluate(&snapshot).unwrap_err();
    assert_eq!(err.code(), codes::DIVERGED_SIMULATION);
    Ok(())
}

#[test]
fn step_budget_is_enforced() -> Result<(), VerityError> {
    let snapshot = common::phase_field_snapshot("long", 5000.0)?;
    let err = PhaseFieldEvaluator::with_budget(1000).evaluate(&snapshot).unwrap_err();
    assert_eq!(err.code(), codes::STEP_BUDGET_EXCEEDED);
    Ok(())
}

#[test]
fn trap_threshold_is_faraday_over_molar_volume() {
    let threshold = trap_threshold_mpa(0.05, 13e-6);
    assert!((threshold - 371.1).abs() < 0.1);
}
