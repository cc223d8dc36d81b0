use proptest::prelude::*;
use verity_core::{codes, VerityError};
use verity_eval::{DegradationEvaluator, Evaluator};

mod common;

#[test]
fn retention_starts_full_and_never_rises() -> Result<(), VerityError> {
    let snapshot = common::degradation_snapshot("baseline", 2000.0, 7.0, 0.0)?;
    let record = DegradationEvaluator::default().evaluate(&snapshot)?;
    assert_eq!(record.value("retention_pct@0"), Some(100.0));
    let at_500 = record.value("retention_pct@500").unwrap();
    let at_1000 = record.value("retention_pct@1000").unwrap();
    assert!(at_1000 <= at_500);
    assert!(record.value("retention_pct@1234").is_some());

    let curve = record.series("retention").unwrap();
    assert!(curve.points.windows(2).all(|pair| pair[1][1] <= pair[0][1]));
    assert_eq!(curve.points.last().map(|point| point[0]), Some(2000.0));
    assert_eq!(
        record.value("final_retention_pct"),
        record.value("retention_pct@2000")
    );
    Ok(())
}

#[test]
fn constrained_architecture_degrades_less() -> Result<(), VerityError> {
    let evaluator = DegradationEvaluator::default();
    let baseline = evaluator.evaluate(&common::degradation_snapshot("baseline", 2000.0, 7.0, 0.0)?)?;
    let lattice = evaluator.evaluate(&common::degradation_snapshot("lattice", 2000.0, 2.0, 6.7)?)?;
    assert!(lattice.value("final_retention_pct") > baseline.value("final_retention_pct"));
    assert_eq!(baseline.value("cycling_stress_mpa"), Some(14.0));
    assert!((lattice.value("dendrite_barrier_mpa").unwrap() - 8.375).abs() < 1e-9);
    Ok(())
}

#[test]
fn checkpoint_outputs_depend_on_simulated_cycles() -> Result<(), VerityError> {
    let evaluator = DegradationEvaluator::default();
    let snapshot = common::degradation_snapshot("cell", 2000.0, 7.0, 0.0)?;
    assert!(evaluator.produces("retention_pct@1234", &snapshot));
    assert!(evaluator.produces("retention_pct@2000", &snapshot));
    assert!(!evaluator.produces("retention_pct@5000", &snapshot));
    assert!(!evaluator.produces("retention_pct@75", &snapshot));
    assert!(evaluator.produces("final_retention_pct", &snapshot));

    let record = evaluator.evaluate(&snapshot)?;
    assert!(record.value("retention_pct@1234").is_some());
    assert!(record.value("retention_pct@5000").is_none());
    Ok(())
}

#[test]
fn seeded_mode_is_reproducible() -> Result<(), VerityError> {
    let snapshot = common::degradation_snapshot("seeded", 1500.0, 7.0, 0.0)?
        .to_builder("seeded")
        .scalar("seed", 42.0, "")
        .build()?;
    let evaluator = DegradationEvaluator::default();
    let first = evaluator.evaluate(&snapshot)?;
    let second = evaluator.evaluate(&snapshot)?;
    assert_eq!(first, second);
    let events = first.value("dendrite_events").unwrap();
    assert_eq!(events.fract(), 0.0);
    Ok(())
}

#[test]
fn checkpoints_beyond_the_run_are_rejected() -> Result<(), VerityError> {
    let snapshot = common::degradation_snapshot("short", 800.0, 7.0, 0.0)?;
    let err = DegradationEvaluator::default().evaluate(&snapshot).unwrap_err();
    assert_eq!(err.code(), codes::INVALID_PARAMETER);
    Ok(())
}

#[test]
fn cycle_budget_is_enforced() -> Result<(), VerityError> {
    let snapshot = common::degradation_snapshot("long", 2000.0, 7.0, 0.0)?;
    let err = DegradationEvaluator::with_budget(1000).evaluate(&snapshot).unwrap_err();
    assert_eq!(err.code(), codes::STEP_BUDGET_EXCEEDED);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn unseeded_replay_gives_identical_record(
        cycles in 1234u32..3000,
        kt in 1.0f64..10.0,
        k_constraint in 0.0f64..8.0,
    ) {
        let snapshot = common::degradation_snapshot("replay", f64::from(cycles), kt, k_constraint).unwrap();
        prop_assert!(snapshot.get("seed").is_none());
        let evaluator = DegradationEvaluator::default();
        let first = evaluator.evaluate(&snapshot);
        let second = evaluator.evaluate(&snapshot);
        if let (Ok(a), Ok(b)) = (&first, &second) {
            prop_assert_eq!(a.record_hash(), b.record_hash());
        }
        prop_assert_eq!(first, second);
    }
}
