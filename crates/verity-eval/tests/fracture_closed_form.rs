use proptest::prelude::*;
use verity_core::{ParameterSnapshot, VerityError};
use verity_eval::{critical_pressure, Evaluator, FractureEvaluator};

mod common;

#[test]
fn griffith_threshold_matches_hand_calculation() -> Result<(), VerityError> {
    let snapshot = common::fracture_snapshot("llzo", 7.0)?;
    let record = FractureEvaluator.evaluate(&snapshot)?;
    let pressure = record.value("critical_pressure_mpa").unwrap();
    let expected = 1.0 / (7.0 * (std::f64::consts::PI * 1e-5).sqrt());
    assert!((pressure - expected).abs() < 1e-12);
    assert!((pressure - 25.4).abs() <= 0.5);
    assert!((record.value("critical_stress_mpa").unwrap() - 7.0 * pressure).abs() < 1e-9);
    assert_eq!(record.snapshot_checksum(), snapshot.checksum());
    Ok(())
}

#[test]
fn weibull_probability_is_zero_below_threshold() -> Result<(), VerityError> {
    let low = FractureEvaluator.evaluate(&common::fracture_snapshot("low", 7.0)?)?;
    assert_eq!(low.value("failure_probability_pct"), Some(0.0));

    let clamped = ParameterSnapshot::builder("clamped")
        .scalar("k_ic", 1.0, "MPa*m^0.5")
        .scalar("flaw_size", 10e-6, "m")
        .scalar("kt", 7.0, "")
        .scalar("operating_pressure", 100.0, "MPa")
        .build()?;
    let high = FractureEvaluator.evaluate(&clamped)?;
    let pct = high.value("failure_probability_pct").unwrap();
    assert!(pct > 99.0 && pct <= 100.0);
    Ok(())
}

#[test]
fn missing_toughness_is_a_parameter_error() -> Result<(), VerityError> {
    let snapshot = ParameterSnapshot::builder("partial")
        .scalar("flaw_size", 10e-6, "m")
        .scalar("kt", 7.0, "")
        .build()?;
    let err = FractureEvaluator.evaluate(&snapshot).unwrap_err();
    assert_eq!(err.code(), verity_core::codes::MISSING_PARAMETER);
    Ok(())
}

proptest! {
    #[test]
    fn evaluation_is_deterministic(k_ic in 0.1f64..5.0, flaw in 1e-7f64..1e-3, kt in 1.0f64..12.0) {
        let snapshot = ParameterSnapshot::builder("sweep")
            .scalar("k_ic", k_ic, "MPa*m^0.5")
            .scalar("flaw_size", flaw, "m")
            .scalar("kt", kt, "")
            .build()
            .unwrap();
        let first = FractureEvaluator.evaluate(&snapshot).unwrap();
        let second = FractureEvaluator.evaluate(&snapshot).unwrap();
        prop_assert_eq!(first.record_hash(), second.record_hash());
        prop_assert_eq!(first.value("critical_pressure_mpa"), Some(critical_pressure(k_ic, flaw, kt)));
    }
}
