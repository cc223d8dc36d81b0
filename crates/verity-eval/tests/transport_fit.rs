use proptest::prelude::*;
use verity_core::{codes, VerityError};
use verity_eval::transport::nernst_einstein;
use verity_eval::{Evaluator, TransportEvaluator};

mod common;

#[test]
fn clean_trace_yields_einstein_diffusivity() -> Result<(), VerityError> {
    let snapshot = common::transport_snapshot("md", common::msd_trace(200, 0.06, 0.0))?;
    let record = TransportEvaluator::default().evaluate(&snapshot)?;
    let diffusion = record.value("diffusion_m2_s").unwrap();
    let expected = 0.06 / 6.0 * 1e-8;
    assert!((diffusion - expected).abs() / expected < 1e-9);
    assert!(record.value("r_squared").unwrap() > 0.999_999);

    let density = 56.0 / (2.2 * 1e-27);
    let sigma = nernst_einstein(density, 1.0, expected, 300.0) * 10.0;
    let observed = record.value("conductivity_ms_cm").unwrap();
    assert!((observed - sigma).abs() / sigma < 1e-9);
    assert_eq!(record.value("fit_start_ps"), Some(40.0));
    assert!(record.series("msd").is_some());
    Ok(())
}

#[test]
fn noisy_trace_is_rejected_below_r_squared_floor() -> Result<(), VerityError> {
    let snapshot = common::transport_snapshot("noisy", common::msd_trace(200, 0.01, 5.0))?;
    let err = TransportEvaluator::default().evaluate(&snapshot).unwrap_err();
    assert!(matches!(err, VerityError::Fit(_)));
    assert_eq!(err.code(), codes::INSUFFICIENT_DIFFUSIVE_REGIME);
    Ok(())
}

#[test]
fn uncertainty_reflects_scatter() -> Result<(), VerityError> {
    let snapshot = common::transport_snapshot("wobble", common::msd_trace(200, 0.5, 0.2))?;
    let record = TransportEvaluator::default().evaluate(&snapshot)?;
    let output = record.output("diffusion_m2_s").unwrap();
    let sigma = output.uncertainty.unwrap();
    assert!(sigma > 0.0 && sigma < output.value * 0.05);
    Ok(())
}

#[test]
fn sample_budget_is_enforced() -> Result<(), VerityError> {
    let snapshot = common::transport_snapshot("long", common::msd_trace(64, 0.06, 0.0))?;
    let err = TransportEvaluator::with_budget(32).evaluate(&snapshot).unwrap_err();
    assert_eq!(err.code(), codes::STEP_BUDGET_EXCEEDED);
    Ok(())
}

proptest! {
    #[test]
    fn replay_gives_identical_record(slope in 0.01f64..1.0, wobble in 0.0f64..0.05, samples in 120usize..240) {
        let snapshot = common::transport_snapshot("replay", common::msd_trace(samples, slope, wobble * slope))
            .unwrap();
        let evaluator = TransportEvaluator::default();
        let first = evaluator.evaluate(&snapshot);
        let second = evaluator.evaluate(&snapshot);
        if let (Ok(a), Ok(b)) = (&first, &second) {
            prop_assert_eq!(a.record_hash(), b.record_hash());
        }
        prop_assert_eq!(first, second);
    }
}
