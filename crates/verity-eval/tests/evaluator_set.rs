use std::sync::Arc;

use verity_core::{codes, VerityError};
use verity_eval::{EvaluatorSet, FractureEvaluator};

#[test]
fn builtins_resolve_declared_outputs() {
    let set = EvaluatorSet::with_builtins();
    assert_eq!(set.len(), 5);
    assert!(set.resolves("phase_field", "baseline_max_deflection_nm"));
    assert!(set.resolves("degradation", "retention_pct@1000"));
    assert!(!set.resolves("degradation", "retention_pct@"));
    assert!(!set.resolves("degradation", "retention_pct@soon"));
    assert!(!set.resolves("fracture", "critical_pressure"));
    assert!(!set.resolves("lattice", "anything"));
}

#[test]
fn duplicate_identities_are_rejected() -> Result<(), VerityError> {
    let mut set = EvaluatorSet::new();
    set.register(Arc::new(FractureEvaluator))?;
    let err = set.register(Arc::new(FractureEvaluator)).unwrap_err();
    assert_eq!(err.code(), codes::DUPLICATE_EVALUATOR);
    assert_eq!(set.require("nope").err().unwrap().code(), codes::UNKNOWN_EVALUATOR);
    Ok(())
}
