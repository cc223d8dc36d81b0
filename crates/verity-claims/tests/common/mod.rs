#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use verity_claims::{CancelToken, Claim, ClaimRegistry, Verifier, VerifyPolicy};
use verity_core::{
    EvaluatorId, EvaluatorStamp, ParameterSnapshot, ParameterStore, ResultRecord, SchemaVersion,
    Tolerance, VerityError,
};
use verity_eval::{Evaluator, EvaluatorSet, OutputDecl};
use verity_prov::{FixedClock, ProvenanceLedger};

const DEFLECTION_OUTPUTS: &[OutputDecl] = &[OutputDecl::exact("max_deflection_nm", "nm")];

/// Echoes the `deflection` parameter and counts invocations.
#[derive(Debug, Clone, Default)]
pub struct DeflectionEvaluator {
    pub calls: Arc<AtomicUsize>,
}

impl DeflectionEvaluator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Evaluator for DeflectionEvaluator {
    fn stamp(&self) -> EvaluatorStamp {
        EvaluatorStamp {
            id: EvaluatorId::new("deflection"),
            version: SchemaVersion::new(0, 1, 0),
        }
    }

    fn outputs(&self) -> &[OutputDecl] {
        DEFLECTION_OUTPUTS
    }

    fn step_budget(&self) -> u64 {
        1
    }

    fn evaluate(&self, snapshot: &ParameterSnapshot) -> Result<ResultRecord, VerityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let deflection = snapshot.scalar("deflection")?;
        ResultRecord::builder(self.stamp(), snapshot.checksum())
            .output("max_deflection_nm", deflection, "nm")
            .build()
    }
}

const UNSTABLE_OUTPUTS: &[OutputDecl] = &[OutputDecl::exact("value", "")];

/// Always diverges.
#[derive(Debug, Clone, Default)]
pub struct UnstableEvaluator;

impl Evaluator for UnstableEvaluator {
    fn stamp(&self) -> EvaluatorStamp {
        EvaluatorStamp {
            id: EvaluatorId::new("unstable"),
            version: SchemaVersion::new(0, 1, 0),
        }
    }

    fn outputs(&self) -> &[OutputDecl] {
        UNSTABLE_OUTPUTS
    }

    fn step_budget(&self) -> u64 {
        1
    }

    fn evaluate(&self, _snapshot: &ParameterSnapshot) -> Result<ResultRecord, VerityError> {
        Err(VerityError::diverged("interface left the domain"))
    }
}

/// Requests cancellation while it runs, then completes normally.
#[derive(Debug, Clone, Default)]
pub struct CancellingEvaluator {
    pub token: CancelToken,
    pub calls: Arc<AtomicUsize>,
}

impl Evaluator for CancellingEvaluator {
    fn stamp(&self) -> EvaluatorStamp {
        EvaluatorStamp {
            id: EvaluatorId::new("cancelling"),
            version: SchemaVersion::new(0, 1, 0),
        }
    }

    fn outputs(&self) -> &[OutputDecl] {
        UNSTABLE_OUTPUTS
    }

    fn step_budget(&self) -> u64 {
        1
    }

    fn evaluate(&self, snapshot: &ParameterSnapshot) -> Result<ResultRecord, VerityError> {
        self.token.cancel();
        self.calls.fetch_add(1, Ordering::SeqCst);
        ResultRecord::builder(self.stamp(), snapshot.checksum())
            .output("value", 1.0, "")
            .build()
    }
}

const SCALED_OUTPUTS: &[OutputDecl] = &[OutputDecl::exact("scaled_deflection_nm", "nm")];

/// Scales the `deflection` parameter; each model revision bumps `version`.
#[derive(Debug, Clone)]
pub struct ScaledEvaluator {
    pub version: SchemaVersion,
    pub factor: f64,
}

impl Evaluator for ScaledEvaluator {
    fn stamp(&self) -> EvaluatorStamp {
        EvaluatorStamp {
            id: EvaluatorId::new("scaled"),
            version: self.version,
        }
    }

    fn outputs(&self) -> &[OutputDecl] {
        SCALED_OUTPUTS
    }

    fn step_budget(&self) -> u64 {
        1
    }

    fn evaluate(&self, snapshot: &ParameterSnapshot) -> Result<ResultRecord, VerityError> {
        let deflection = snapshot.scalar("deflection")?;
        ResultRecord::builder(self.stamp(), snapshot.checksum())
            .output("scaled_deflection_nm", deflection * self.factor, "nm")
            .build()
    }
}

pub fn fixed_ledger() -> ProvenanceLedger {
    ProvenanceLedger::in_memory().with_clock(Arc::new(FixedClock::new("2024-05-01T12:00:00Z")))
}

pub fn deflection_snapshot(name: &str, deflection: f64) -> Result<ParameterSnapshot, VerityError> {
    ParameterSnapshot::builder(name)
        .scalar("deflection", deflection, "nm")
        .build()
}

pub fn fracture_snapshot(name: &str, kt: f64) -> Result<ParameterSnapshot, VerityError> {
    ParameterSnapshot::builder(name)
        .scalar("k_ic", 1.0, "MPa*m^0.5")
        .scalar("flaw_size", 10e-6, "m")
        .scalar("kt", kt, "")
        .build()
}

/// Built-in evaluators plus a counting deflection evaluator.
pub fn evaluator_set(deflection: &DeflectionEvaluator) -> Result<EvaluatorSet, VerityError> {
    let mut set = EvaluatorSet::with_builtins();
    set.register(Arc::new(deflection.clone()))?;
    set.register(Arc::new(UnstableEvaluator))?;
    Ok(set)
}

/// Suppression-factor scenario: baseline and graded-treatment runs plus a
/// fracture threshold that shares none of their inputs.
pub fn suppression_store(treatment: f64) -> Result<ParameterStore, VerityError> {
    ParameterStore::from_snapshots([
        deflection_snapshot("baseline", 115.6)?,
        deflection_snapshot("treatment-graded", treatment)?,
        fracture_snapshot("llzo", 7.0)?,
    ])
}

pub fn suppression_registry(set: &EvaluatorSet) -> Result<ClaimRegistry, VerityError> {
    let mut registry = ClaimRegistry::new();
    registry.register_all(
        set,
        [
            Claim::value("suppression-factor", "Dendrite suppression factor", 12.7, Tolerance::Absolute(0.05))
                .source("deflection", "max_deflection_nm", "baseline")
                .source("deflection", "max_deflection_nm", "treatment-graded")
                .derived(verity_claims::Derivation::Ratio),
            Claim::value("treatment-deflection", "Graded deflection", 9.1, Tolerance::Relative(0.02))
                .source("deflection", "max_deflection_nm", "treatment-graded"),
            Claim::value("critical-pressure", "Critical pressure", 25.4, Tolerance::Absolute(0.5))
                .source("fracture", "critical_pressure_mpa", "llzo"),
        ],
    )?;
    Ok(registry)
}

pub fn verifier(set: EvaluatorSet, concurrency: usize) -> Verifier {
    Verifier::new(set, VerifyPolicy::default().with_concurrency(concurrency))
}
