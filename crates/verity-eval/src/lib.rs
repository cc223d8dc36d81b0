#![deny(missing_docs)]
#![doc = "Deterministic physics evaluators (phase-field mechanics, transport, fracture, degradation, solvation) behind one capability trait."]

/// Physical constants shared by the evaluators.
pub mod consts;
/// Cycle-life degradation evaluator.
pub mod degradation;
/// Linear least-squares helpers.
pub mod fit;
/// Griffith fracture-threshold evaluator.
pub mod fracture;
/// Coupled Allen-Cahn / diffusion phase-field evaluator.
pub mod phase_field;
/// Evaluator registry keyed by identity.
pub mod set;
/// Born solvation barrier evaluator.
pub mod solvation;
/// MSD-based transport-coefficient evaluator.
pub mod transport;

use serde::Serialize;
use verity_core::{EvaluatorStamp, ParameterSnapshot, ResultRecord, VerityError};

pub use degradation::DegradationEvaluator;
pub use fit::{fit_line, LineFit};
pub use fracture::{critical_pressure, critical_stress, weibull_failure_probability, FractureEvaluator};
pub use phase_field::PhaseFieldEvaluator;
pub use set::EvaluatorSet;
pub use solvation::SolvationEvaluator;
pub use transport::TransportEvaluator;

/// How an output declaration matches output names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    /// The output name must match exactly.
    Exact,
    /// The output name is the prefix followed by a non-negative integer.
    Family,
}

/// One named output an evaluator promises to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutputDecl {
    /// Output name, or the prefix for a family.
    pub name: &'static str,
    /// Unit label.
    pub unit: &'static str,
    /// Matching rule.
    pub kind: DeclKind,
}

impl OutputDecl {
    /// Declares an exactly-named output.
    pub const fn exact(name: &'static str, unit: &'static str) -> Self {
        Self {
            name,
            unit,
            kind: DeclKind::Exact,
        }
    }

    /// Declares an integer-indexed output family such as `retention_pct@<cycle>`.
    pub const fn family(prefix: &'static str, unit: &'static str) -> Self {
        Self {
            name: prefix,
            unit,
            kind: DeclKind::Family,
        }
    }

    /// Whether `output` is covered by this declaration.
    pub fn matches(&self, output: &str) -> bool {
        match self.kind {
            DeclKind::Exact => self.name == output,
            DeclKind::Family => output
                .strip_prefix(self.name)
                .map(|suffix| !suffix.is_empty() && suffix.parse::<u64>().is_ok())
                .unwrap_or(false),
        }
    }
}

/// Common capability implemented by every physics family.
///
/// Evaluation must be a pure function of the snapshot: identical snapshots
/// yield identical records, bit for bit.
pub trait Evaluator: Send + Sync {
    /// Identity and model version stamped onto every record.
    fn stamp(&self) -> EvaluatorStamp;

    /// Declared output set, checked when claims are registered.
    fn outputs(&self) -> &[OutputDecl];

    /// Maximum number of integration steps or iterations one evaluation may use.
    fn step_budget(&self) -> u64;

    /// Runs the model over a snapshot.
    fn evaluate(&self, snapshot: &ParameterSnapshot) -> Result<ResultRecord, VerityError>;

    /// Whether the evaluator declares `output`.
    fn declares(&self, output: &str) -> bool {
        self.outputs().iter().any(|decl| decl.matches(output))
    }

    /// Whether a record for `snapshot` will carry `output`.
    ///
    /// Registration only knows the declared set; members of an output family
    /// can still depend on the snapshot (a checkpoint past the simulated
    /// cycles is never emitted). Callers use this to reject such sources
    /// before evaluating.
    fn produces(&self, output: &str, _snapshot: &ParameterSnapshot) -> bool {
        self.declares(output)
    }
}

pub(crate) fn check_budget(requested: u64, budget: u64) -> Result<(), VerityError> {
    if requested > budget {
        Err(VerityError::budget_exceeded(requested, budget))
    } else {
        Ok(())
    }
}
