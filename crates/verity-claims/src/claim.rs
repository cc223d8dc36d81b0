//! Claim declarations.

use serde::{Deserialize, Serialize};
use verity_core::{codes, ErrorInfo, EvaluatorId, Tolerance, VerityError};

use crate::formula::Derivation;

fn invalid_claim(id: &str, message: impl Into<String>) -> VerityError {
    VerityError::Registry(ErrorInfo::new(codes::INVALID_CLAIM, message).with_context("claim", id))
}

/// One evaluator output a claim depends on, pinned to the exact snapshot it
/// must be computed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Source {
    /// Evaluator identity.
    pub evaluator: EvaluatorId,
    /// Declared output name.
    pub output: String,
    /// Name of the snapshot in the parameter store.
    pub snapshot: String,
}

impl Source {
    /// Creates a source reference.
    pub fn new(evaluator: &str, output: &str, snapshot: &str) -> Self {
        Self {
            evaluator: EvaluatorId::new(evaluator),
            output: output.to_string(),
            snapshot: snapshot.to_string(),
        }
    }
}

/// Published expectation: a number or an inclusive interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expectation {
    /// Point value, compared with an absolute or relative tolerance.
    Value(f64),
    /// Interval; implies a range tolerance with the same bounds.
    Range {
        /// Inclusive lower bound.
        low: f64,
        /// Inclusive upper bound.
        high: f64,
    },
}

impl Expectation {
    /// Reference point handed to the tolerance check.
    pub fn reference(&self) -> f64 {
        match *self {
            Expectation::Value(value) => value,
            Expectation::Range { low, high } => 0.5 * (low + high),
        }
    }
}

/// A registered, human-meaningful assertion bound to evaluator outputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Claim {
    /// Stable identifier (`suppression-factor`, `critical-pressure`, ...).
    pub id: String,
    /// Human label.
    pub label: String,
    /// Published expectation.
    pub expected: Expectation,
    /// Tolerance policy.
    pub tolerance: Tolerance,
    /// Formula combining the sources.
    pub derivation: Derivation,
    /// Sources in formula order.
    pub sources: Vec<Source>,
}

impl Claim {
    /// Claim on a point value.
    pub fn value(id: impl Into<String>, label: impl Into<String>, expected: f64, tolerance: Tolerance) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            expected: Expectation::Value(expected),
            tolerance,
            derivation: Derivation::Value,
            sources: Vec::new(),
        }
    }

    /// Claim that the observed value lies in `[low, high]`.
    pub fn range(id: impl Into<String>, label: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            expected: Expectation::Range { low, high },
            tolerance: Tolerance::Range { low, high },
            derivation: Derivation::Value,
            sources: Vec::new(),
        }
    }

    /// Appends a source.
    pub fn source(mut self, evaluator: &str, output: &str, snapshot: &str) -> Self {
        self.sources.push(Source::new(evaluator, output, snapshot));
        self
    }

    /// Sets the formula.
    pub fn derived(mut self, derivation: Derivation) -> Self {
        self.derivation = derivation;
        self
    }

    /// Whether the claim is a formula over several outputs.
    pub fn is_derived(&self) -> bool {
        self.derivation.is_derived()
    }

    /// Structural checks that do not need the evaluator set.
    pub fn validate(&self) -> Result<(), VerityError> {
        if self.id.trim().is_empty() {
            return Err(invalid_claim(&self.id, "claim id must not be empty"));
        }
        if !self.derivation.accepts(self.sources.len()) {
            return Err(invalid_claim(
                &self.id,
                format!(
                    "derivation {:?} cannot take {} source(s)",
                    self.derivation,
                    self.sources.len()
                ),
            ));
        }
        if !self.tolerance.is_well_formed() {
            return Err(invalid_claim(&self.id, format!("tolerance {} is malformed", self.tolerance)));
        }
        match (self.expected, self.tolerance) {
            (Expectation::Value(value), _) if !value.is_finite() => {
                Err(invalid_claim(&self.id, "expected value must be finite"))
            }
            (Expectation::Range { low, high }, Tolerance::Range { low: lo, high: hi })
                if low == lo && high == hi => Ok(()),
            (Expectation::Range { .. }, _) => Err(invalid_claim(
                &self.id,
                "a range expectation must carry the matching range tolerance",
            )),
            _ => Ok(()),
        }
    }
}
