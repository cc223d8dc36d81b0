//! Structured error types shared across verity crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable machine readable error codes.
pub mod codes {
    /// Numerical instability inside an evaluator.
    pub const DIVERGED_SIMULATION: &str = "diverged-simulation";
    /// Evaluator exhausted its declared step/iteration budget.
    pub const STEP_BUDGET_EXCEEDED: &str = "step-budget-exceeded";
    /// Diffusive-regime fit fell below the declared quality floor.
    pub const INSUFFICIENT_DIFFUSIVE_REGIME: &str = "insufficient-diffusive-regime";
    /// A required snapshot parameter is absent.
    pub const MISSING_PARAMETER: &str = "missing-parameter";
    /// A snapshot parameter has the wrong shape or an out-of-domain value.
    pub const INVALID_PARAMETER: &str = "invalid-parameter";
    /// A snapshot parameter is NaN or infinite.
    pub const NON_FINITE_PARAMETER: &str = "non-finite-parameter";
    /// A parameter store already holds a snapshot under this name.
    pub const DUPLICATE_SNAPSHOT: &str = "duplicate-snapshot";
    /// A claim source names an evaluator output that does not exist.
    pub const UNRESOLVED_SOURCE: &str = "unresolved-source";
    /// A claim id is registered twice.
    pub const DUPLICATE_CLAIM: &str = "duplicate-claim";
    /// A claim is structurally malformed.
    pub const INVALID_CLAIM: &str = "invalid-claim";
    /// An evaluator identity is not part of the evaluator set.
    pub const UNKNOWN_EVALUATOR: &str = "unknown-evaluator";
    /// Two evaluators share one identity.
    pub const DUPLICATE_EVALUATOR: &str = "duplicate-evaluator";
    /// Retention increased with cycle count.
    pub const RETENTION_NOT_MONOTONIC: &str = "retention-not-monotonic";
    /// A verification run was aborted between claims.
    pub const CANCELLED: &str = "cancelled";
    /// A claim cites a snapshot that was not supplied.
    pub const MISSING_SNAPSHOT: &str = "missing-snapshot";
    /// A verification run was requested over zero claims.
    pub const EMPTY_CLAIM_SET: &str = "empty-claim-set";
    /// A derived quantity could not be computed.
    pub const DERIVATION: &str = "derivation";
    /// An evaluator ran but did not emit the cited output (e.g. an unrequested checkpoint).
    pub const OUTPUT_NOT_PRODUCED: &str = "output-not-produced";
    /// Two ledger entries share a checksum but disagree on the value.
    pub const INCONSISTENT_PROVENANCE: &str = "inconsistent-provenance";
}

/// Structured payload attached to every [`VerityError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (identifiers, sizes, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the verity pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum VerityError {
    /// Evaluator integration diverged or ran out of budget.
    #[error("simulation error: {0}")]
    Simulation(ErrorInfo),
    /// Statistical fit was not trustworthy.
    #[error("fit error: {0}")]
    Fit(ErrorInfo),
    /// Snapshot parameter errors.
    #[error("parameter error: {0}")]
    Parameter(ErrorInfo),
    /// Claim and evaluator registration errors.
    #[error("registry error: {0}")]
    Registry(ErrorInfo),
    /// Evaluator invariant violations; these indicate a bug in the model.
    #[error("invariant violated: {0}")]
    Invariant(ErrorInfo),
    /// Verification run errors.
    #[error("verification error: {0}")]
    Verification(ErrorInfo),
    /// Provenance ledger errors.
    #[error("provenance error: {0}")]
    Provenance(ErrorInfo),
    /// Serialization, schema and file errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl VerityError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            VerityError::Simulation(info)
            | VerityError::Fit(info)
            | VerityError::Parameter(info)
            | VerityError::Registry(info)
            | VerityError::Invariant(info)
            | VerityError::Verification(info)
            | VerityError::Provenance(info)
            | VerityError::Serde(info) => info,
        }
    }

    /// Returns the stable code carried by the payload.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Numerical instability inside an evaluator.
    pub fn diverged(message: impl Into<String>) -> Self {
        VerityError::Simulation(ErrorInfo::new(codes::DIVERGED_SIMULATION, message))
    }

    /// Evaluator exceeded its declared iteration budget.
    pub fn budget_exceeded(requested: u64, budget: u64) -> Self {
        VerityError::Simulation(
            ErrorInfo::new(
                codes::STEP_BUDGET_EXCEEDED,
                format!("requested {requested} steps but the evaluator budget is {budget}"),
            )
            .with_context("requested", requested.to_string())
            .with_context("budget", budget.to_string()),
        )
    }

    /// Diffusive fit below the quality floor.
    pub fn insufficient_regime(r_squared: f64, min_r_squared: f64) -> Self {
        VerityError::Fit(
            ErrorInfo::new(
                codes::INSUFFICIENT_DIFFUSIVE_REGIME,
                format!("diffusive fit R^2 {r_squared:.6} is below the floor {min_r_squared}"),
            )
            .with_context("r_squared", r_squared.to_string())
            .with_context("min_r_squared", min_r_squared.to_string())
            .with_hint("extend the trajectory or move the fit window into the linear regime"),
        )
    }

    /// A snapshot is missing a parameter the evaluator requires.
    pub fn missing_parameter(snapshot: &str, name: &str) -> Self {
        VerityError::Parameter(
            ErrorInfo::new(
                codes::MISSING_PARAMETER,
                format!("snapshot `{snapshot}` does not define `{name}`"),
            )
            .with_context("snapshot", snapshot)
            .with_context("parameter", name),
        )
    }

    /// A snapshot parameter is out of domain.
    pub fn invalid_parameter(name: &str, message: impl Into<String>) -> Self {
        VerityError::Parameter(
            ErrorInfo::new(codes::INVALID_PARAMETER, message).with_context("parameter", name),
        )
    }

    /// A claim source does not resolve to a declared evaluator output.
    pub fn unresolved_source(claim: &str, evaluator: &str, output: &str) -> Self {
        VerityError::Registry(
            ErrorInfo::new(
                codes::UNRESOLVED_SOURCE,
                format!("claim `{claim}` cites unknown output `{evaluator}.{output}`"),
            )
            .with_context("claim", claim)
            .with_context("evaluator", evaluator)
            .with_context("output", output),
        )
    }
}
