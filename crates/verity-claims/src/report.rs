//! Verification reports.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use verity_core::serde::to_canonical_json_bytes;
use verity_core::{stable_hash_string, EvaluatorStamp, Tolerance, VerityError};

use crate::claim::{Claim, Expectation};
use crate::policy::VerifyPolicy;

/// Verdict for one claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClaimStatus {
    /// Observed value within tolerance.
    Passed,
    /// Observed value outside tolerance.
    Failed,
    /// No value could be observed (evaluator or derivation failure).
    Errored,
}

/// One row of the pass/fail matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimOutcome {
    /// Claim id.
    pub claim_id: String,
    /// Claim label.
    pub label: String,
    /// Whether the value is a formula over several outputs.
    pub derived: bool,
    /// Observed value, absent when errored.
    pub observed: Option<f64>,
    /// Published expectation.
    pub expected: Expectation,
    /// Tolerance applied.
    pub tolerance: Tolerance,
    /// Verdict.
    pub status: ClaimStatus,
    /// Signed distance past the tolerance; negative means headroom.
    pub margin: Option<f64>,
    /// Why the claim errored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Combined checksum of every snapshot the sources cite.
    pub snapshot_checksum: String,
    /// Evaluators that fed the value.
    pub evaluators: Vec<EvaluatorStamp>,
}

impl ClaimOutcome {
    pub(crate) fn new(
        claim: &Claim,
        snapshot_checksum: String,
        evaluators: Vec<EvaluatorStamp>,
    ) -> Self {
        Self {
            claim_id: claim.id.clone(),
            label: claim.label.clone(),
            derived: claim.is_derived(),
            observed: None,
            expected: claim.expected,
            tolerance: claim.tolerance,
            status: ClaimStatus::Errored,
            margin: None,
            reason: None,
            snapshot_checksum,
            evaluators,
        }
    }

    /// Whether the claim passed.
    pub fn passed(&self) -> bool {
        self.status == ClaimStatus::Passed
    }
}

/// The failed claim that missed its tolerance by the most.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailingMargin {
    /// Claim id.
    pub claim_id: String,
    /// Margin past the tolerance.
    pub margin: f64,
}

/// Immutable result of one verification pass, claims in registration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Run id shared with the provenance entries of this pass.
    pub run_id: String,
    /// Content hash over the policy and claim outcomes; independent of run id.
    pub report_hash: String,
    /// Policy in force.
    pub policy: VerifyPolicy,
    /// Number of passed claims.
    pub passed: usize,
    /// Number of claims checked.
    pub total: usize,
    /// Largest margin among failed claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_failing_margin: Option<FailingMargin>,
    /// Per-claim rows.
    pub claims: Vec<ClaimOutcome>,
}

impl VerificationReport {
    pub(crate) fn new(
        run_id: String,
        policy: VerifyPolicy,
        claims: Vec<ClaimOutcome>,
    ) -> Result<Self, VerityError> {
        let report_hash = stable_hash_string(&(&policy, &claims))?;
        let passed = claims.iter().filter(|outcome| outcome.passed()).count();
        let max_failing_margin = claims
            .iter()
            .filter(|outcome| outcome.status == ClaimStatus::Failed)
            .filter_map(|outcome| outcome.margin.map(|margin| (outcome, margin)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(outcome, margin)| FailingMargin {
                claim_id: outcome.claim_id.clone(),
                margin,
            });
        Ok(Self {
            run_id,
            report_hash,
            policy,
            passed,
            total: claims.len(),
            max_failing_margin,
            claims,
        })
    }

    /// Whether every claim passed.
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    /// Process status for publishing gates: 0 iff every claim passed.
    pub fn exit_code(&self) -> u8 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }

    /// Looks up one claim's row.
    pub fn outcome(&self, claim_id: &str) -> Option<&ClaimOutcome> {
        self.claims.iter().find(|outcome| outcome.claim_id == claim_id)
    }

    /// Canonical JSON encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, VerityError> {
        to_canonical_json_bytes(self)
    }

    /// Plain-text matrix ending in the `N/M claims passed` summary.
    pub fn summary_text(&self) -> String {
        let mut out = String::new();
        for outcome in &self.claims {
            let tag = match outcome.status {
                ClaimStatus::Passed => "PASS ",
                ClaimStatus::Failed => "FAIL ",
                ClaimStatus::Errored => "ERROR",
            };
            let expected = match outcome.expected {
                Expectation::Value(value) => value.to_string(),
                Expectation::Range { low, high } => format!("[{low}, {high}]"),
            };
            let _ = write!(out, "{tag} {} ", outcome.claim_id);
            match (outcome.observed, outcome.margin) {
                (Some(observed), Some(margin)) => {
                    let _ = writeln!(
                        out,
                        "observed={observed:.6} expected={expected} tolerance={} margin={margin:.6}",
                        outcome.tolerance
                    );
                }
                _ => {
                    let _ = writeln!(
                        out,
                        "expected={expected} reason={}",
                        outcome.reason.as_deref().unwrap_or("unknown")
                    );
                }
            }
        }
        if let Some(worst) = &self.max_failing_margin {
            let _ = writeln!(out, "max failing margin: {} ({:.6})", worst.claim_id, worst.margin);
        }
        let _ = write!(out, "{}/{} claims passed", self.passed, self.total);
        out
    }
}
