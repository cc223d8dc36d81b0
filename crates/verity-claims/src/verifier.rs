//! Memoized, parallel verification of registered claims.

use std::collections::BTreeSet;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{info, warn};
use verity_core::{
    codes, combine_checksums, ErrorInfo, EvaluatorStamp, ParameterSnapshot, ParameterStore,
    VerityError,
};
use verity_eval::{Evaluator, EvaluatorSet};
use verity_prov::{EntryDraft, ProvenanceLedger};

use crate::cancel::CancelToken;
use crate::claim::{Claim, Source};
use crate::memo::MemoTable;
use crate::policy::VerifyPolicy;
use crate::registry::ClaimRegistry;
use crate::report::{ClaimOutcome, ClaimStatus, VerificationReport};

fn verification_error(code: &str, message: impl Into<String>) -> VerityError {
    VerityError::Verification(ErrorInfo::new(code, message.into()))
}

/// A claim with every source resolved to a snapshot and an evaluator.
struct ClaimPlan<'a> {
    claim: &'a Claim,
    inputs: Vec<(Arc<ParameterSnapshot>, Arc<dyn Evaluator>)>,
    checksum: String,
    evaluators: Vec<EvaluatorStamp>,
    /// Set when a source can never resolve against its snapshot; the claim
    /// errors without evaluating anything.
    rejected: Option<VerityError>,
}

/// Runs claims against snapshots and records what it published.
///
/// The memo table lives as long as the verifier, so re-verifying unchanged
/// snapshots does not re-run evaluators.
#[derive(Debug)]
pub struct Verifier {
    evaluators: EvaluatorSet,
    policy: VerifyPolicy,
    memo: MemoTable,
}

impl Verifier {
    /// Creates a verifier over an evaluator set.
    pub fn new(evaluators: EvaluatorSet, policy: VerifyPolicy) -> Self {
        Self {
            evaluators,
            policy,
            memo: MemoTable::new(),
        }
    }

    /// Policy in force.
    pub fn policy(&self) -> &VerifyPolicy {
        &self.policy
    }

    /// Evaluators available to claims.
    pub fn evaluators(&self) -> &EvaluatorSet {
        &self.evaluators
    }

    /// Memoized evaluator runs.
    pub fn memo(&self) -> &MemoTable {
        &self.memo
    }

    /// Verifies every registered claim and appends one provenance entry per claim.
    pub fn verify(
        &self,
        registry: &ClaimRegistry,
        store: &ParameterStore,
        ledger: &mut ProvenanceLedger,
    ) -> Result<VerificationReport, VerityError> {
        self.verify_with_cancel(registry, store, ledger, &CancelToken::new())
    }

    /// [`Self::verify`] that stops at the next claim boundary once `cancel` is
    /// set. A cancelled run returns `cancelled`, emits no report and appends
    /// nothing to the ledger.
    pub fn verify_with_cancel(
        &self,
        registry: &ClaimRegistry,
        store: &ParameterStore,
        ledger: &mut ProvenanceLedger,
        cancel: &CancelToken,
    ) -> Result<VerificationReport, VerityError> {
        if registry.is_empty() {
            return Err(verification_error(
                codes::EMPTY_CLAIM_SET,
                "no claims are registered",
            ));
        }
        let plans = registry
            .iter()
            .map(|claim| self.plan(claim, store))
            .collect::<Result<Vec<_>, _>>()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.policy.concurrency.max(1))
            .build()
            .map_err(|err| verification_error("thread-pool", err.to_string()))?;

        let results: Result<Vec<(usize, ClaimOutcome)>, VerityError> = pool.install(|| {
            plans
                .par_iter()
                .enumerate()
                .map(|(index, plan)| {
                    if cancel.is_cancelled() {
                        return Err(cancelled(plan.claim));
                    }
                    Ok((index, self.check(plan)))
                })
                .collect()
        });
        let mut ordered = results?;
        if cancel.is_cancelled() {
            return Err(verification_error(
                codes::CANCELLED,
                "verification cancelled before the report was emitted",
            ));
        }
        ordered.sort_by_key(|(index, _)| *index);
        let outcomes: Vec<ClaimOutcome> = ordered.into_iter().map(|(_, outcome)| outcome).collect();

        let run_id = ledger.next_run_id();
        let report = VerificationReport::new(run_id.clone(), self.policy, outcomes)?;
        let drafts = report
            .claims
            .iter()
            .map(|outcome| EntryDraft {
                run_id: run_id.clone(),
                claim_id: outcome.claim_id.clone(),
                snapshot_checksum: outcome.snapshot_checksum.clone(),
                evaluators: outcome.evaluators.clone(),
                observed: outcome.observed,
                passed: outcome.passed(),
                tolerance: outcome.tolerance,
            })
            .collect();
        ledger.append_all(drafts)?;
        info!(
            run = %report.run_id,
            passed = report.passed,
            total = report.total,
            evaluations = self.memo.evaluations(),
            memo_hits = self.memo.hits(),
            "verification finished"
        );
        Ok(report)
    }

    fn plan<'a>(&self, claim: &'a Claim, store: &ParameterStore) -> Result<ClaimPlan<'a>, VerityError> {
        let mut inputs = Vec::with_capacity(claim.sources.len());
        let mut stamps = BTreeSet::new();
        let mut rejected = None;
        for source in &claim.sources {
            let snapshot = store.get(&source.snapshot).cloned().ok_or_else(|| {
                VerityError::Verification(
                    ErrorInfo::new(
                        codes::MISSING_SNAPSHOT,
                        format!(
                            "claim `{}` cites snapshot `{}` which was not supplied",
                            claim.id, source.snapshot
                        ),
                    )
                    .with_context("claim", claim.id.clone())
                    .with_context("snapshot", source.snapshot.clone()),
                )
            })?;
            let evaluator = Arc::clone(self.evaluators.require(source.evaluator.as_str())?);
            stamps.insert(evaluator.stamp());
            if rejected.is_none() && !evaluator.produces(&source.output, &snapshot) {
                rejected = Some(not_produced(claim, source));
            }
            inputs.push((snapshot, evaluator));
        }
        let checksum = combine_checksums(inputs.iter().map(|(snapshot, _)| snapshot.checksum()))?;
        Ok(ClaimPlan {
            claim,
            inputs,
            checksum,
            evaluators: stamps.into_iter().collect(),
            rejected,
        })
    }

    fn check(&self, plan: &ClaimPlan<'_>) -> ClaimOutcome {
        let claim = plan.claim;
        let mut outcome = ClaimOutcome::new(claim, plan.checksum.clone(), plan.evaluators.clone());
        let observed = match &plan.rejected {
            Some(err) => Err(err.clone()),
            None => self.observe(plan),
        };
        match observed {
            Ok(observed) => {
                let assessment =
                    claim
                        .tolerance
                        .assess(observed, claim.expected.reference(), self.policy.rounding);
                outcome.observed = Some(observed);
                outcome.margin = Some(assessment.margin);
                outcome.status = if assessment.passed {
                    ClaimStatus::Passed
                } else {
                    warn!(claim = %claim.id, observed, margin = assessment.margin, "claim failed");
                    ClaimStatus::Failed
                };
            }
            Err(err) => {
                warn!(claim = %claim.id, code = err.code(), "claim errored: {err}");
                outcome.status = ClaimStatus::Errored;
                outcome.reason = Some(err.to_string());
            }
        }
        outcome
    }

    fn observe(&self, plan: &ClaimPlan<'_>) -> Result<f64, VerityError> {
        let mut values = Vec::with_capacity(plan.inputs.len());
        for ((snapshot, evaluator), source) in plan.inputs.iter().zip(&plan.claim.sources) {
            let record = self.memo.get_or_evaluate(evaluator.as_ref(), snapshot)?;
            let value = record
                .value(&source.output)
                .ok_or_else(|| not_produced(plan.claim, source))?;
            values.push(value);
        }
        plan.claim.derivation.apply(&values)
    }
}

fn not_produced(claim: &Claim, source: &Source) -> VerityError {
    VerityError::Verification(
        ErrorInfo::new(
            codes::OUTPUT_NOT_PRODUCED,
            format!(
                "`{}` does not produce `{}` for snapshot `{}`",
                source.evaluator, source.output, source.snapshot
            ),
        )
        .with_context("claim", claim.id.clone())
        .with_context("output", source.output.clone()),
    )
}

fn cancelled(claim: &Claim) -> VerityError {
    VerityError::Verification(
        ErrorInfo::new(codes::CANCELLED, "verification cancelled between claims")
            .with_context("next_claim", claim.id.clone()),
    )
}
