use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use tracing::warn;
use verity_claims::{ClaimSet, Verifier};
use verity_eval::EvaluatorSet;
use verity_prov::{DriftStatus, ProvenanceLedger};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// YAML claim set with policy, snapshots and claims
    #[arg(long)]
    pub claims: PathBuf,
    /// JSON lines provenance ledger; created when missing
    #[arg(long)]
    pub ledger: PathBuf,
    /// Worker threads, overriding the claim-set policy
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Optional path for the canonical JSON report
    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub fn run(args: &VerifyArgs) -> Result<ExitCode, Box<dyn Error>> {
    let evaluators = EvaluatorSet::with_builtins();
    let claim_set = ClaimSet::load(&args.claims, &evaluators)?;
    let mut policy = claim_set.policy;
    if let Some(concurrency) = args.concurrency {
        policy = policy.with_concurrency(concurrency);
    }

    let mut ledger = ProvenanceLedger::open(&args.ledger)?;
    let verifier = Verifier::new(evaluators, policy);
    let report = verifier.verify(&claim_set.registry, &claim_set.store, &mut ledger)?;

    if let Some(path) = &args.report {
        fs::write(path, report.to_bytes()?)?;
    }
    println!("{}", report.summary_text());

    for claim_id in claim_set.registry.ids() {
        if let DriftStatus::Drifted { old, new } = ledger.check_drift_with(claim_id, policy.rounding) {
            warn!(claim = claim_id, old, new, "claim drifted since the previous run");
            println!("DRIFT {claim_id}: {old} -> {new}");
        }
    }
    Ok(ExitCode::from(report.exit_code()))
}
