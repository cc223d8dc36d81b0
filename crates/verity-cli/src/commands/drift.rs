use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use verity_prov::{DriftStatus, ProvenanceLedger, DEFAULT_DRIFT_ROUNDING};

#[derive(Args, Debug)]
pub struct DriftArgs {
    /// JSON lines provenance ledger
    #[arg(long)]
    pub ledger: PathBuf,
    /// Restrict the report to one claim
    #[arg(long)]
    pub claim: Option<String>,
    /// Rounding slack when comparing values
    #[arg(long, default_value_t = DEFAULT_DRIFT_ROUNDING)]
    pub rounding: f64,
    /// Exit with status 1 when any claim drifted
    #[arg(long)]
    pub fail_on_drift: bool,
}

pub fn run(args: &DriftArgs) -> Result<ExitCode, Box<dyn Error>> {
    let ledger = ProvenanceLedger::open(&args.ledger)?;
    ledger.check_consistency()?;

    let statuses = match &args.claim {
        Some(claim_id) => vec![(claim_id.clone(), ledger.check_drift_with(claim_id, args.rounding))],
        None => ledger.drift_all(args.rounding),
    };
    let mut drifted = 0usize;
    for (claim_id, status) in &statuses {
        match status {
            DriftStatus::Unchanged => println!("unchanged      {claim_id}"),
            DriftStatus::NeverRecorded => println!("never-recorded {claim_id}"),
            DriftStatus::Drifted { old, new } => {
                drifted += 1;
                println!("drifted        {claim_id}: {old} -> {new}");
            }
        }
    }
    println!("{drifted}/{} claims drifted", statuses.len());

    if args.fail_on_drift && drifted > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
