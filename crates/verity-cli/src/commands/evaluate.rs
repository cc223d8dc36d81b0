use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use verity_core::serde::to_canonical_json_bytes;
use verity_eval::EvaluatorSet;

use super::load_store;

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// YAML file whose `snapshots` section holds the parameters
    #[arg(long)]
    pub claims: PathBuf,
    /// Snapshot name within the file
    #[arg(long)]
    pub snapshot: String,
    /// Evaluator identity, e.g. `fracture`
    #[arg(long)]
    pub evaluator: String,
    /// Write the record here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &EvaluateArgs) -> Result<ExitCode, Box<dyn Error>> {
    let store = load_store(&args.claims)?;
    let snapshot = store.require(&args.snapshot)?;
    let evaluators = EvaluatorSet::with_builtins();
    let record = evaluators.require(&args.evaluator)?.evaluate(snapshot)?;
    let bytes = to_canonical_json_bytes(&record)?;
    match &args.out {
        Some(path) => fs::write(path, &bytes)?,
        None => println!("{}", String::from_utf8(bytes)?),
    }
    Ok(ExitCode::SUCCESS)
}
