use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, ValueEnum};
use verity_prov::{export_csv, export_jsonl, ProvenanceLedger};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Jsonl,
    Csv,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// JSON lines provenance ledger
    #[arg(long)]
    pub ledger: PathBuf,
    /// Output format
    #[arg(long, value_enum, default_value = "csv")]
    pub format: ExportFormat,
    /// Destination file
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &ExportArgs) -> Result<ExitCode, Box<dyn Error>> {
    let ledger = ProvenanceLedger::open(&args.ledger)?;
    match args.format {
        ExportFormat::Jsonl => export_jsonl(&ledger, &args.out)?,
        ExportFormat::Csv => export_csv(&ledger, &args.out)?,
    }
    println!("exported {} entries to {}", ledger.len(), args.out.display());
    Ok(ExitCode::SUCCESS)
}
