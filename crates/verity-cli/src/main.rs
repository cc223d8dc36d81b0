use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commands::{
    drift::{self, DriftArgs},
    evaluate::{self, EvaluateArgs},
    export::{self, ExportArgs},
    outputs::{self, OutputsArgs},
    render::{self, RenderArgs},
    verify::{self, VerifyArgs},
};
use tracing::Level;

mod commands;
mod telemetry;

/// Exit status for failures that prevented a report from being produced.
const EXIT_RUN_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "verity", about = "Scientific claim verification and provenance CLI")]
struct Cli {
    /// Default log level when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: Level,
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify every claim in a claim set and append the results to a ledger.
    Verify(VerifyArgs),
    /// Report drift for claims recorded in a ledger.
    Drift(DriftArgs),
    /// Export a ledger as JSON lines or CSV.
    Export(ExportArgs),
    /// Run one evaluator on one snapshot and print its result record.
    Evaluate(EvaluateArgs),
    /// Render figure data files from a render specification.
    Render(RenderArgs),
    /// List the outputs each built-in evaluator declares.
    Outputs(OutputsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.log_json, cli.log_level);

    let result = match &cli.command {
        Command::Verify(args) => verify::run(args),
        Command::Drift(args) => drift::run(args),
        Command::Export(args) => export::run(args),
        Command::Evaluate(args) => evaluate::run(args),
        Command::Render(args) => render::run(args),
        Command::Outputs(args) => outputs::run(args),
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(EXIT_RUN_ERROR)
        }
    }
}
