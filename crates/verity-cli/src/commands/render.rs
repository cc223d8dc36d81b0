use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use tracing::info;
use verity_claims::MemoTable;
use verity_eval::EvaluatorSet;
use verity_render::{render_figure, write_artifacts, RenderSpec};

use super::load_store;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// YAML render specification listing the figures
    #[arg(long)]
    pub spec: PathBuf,
    /// YAML file whose `snapshots` section feeds the evaluators
    #[arg(long)]
    pub claims: PathBuf,
    /// Output directory for figure files and `manifest.json`
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &RenderArgs) -> Result<ExitCode, Box<dyn Error>> {
    let spec = RenderSpec::load(&args.spec)?;
    let store = load_store(&args.claims)?;
    let evaluators = EvaluatorSet::with_builtins();
    let memo = MemoTable::new();

    let mut artifacts = Vec::with_capacity(spec.figures.len());
    for figure in &spec.figures {
        let evaluator = evaluators.require(figure.evaluator.as_str())?;
        let snapshot = store.require(&figure.snapshot)?;
        let record = memo.get_or_evaluate(&**evaluator, snapshot)?;
        artifacts.push(render_figure(figure, &record)?);
    }
    let manifest = write_artifacts(&artifacts, &args.out)?;
    info!(
        figures = manifest.artifacts.len(),
        evaluations = memo.evaluations(),
        out = %args.out.display(),
        "rendered figures"
    );
    for entry in &manifest.artifacts {
        println!("{}  {}", entry.sha256, entry.name);
    }
    Ok(ExitCode::SUCCESS)
}
