use std::error::Error;
use std::process::ExitCode;

use clap::Args;
use verity_eval::{DeclKind, EvaluatorSet};

#[derive(Args, Debug)]
pub struct OutputsArgs {
    /// Only list this evaluator
    #[arg(long)]
    pub evaluator: Option<String>,
}

pub fn run(args: &OutputsArgs) -> Result<ExitCode, Box<dyn Error>> {
    let evaluators = EvaluatorSet::with_builtins();
    if let Some(id) = &args.evaluator {
        evaluators.require(id)?;
    }
    for (id, decls) in evaluators.catalogue() {
        if args.evaluator.as_deref().is_some_and(|wanted| wanted != id.as_str()) {
            continue;
        }
        println!("{id}");
        for decl in decls {
            let name = match decl.kind {
                DeclKind::Exact => decl.name.to_string(),
                DeclKind::Family => format!("{}<n>", decl.name),
            };
            if decl.unit.is_empty() {
                println!("  {name}");
            } else {
                println!("  {name} [{}]", decl.unit);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
