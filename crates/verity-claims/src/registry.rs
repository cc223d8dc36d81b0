//! Registration-time binding of claims to declared evaluator outputs.

use indexmap::IndexMap;
use tracing::debug;
use verity_core::{codes, ErrorInfo, VerityError};
use verity_eval::EvaluatorSet;

use crate::claim::Claim;

/// Claims in registration order. Report order follows this order.
#[derive(Debug, Clone, Default)]
pub struct ClaimRegistry {
    claims: IndexMap<String, Claim>,
}

impl ClaimRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a claim after checking its shape and resolving every source
    /// against `evaluators`. A renamed output fails here, before any run.
    pub fn register(&mut self, evaluators: &EvaluatorSet, claim: Claim) -> Result<(), VerityError> {
        claim.validate()?;
        if self.claims.contains_key(&claim.id) {
            return Err(VerityError::Registry(
                ErrorInfo::new(
                    codes::DUPLICATE_CLAIM,
                    format!("claim `{}` is already registered", claim.id),
                )
                .with_context("claim", claim.id.clone()),
            ));
        }
        for source in &claim.sources {
            if !evaluators.resolves(source.evaluator.as_str(), &source.output) {
                return Err(VerityError::unresolved_source(
                    &claim.id,
                    source.evaluator.as_str(),
                    &source.output,
                ));
            }
        }
        debug!(claim = %claim.id, sources = claim.sources.len(), "claim registered");
        self.claims.insert(claim.id.clone(), claim);
        Ok(())
    }

    /// Registers several claims, stopping at the first failure.
    pub fn register_all<I>(&mut self, evaluators: &EvaluatorSet, claims: I) -> Result<(), VerityError>
    where
        I: IntoIterator<Item = Claim>,
    {
        for claim in claims {
            self.register(evaluators, claim)?;
        }
        Ok(())
    }

    /// Looks up a claim.
    pub fn get(&self, id: &str) -> Option<&Claim> {
        self.claims.get(id)
    }

    /// Claims in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Claim> {
        self.claims.values()
    }

    /// Claim ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.claims.keys().map(String::as_str)
    }

    /// Number of claims.
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Whether no claim is registered.
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}
