use std::collections::BTreeMap;
use std::sync::Arc;

use verity_core::{codes, ErrorInfo, EvaluatorId, VerityError};

use crate::{
    DegradationEvaluator, Evaluator, FractureEvaluator, OutputDecl, PhaseFieldEvaluator,
    SolvationEvaluator, TransportEvaluator,
};

fn registry_error(code: &str, message: impl Into<String>) -> VerityError {
    VerityError::Registry(ErrorInfo::new(code, message.into()))
}

/// Evaluators available to a verification run, keyed by identity.
#[derive(Clone, Default)]
pub struct EvaluatorSet {
    evaluators: BTreeMap<EvaluatorId, Arc<dyn Evaluator>>,
}

impl std::fmt::Debug for EvaluatorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluatorSet")
            .field("evaluators", &self.evaluators.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EvaluatorSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set holding every built-in physics family with default budgets.
    pub fn with_builtins() -> Self {
        let mut set = Self::new();
        let builtins: [Arc<dyn Evaluator>; 5] = [
            Arc::new(PhaseFieldEvaluator::default()),
            Arc::new(TransportEvaluator::default()),
            Arc::new(FractureEvaluator),
            Arc::new(DegradationEvaluator::default()),
            Arc::new(SolvationEvaluator),
        ];
        for evaluator in builtins {
            let id = evaluator.stamp().id;
            set.evaluators.insert(id, evaluator);
        }
        set
    }

    /// Adds an evaluator; identities are unique within a set.
    pub fn register(&mut self, evaluator: Arc<dyn Evaluator>) -> Result<(), VerityError> {
        let id = evaluator.stamp().id;
        if self.evaluators.contains_key(&id) {
            return Err(VerityError::Registry(
                ErrorInfo::new(
                    codes::DUPLICATE_EVALUATOR,
                    format!("evaluator `{id}` is already registered"),
                )
                .with_context("evaluator", id.as_str()),
            ));
        }
        self.evaluators.insert(id, evaluator);
        Ok(())
    }

    /// Looks up an evaluator.
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Evaluator>> {
        self.evaluators.get(&EvaluatorId::new(id))
    }

    /// Looks up an evaluator, failing with `unknown-evaluator`.
    pub fn require(&self, id: &str) -> Result<&Arc<dyn Evaluator>, VerityError> {
        self.get(id).ok_or_else(|| {
            registry_error(
                codes::UNKNOWN_EVALUATOR,
                format!("evaluator `{id}` is not registered"),
            )
        })
    }

    /// Whether `evaluator` exists and declares `output`.
    pub fn resolves(&self, evaluator: &str, output: &str) -> bool {
        self.get(evaluator)
            .map(|found| found.declares(output))
            .unwrap_or(false)
    }

    /// Declared output set of every evaluator, in identity order.
    pub fn catalogue(&self) -> Vec<(EvaluatorId, Vec<OutputDecl>)> {
        self.evaluators
            .iter()
            .map(|(id, evaluator)| (id.clone(), evaluator.outputs().to_vec()))
            .collect()
    }

    /// Identities in order.
    pub fn ids(&self) -> impl Iterator<Item = &EvaluatorId> {
        self.evaluators.keys()
    }

    /// Number of registered evaluators.
    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }
}
