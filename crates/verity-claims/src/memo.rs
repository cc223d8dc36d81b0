//! Single-flight memoization of evaluator runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use tracing::debug;
use verity_core::{ErrorInfo, EvaluatorStamp, ParameterSnapshot, ResultRecord, VerityError};
use verity_eval::Evaluator;

type Outcome = Result<Arc<ResultRecord>, VerityError>;
type Slot = Arc<OnceLock<Outcome>>;

/// Result records keyed by (evaluator, snapshot checksum).
///
/// At most one evaluation runs per key: concurrent callers for the same key
/// block on the slot and share the one outcome, failures included.
/// Evaluators are deterministic, so a cached failure is as good as a rerun.
#[derive(Debug, Default)]
pub struct MemoTable {
    slots: Mutex<HashMap<(EvaluatorStamp, String), Slot>>,
    evaluations: AtomicUsize,
    hits: AtomicUsize,
}

impl MemoTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record for `snapshot` under `evaluator`, evaluating at most once.
    pub fn get_or_evaluate(
        &self,
        evaluator: &dyn Evaluator,
        snapshot: &ParameterSnapshot,
    ) -> Result<Arc<ResultRecord>, VerityError> {
        let stamp = evaluator.stamp();
        let key = (stamp.clone(), snapshot.checksum().to_string());
        let slot = {
            let mut slots = self.slots.lock().map_err(|_| {
                VerityError::Verification(ErrorInfo::new(
                    "memo-poisoned",
                    "memo table lock was poisoned by a panicking evaluator",
                ))
            })?;
            Arc::clone(slots.entry(key).or_default())
        };

        let mut evaluated = false;
        let outcome = slot.get_or_init(|| {
            evaluated = true;
            self.evaluations.fetch_add(1, Ordering::SeqCst);
            debug!(evaluator = %stamp, snapshot = snapshot.name(), checksum = snapshot.checksum(), "memo miss");
            evaluator.evaluate(snapshot).map(Arc::new)
        });
        if !evaluated {
            self.hits.fetch_add(1, Ordering::SeqCst);
            debug!(evaluator = %stamp, snapshot = snapshot.name(), "memo hit");
        }
        outcome.clone()
    }

    /// Number of evaluator invocations performed.
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }

    /// Number of lookups served from an existing slot.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Number of distinct keys seen.
    pub fn len(&self) -> usize {
        self.slots.lock().map(|slots| slots.len()).unwrap_or(0)
    }

    /// Whether nothing has been looked up yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
