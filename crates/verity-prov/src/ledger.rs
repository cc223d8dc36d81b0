use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};
use verity_core::serde::{from_json_slice, to_canonical_json_string};
use verity_core::{codes, ErrorInfo, EvaluatorStamp, VerityError};

use crate::clock::{Clock, SystemClock};
use crate::drift::{self, DriftStatus, DEFAULT_DRIFT_ROUNDING};
use crate::entry::{EntryDraft, ProvenanceEntry};

fn ledger_error(code: &str, message: impl Into<String>, path: Option<&Path>) -> VerityError {
    let mut info = ErrorInfo::new(code, message.into());
    if let Some(path) = path {
        info = info.with_context("path", path.display().to_string());
    }
    VerityError::Provenance(info)
}

/// Append-only sequence of provenance entries, optionally mirrored to a JSON
/// lines file.
pub struct ProvenanceLedger {
    entries: Vec<ProvenanceEntry>,
    path: Option<PathBuf>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for ProvenanceLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvenanceLedger")
            .field("entries", &self.entries.len())
            .field("path", &self.path)
            .finish()
    }
}

impl Default for ProvenanceLedger {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl ProvenanceLedger {
    /// Ledger that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            entries: Vec::new(),
            path: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Opens (or starts) a JSON lines ledger at `path`. Existing entries are
    /// loaded; new ones are appended to the same file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, VerityError> {
        let path = path.as_ref();
        let mut entries = Vec::new();
        if path.exists() {
            let text = fs::read_to_string(path)
                .map_err(|err| ledger_error("ledger-read", err.to_string(), Some(path)))?;
            for (idx, line) in text.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let entry: ProvenanceEntry = from_json_slice(line.as_bytes()).map_err(|err| {
                    VerityError::Provenance(
                        ErrorInfo::new("ledger-parse", err.info().message.clone())
                            .with_context("path", path.display().to_string())
                            .with_context("line", (idx + 1).to_string()),
                    )
                })?;
                entries.push(entry);
            }
        }
        debug!(path = %path.display(), entries = entries.len(), "opened provenance ledger");
        Ok(Self {
            entries,
            path: Some(path.to_path_buf()),
            clock: Arc::new(SystemClock),
        })
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Backing file, when file-backed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Appends one entry.
    pub fn append(&mut self, draft: EntryDraft) -> Result<&ProvenanceEntry, VerityError> {
        self.append_all(vec![draft])?;
        self.entries
            .last()
            .ok_or_else(|| ledger_error("ledger-write", "append produced no entry", None))
    }

    /// Appends a batch of entries with consecutive sequence numbers. The file
    /// is written before the in-memory view changes, so a failed write leaves
    /// the ledger untouched.
    pub fn append_all(&mut self, drafts: Vec<EntryDraft>) -> Result<(), VerityError> {
        if drafts.is_empty() {
            return Ok(());
        }
        let timestamp = self.clock.now_rfc3339();
        let first = self.next_sequence();
        let sealed: Vec<ProvenanceEntry> = drafts
            .into_iter()
            .enumerate()
            .map(|(offset, draft)| draft.seal(first + offset as u64, timestamp.clone()))
            .collect();

        if let Some(path) = &self.path {
            let mut buffer = String::new();
            for entry in &sealed {
                buffer.push_str(&to_canonical_json_string(entry)?);
                buffer.push('\n');
            }
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|err| ledger_error("ledger-write", err.to_string(), Some(path)))?;
            file.write_all(buffer.as_bytes())
                .map_err(|err| ledger_error("ledger-write", err.to_string(), Some(path)))?;
        }
        info!(appended = sealed.len(), first_sequence = first, "provenance entries appended");
        self.entries.extend(sealed);
        Ok(())
    }

    fn next_sequence(&self) -> u64 {
        self.entries.last().map(|entry| entry.sequence + 1).unwrap_or(1)
    }

    /// Fresh run identifier, distinct from every run already in the ledger.
    pub fn next_run_id(&self) -> String {
        let runs: BTreeSet<&str> = self.entries.iter().map(|entry| entry.run_id.as_str()).collect();
        let mut ordinal = runs.len() + 1;
        loop {
            let candidate = format!("run-{ordinal:04}");
            if !runs.contains(candidate.as_str()) {
                return candidate;
            }
            ordinal += 1;
        }
    }

    /// All entries in append order.
    pub fn entries(&self) -> &[ProvenanceEntry] {
        &self.entries
    }

    /// Entries recorded for one claim, oldest first.
    pub fn entries_for<'a, 'b>(
        &'a self,
        claim_id: &'b str,
    ) -> impl DoubleEndedIterator<Item = &'a ProvenanceEntry> + 'b
    where
        'a: 'b,
    {
        self.entries
            .iter()
            .filter(move |entry| entry.claim_id == claim_id)
    }

    /// Most recent entry for a claim.
    pub fn latest(&self, claim_id: &str) -> Option<&ProvenanceEntry> {
        self.entries_for(claim_id).next_back()
    }

    /// Claim ids in order of first appearance.
    pub fn claim_ids(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.entries
            .iter()
            .filter(|entry| seen.insert(entry.claim_id.as_str()))
            .map(|entry| entry.claim_id.as_str())
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drift status of one claim against its previous published value.
    pub fn check_drift(&self, claim_id: &str) -> DriftStatus {
        self.check_drift_with(claim_id, DEFAULT_DRIFT_ROUNDING)
    }

    /// [`Self::check_drift`] with explicit floating point slack.
    pub fn check_drift_with(&self, claim_id: &str, rounding: f64) -> DriftStatus {
        drift::assess(claim_id, self.entries_for(claim_id), rounding)
    }

    /// Drift status for every claim in the ledger, in first-appearance order.
    pub fn drift_all(&self, rounding: f64) -> Vec<(String, DriftStatus)> {
        self.claim_ids()
            .into_iter()
            .map(|claim| (claim.to_string(), self.check_drift_with(claim, rounding)))
            .collect()
    }

    /// Verifies the ledger is internally consistent: sequence numbers strictly
    /// increase, and entries for the same claim, checksum and evaluator
    /// versions agree on the value.
    pub fn check_consistency(&self) -> Result<(), VerityError> {
        let mut previous_sequence = 0u64;
        let mut published: BTreeMap<(&str, &str, &[EvaluatorStamp]), &ProvenanceEntry> =
            BTreeMap::new();
        for entry in &self.entries {
            if entry.sequence <= previous_sequence {
                return Err(VerityError::Provenance(
                    ErrorInfo::new(
                        "ledger-sequence",
                        format!(
                            "sequence {} follows {previous_sequence}; ledger is not append-only",
                            entry.sequence
                        ),
                    )
                    .with_context("claim", entry.claim_id.clone()),
                ));
            }
            previous_sequence = entry.sequence;

            let Some(value) = entry.observed else {
                continue;
            };
            let key = (
                entry.claim_id.as_str(),
                entry.snapshot_checksum.as_str(),
                entry.evaluators.as_slice(),
            );
            match published.get(&key) {
                Some(first) if first.observed != Some(value) => {
                    return Err(VerityError::Provenance(
                        ErrorInfo::new(
                            codes::INCONSISTENT_PROVENANCE,
                            format!(
                                "claim `{}` recorded different values for the same snapshot and evaluators",
                                entry.claim_id
                            ),
                        )
                        .with_context("claim", entry.claim_id.clone())
                        .with_context("checksum", entry.snapshot_checksum.clone())
                        .with_context("first_sequence", first.sequence.to_string())
                        .with_context("second_sequence", entry.sequence.to_string())
                        .with_hint("an evaluator is not deterministic or the ledger was edited"),
                    ));
                }
                Some(_) => {}
                None => {
                    published.insert(key, entry);
                }
            }
        }
        Ok(())
    }
}
