use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use verity_core::serde::to_canonical_json_string;
use verity_core::{ErrorInfo, VerityError};

use crate::entry::ProvenanceEntry;
use crate::ledger::ProvenanceLedger;

const CSV_HEADER: [&str; 9] = [
    "sequence",
    "run_id",
    "claim_id",
    "snapshot_checksum",
    "evaluators",
    "observed",
    "passed",
    "tolerance",
    "timestamp",
];

fn export_error(err: impl ToString, path: Option<&Path>) -> VerityError {
    let mut info = ErrorInfo::new("provenance-export", err.to_string());
    if let Some(path) = path {
        info = info.with_context("path", path.display().to_string());
    }
    VerityError::Serde(info)
}

/// Writes entries as canonical JSON, one entry per line.
pub fn write_jsonl<W: Write>(entries: &[ProvenanceEntry], mut writer: W) -> Result<(), VerityError> {
    for entry in entries {
        let line = to_canonical_json_string(entry)?;
        writeln!(writer, "{line}").map_err(|err| export_error(err, None))?;
    }
    writer.flush().map_err(|err| export_error(err, None))
}

/// Writes entries as flat CSV rows. Evaluators are joined with `;`; an
/// errored claim leaves `observed` empty.
pub fn write_csv<W: Write>(entries: &[ProvenanceEntry], writer: W) -> Result<(), VerityError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)
        .map_err(|err| export_error(err, None))?;
    for entry in entries {
        let evaluators = entry
            .evaluators
            .iter()
            .map(|stamp| stamp.to_string())
            .collect::<Vec<_>>()
            .join(";");
        wtr.write_record([
            entry.sequence.to_string(),
            entry.run_id.clone(),
            entry.claim_id.clone(),
            entry.snapshot_checksum.clone(),
            evaluators,
            entry.observed.map(|value| value.to_string()).unwrap_or_default(),
            entry.passed.to_string(),
            entry.tolerance.to_string(),
            entry.timestamp.clone(),
        ])
        .map_err(|err| export_error(err, None))?;
    }
    wtr.flush().map_err(|err| export_error(err, None))
}

/// Exports the ledger to a JSON lines file for external diffing.
pub fn export_jsonl(ledger: &ProvenanceLedger, out_path: &Path) -> Result<(), VerityError> {
    let file = File::create(out_path).map_err(|err| export_error(err, Some(out_path)))?;
    write_jsonl(ledger.entries(), BufWriter::new(file))
}

/// Exports the ledger to a CSV file.
pub fn export_csv(ledger: &ProvenanceLedger, out_path: &Path) -> Result<(), VerityError> {
    let file = File::create(out_path).map_err(|err| export_error(err, Some(out_path)))?;
    write_csv(ledger.entries(), BufWriter::new(file))
}
