//! Provenance ledger for published claim values.
//!
//! Every verification run appends one [`ProvenanceEntry`] per claim. The
//! ledger is append-only; drift and consistency checks read it back.

pub mod clock;
pub mod drift;
pub mod entry;
pub mod export;
pub mod ledger;

pub use clock::{Clock, FixedClock, SystemClock};
pub use drift::{DriftStatus, DEFAULT_DRIFT_ROUNDING};
pub use entry::{EntryDraft, ProvenanceEntry};
pub use export::{export_csv, export_jsonl, write_csv, write_jsonl};
pub use ledger::ProvenanceLedger;
