#![deny(missing_docs)]
#![doc = "Core data types for the verity claim-verification pipeline: parameter snapshots, evaluator result records, stable hashing and the shared error surface."]

pub mod errors;
pub mod hash;
pub mod provenance;
pub mod record;
pub mod rng;
pub mod serde;
pub mod snapshot;
pub mod tolerance;

pub use errors::{codes, ErrorInfo, VerityError};
pub use hash::{combine_checksums, sha256_hex, stable_hash_string};
pub use provenance::{EvaluatorId, EvaluatorStamp, SchemaVersion};
pub use record::{OutputRef, RecordBuilder, ResultRecord, Series};
pub use rng::{derive_substream_seed, RngHandle};
pub use snapshot::{
    Parameter, ParameterSnapshot, ParameterStore, SnapshotBuilder, SnapshotSpec, SNAPSHOT_SCHEMA,
};
pub use tolerance::{Assessment, Tolerance};
