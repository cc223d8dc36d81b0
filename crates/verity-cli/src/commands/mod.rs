use std::fs;
use std::path::Path;

use verity_claims::ClaimSetFile;
use verity_core::serde::from_yaml_slice;
use verity_core::{ErrorInfo, ParameterStore, VerityError};

pub mod drift;
pub mod evaluate;
pub mod export;
pub mod outputs;
pub mod render;
pub mod verify;

/// Reads only the snapshot section of a claim-set file.
pub(crate) fn load_store(path: &Path) -> Result<ParameterStore, VerityError> {
    let bytes = fs::read(path).map_err(|err| {
        VerityError::Serde(
            ErrorInfo::new("claim-set-read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    let file: ClaimSetFile = from_yaml_slice(&bytes)?;
    ParameterStore::from_snapshots(file.snapshots)
}
