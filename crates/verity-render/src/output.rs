use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use verity_core::serde::to_canonical_json_bytes;
use verity_core::{ErrorInfo, VerityError};

use crate::artifact::RenderedArtifact;

fn write_error(err: impl ToString, path: &Path) -> VerityError {
    VerityError::Serde(
        ErrorInfo::new("render-write", err.to_string())
            .with_context("path", path.display().to_string()),
    )
}

/// One manifest row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// File name relative to the output directory.
    pub name: String,
    /// Hex SHA-256 of the file.
    pub sha256: String,
    /// Snapshot checksum behind the figure.
    pub source_checksum: String,
    /// Source record hash.
    pub record_hash: String,
}

/// `manifest.json` written next to rendered figures. Contains no timestamps,
/// so identical inputs give identical manifests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    /// Rows in render order.
    pub artifacts: Vec<ManifestEntry>,
}

/// Writes artefacts and `manifest.json` into `out_dir`.
pub fn write_artifacts(artifacts: &[RenderedArtifact], out_dir: &Path) -> Result<ArtifactManifest, VerityError> {
    fs::create_dir_all(out_dir).map_err(|err| write_error(err, out_dir))?;
    for artifact in artifacts {
        let path = out_dir.join(&artifact.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| write_error(err, parent))?;
        }
        fs::write(&path, &artifact.bytes).map_err(|err| write_error(err, &path))?;
    }
    let manifest = ArtifactManifest {
        artifacts: artifacts
            .iter()
            .map(|artifact| ManifestEntry {
                name: artifact.name.clone(),
                sha256: artifact.sha256.clone(),
                source_checksum: artifact.source_checksum.clone(),
                record_hash: artifact.record_hash.clone(),
            })
            .collect(),
    };
    let manifest_path = out_dir.join("manifest.json");
    fs::write(&manifest_path, to_canonical_json_bytes(&manifest)?)
        .map_err(|err| write_error(err, &manifest_path))?;
    info!(dir = %out_dir.display(), artifacts = artifacts.len(), "figures written");
    Ok(manifest)
}
