use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use verity_core::serde::from_yaml_slice;
use verity_core::{ErrorInfo, EvaluatorId, VerityError};

/// Output format of a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FigureKind {
    /// One record series as CSV with a `#` provenance header.
    SeriesCsv,
    /// Selected scalar outputs as canonical JSON.
    RecordJson,
}

/// One figure: which record to draw from and what to extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureSpec {
    /// Artefact file name, e.g. `cycle_life.csv`.
    pub name: String,
    /// Format.
    pub kind: FigureKind,
    /// Evaluator that produces the record.
    pub evaluator: EvaluatorId,
    /// Snapshot the record is computed from.
    pub snapshot: String,
    /// Series to export (CSV figures).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    /// Outputs to export (JSON figures); empty means all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
}

/// A YAML rendering specification.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderSpec {
    /// Figures in output order.
    #[serde(default)]
    pub figures: Vec<FigureSpec>,
}

impl RenderSpec {
    /// Parses YAML bytes.
    pub fn from_yaml_slice(bytes: &[u8]) -> Result<Self, VerityError> {
        from_yaml_slice(bytes)
    }

    /// Reads a YAML render specification from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, VerityError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| {
            VerityError::Serde(
                ErrorInfo::new("render-spec-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml_slice(&bytes)
    }
}
