use std::collections::BTreeMap;

use serde::Serialize;
use verity_core::serde::to_canonical_json_bytes;
use verity_core::{ErrorInfo, EvaluatorStamp, ResultRecord, VerityError};

use crate::artifact::RenderedArtifact;
use crate::spec::{FigureKind, FigureSpec};
use crate::FigureRenderer;

#[derive(Serialize)]
struct JsonOutput<'a> {
    value: f64,
    unit: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    uncertainty: Option<f64>,
}

#[derive(Serialize)]
struct JsonFigure<'a> {
    figure: &'a str,
    evaluator: &'a EvaluatorStamp,
    snapshot_checksum: &'a str,
    record_hash: &'a str,
    outputs: BTreeMap<&'a str, JsonOutput<'a>>,
}

/// Exports scalar outputs as canonical JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRecordRenderer;

impl FigureRenderer for JsonRecordRenderer {
    fn kind(&self) -> FigureKind {
        FigureKind::RecordJson
    }

    fn render(&self, figure: &FigureSpec, record: &ResultRecord) -> Result<RenderedArtifact, VerityError> {
        let names: Vec<&str> = if figure.outputs.is_empty() {
            record.output_names().collect()
        } else {
            figure.outputs.iter().map(String::as_str).collect()
        };
        let mut outputs = BTreeMap::new();
        for name in names {
            let output = record.output(name).ok_or_else(|| {
                VerityError::Serde(
                    ErrorInfo::new(
                        "render-missing-output",
                        format!("record from `{}` has no output `{name}`", record.evaluator()),
                    )
                    .with_context("figure", figure.name.clone()),
                )
            })?;
            outputs.insert(
                name,
                JsonOutput {
                    value: output.value,
                    unit: output.unit,
                    uncertainty: output.uncertainty,
                },
            );
        }
        let payload = JsonFigure {
            figure: &figure.name,
            evaluator: record.evaluator(),
            snapshot_checksum: record.snapshot_checksum(),
            record_hash: record.record_hash(),
            outputs,
        };
        let bytes = to_canonical_json_bytes(&payload)?;
        Ok(RenderedArtifact::new(
            &figure.name,
            "application/json",
            bytes,
            record.evaluator().clone(),
            record.snapshot_checksum(),
            record.record_hash(),
        ))
    }
}
