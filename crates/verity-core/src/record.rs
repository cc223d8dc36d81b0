//! Evaluator result records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, VerityError};
use crate::hash::stable_hash_string;
use crate::provenance::EvaluatorStamp;

/// Sampled curve produced alongside scalar outputs (retention history, MSD, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Label of the x axis.
    pub x_label: String,
    /// Unit of the x axis.
    pub x_unit: String,
    /// Unit of the y axis.
    pub y_unit: String,
    /// `(x, y)` samples in x order.
    pub points: Vec<[f64; 2]>,
}

impl Series {
    /// Creates an empty series with axis metadata.
    pub fn new(
        x_label: impl Into<String>,
        x_unit: impl Into<String>,
        y_unit: impl Into<String>,
    ) -> Self {
        Self {
            x_label: x_label.into(),
            x_unit: x_unit.into(),
            y_unit: y_unit.into(),
            points: Vec::new(),
        }
    }

    /// Appends a sample.
    pub fn push(&mut self, x: f64, y: f64) {
        self.points.push([x, y]);
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Immutable outcome of one evaluator run over one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    evaluator: EvaluatorStamp,
    snapshot_checksum: String,
    outputs: BTreeMap<String, StoredOutput>,
    series: BTreeMap<String, Series>,
    record_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredOutput {
    value: f64,
    unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uncertainty: Option<f64>,
}

#[derive(Serialize)]
struct RecordHashPayload<'a> {
    evaluator: &'a EvaluatorStamp,
    snapshot_checksum: &'a str,
    outputs: &'a BTreeMap<String, StoredOutput>,
    series: &'a BTreeMap<String, Series>,
}

/// Borrowed view of a stored output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputRef<'a> {
    /// Output value.
    pub value: f64,
    /// Unit label.
    pub unit: &'a str,
    /// Optional one-sigma uncertainty.
    pub uncertainty: Option<f64>,
}

impl ResultRecord {
    /// Starts a record for the given evaluator and snapshot checksum.
    pub fn builder(evaluator: EvaluatorStamp, snapshot_checksum: impl Into<String>) -> RecordBuilder {
        RecordBuilder {
            evaluator,
            snapshot_checksum: snapshot_checksum.into(),
            outputs: BTreeMap::new(),
            series: BTreeMap::new(),
        }
    }

    /// Stamp of the evaluator that produced the record.
    pub fn evaluator(&self) -> &EvaluatorStamp {
        &self.evaluator
    }

    /// Checksum of the snapshot the record was computed from.
    pub fn snapshot_checksum(&self) -> &str {
        &self.snapshot_checksum
    }

    /// Stable hash over the full record contents.
    pub fn record_hash(&self) -> &str {
        &self.record_hash
    }

    /// Looks up an output by name.
    pub fn output(&self, name: &str) -> Option<OutputRef<'_>> {
        self.outputs.get(name).map(|stored| OutputRef {
            value: stored.value,
            unit: &stored.unit,
            uncertainty: stored.uncertainty,
        })
    }

    /// Value of a named output.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.outputs.get(name).map(|stored| stored.value)
    }

    /// Output names in order.
    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys().map(String::as_str)
    }

    /// Looks up a series by name.
    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.get(name)
    }
}

/// Builder validating outputs before freezing a [`ResultRecord`].
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    evaluator: EvaluatorStamp,
    snapshot_checksum: String,
    outputs: BTreeMap<String, StoredOutput>,
    series: BTreeMap<String, Series>,
}

impl RecordBuilder {
    /// Adds a scalar output.
    pub fn output(mut self, name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        self.outputs.insert(
            name.into(),
            StoredOutput {
                value,
                unit: unit.into(),
                uncertainty: None,
            },
        );
        self
    }

    /// Adds a scalar output with a one-sigma uncertainty.
    pub fn output_with_uncertainty(
        mut self,
        name: impl Into<String>,
        value: f64,
        unit: impl Into<String>,
        uncertainty: f64,
    ) -> Self {
        self.outputs.insert(
            name.into(),
            StoredOutput {
                value,
                unit: unit.into(),
                uncertainty: Some(uncertainty),
            },
        );
        self
    }

    /// Attaches a series.
    pub fn series(mut self, name: impl Into<String>, series: Series) -> Self {
        self.series.insert(name.into(), series);
        self
    }

    /// Freezes the record; any non-finite number is treated as divergence.
    pub fn build(self) -> Result<ResultRecord, VerityError> {
        for (name, stored) in &self.outputs {
            let finite = stored.value.is_finite()
                && stored.uncertainty.map_or(true, |sigma| sigma.is_finite());
            if !finite {
                return Err(VerityError::Simulation(
                    ErrorInfo::new(
                        crate::errors::codes::DIVERGED_SIMULATION,
                        format!("output `{name}` is not finite"),
                    )
                    .with_context("evaluator", self.evaluator.to_string())
                    .with_context("output", name.clone()),
                ));
            }
        }
        for (name, series) in &self.series {
            if series
                .points
                .iter()
                .any(|[x, y]| !x.is_finite() || !y.is_finite())
            {
                return Err(VerityError::Simulation(
                    ErrorInfo::new(
                        crate::errors::codes::DIVERGED_SIMULATION,
                        format!("series `{name}` contains a non-finite sample"),
                    )
                    .with_context("evaluator", self.evaluator.to_string())
                    .with_context("series", name.clone()),
                ));
            }
        }
        let record_hash = stable_hash_string(&RecordHashPayload {
            evaluator: &self.evaluator,
            snapshot_checksum: &self.snapshot_checksum,
            outputs: &self.outputs,
            series: &self.series,
        })?;
        Ok(ResultRecord {
            evaluator: self.evaluator,
            snapshot_checksum: self.snapshot_checksum,
            outputs: self.outputs,
            series: self.series,
            record_hash,
        })
    }
}
