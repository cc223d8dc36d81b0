//! Immutable, content-addressed parameter snapshots and the store that names them.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{codes, ErrorInfo, VerityError};
use crate::hash::stable_hash_string;
use crate::provenance::SchemaVersion;

/// Schema version folded into every snapshot checksum.
pub const SNAPSHOT_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// A single named physical input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Parameter {
    /// Scalar quantity with a unit.
    Scalar {
        /// Numeric value.
        value: f64,
        /// Unit label (free-form, e.g. `MPa`).
        #[serde(default)]
        unit: String,
    },
    /// Ordered series sharing one unit (time samples, checkpoints, ...).
    Series {
        /// Numeric samples in order.
        series: Vec<f64>,
        /// Unit label shared by all samples.
        #[serde(default)]
        unit: String,
    },
}

impl Parameter {
    /// Creates a scalar parameter.
    pub fn scalar(value: f64, unit: impl Into<String>) -> Self {
        Parameter::Scalar {
            value,
            unit: unit.into(),
        }
    }

    /// Creates a series parameter.
    pub fn series(series: Vec<f64>, unit: impl Into<String>) -> Self {
        Parameter::Series {
            series,
            unit: unit.into(),
        }
    }

    /// Unit label of the parameter.
    pub fn unit(&self) -> &str {
        match self {
            Parameter::Scalar { unit, .. } | Parameter::Series { unit, .. } => unit,
        }
    }

    fn is_finite(&self) -> bool {
        match self {
            Parameter::Scalar { value, .. } => value.is_finite(),
            Parameter::Series { series, .. } => series.iter().all(|value| value.is_finite()),
        }
    }
}

#[derive(Serialize)]
struct ChecksumPayload<'a> {
    schema: SchemaVersion,
    params: &'a BTreeMap<String, Parameter>,
}

fn compute_checksum(params: &BTreeMap<String, Parameter>) -> Result<String, VerityError> {
    stable_hash_string(&ChecksumPayload {
        schema: SNAPSHOT_SCHEMA,
        params,
    })
}

/// Unvalidated snapshot shape as written in claim-set files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSpec {
    /// Snapshot name cited by claim sources.
    pub name: String,
    /// Parameters keyed by name.
    #[serde(default)]
    pub params: BTreeMap<String, Parameter>,
    /// Optional expected checksum; verified when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

/// Immutable named set of physical inputs to one evaluator run.
///
/// Identity is value based: two snapshots with identical parameters compare
/// equal and share a checksum regardless of their names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SnapshotSpec")]
pub struct ParameterSnapshot {
    name: String,
    params: BTreeMap<String, Parameter>,
    checksum: String,
}

impl TryFrom<SnapshotSpec> for ParameterSnapshot {
    type Error = VerityError;

    fn try_from(raw: SnapshotSpec) -> Result<Self, Self::Error> {
        let snapshot = SnapshotBuilder::from_parts(raw.name, raw.params).build()?;
        if let Some(expected) = raw.checksum {
            if expected != snapshot.checksum {
                return Err(VerityError::Serde(
                    ErrorInfo::new(
                        "snapshot-checksum",
                        format!("snapshot `{}` checksum does not match its contents", snapshot.name),
                    )
                    .with_context("expected", expected)
                    .with_context("actual", snapshot.checksum.clone()),
                ));
            }
        }
        Ok(snapshot)
    }
}

impl PartialEq for ParameterSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.checksum == other.checksum && self.params == other.params
    }
}

impl Eq for ParameterSnapshot {}

impl Hash for ParameterSnapshot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.checksum.hash(state);
    }
}

impl ParameterSnapshot {
    /// Starts building a snapshot with the provided name.
    pub fn builder(name: impl Into<String>) -> SnapshotBuilder {
        SnapshotBuilder::new(name)
    }

    /// Human readable snapshot name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Content checksum (hex SHA-256 over canonical JSON of the parameters).
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the snapshot defines no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Looks up a raw parameter.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.get(name)
    }

    /// Iterates parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.params.iter().map(|(name, param)| (name.as_str(), param))
    }

    /// Returns a required scalar parameter.
    pub fn scalar(&self, name: &str) -> Result<f64, VerityError> {
        match self.params.get(name) {
            Some(Parameter::Scalar { value, .. }) => Ok(*value),
            Some(Parameter::Series { .. }) => Err(VerityError::invalid_parameter(
                name,
                format!("`{name}` is a series but a scalar is required"),
            )),
            None => Err(VerityError::missing_parameter(&self.name, name)),
        }
    }

    /// Returns a scalar parameter or `default` when it is absent.
    pub fn scalar_or(&self, name: &str, default: f64) -> Result<f64, VerityError> {
        if self.params.contains_key(name) {
            self.scalar(name)
        } else {
            Ok(default)
        }
    }

    /// Returns a required strictly positive scalar.
    pub fn positive(&self, name: &str) -> Result<f64, VerityError> {
        let value = self.scalar(name)?;
        require_positive(name, value)
    }

    /// Returns a strictly positive scalar or `default` when absent.
    pub fn positive_or(&self, name: &str, default: f64) -> Result<f64, VerityError> {
        let value = self.scalar_or(name, default)?;
        require_positive(name, value)
    }

    /// Returns a required non-negative integral scalar.
    pub fn count(&self, name: &str) -> Result<u64, VerityError> {
        let value = self.scalar(name)?;
        to_count(name, value)
    }

    /// Returns a non-negative integral scalar or `default` when absent.
    pub fn count_or(&self, name: &str, default: u64) -> Result<u64, VerityError> {
        if self.params.contains_key(name) {
            self.count(name)
        } else {
            Ok(default)
        }
    }

    /// Returns a required series parameter.
    pub fn series(&self, name: &str) -> Result<&[f64], VerityError> {
        match self.params.get(name) {
            Some(Parameter::Series { series, .. }) => Ok(series),
            Some(Parameter::Scalar { .. }) => Err(VerityError::invalid_parameter(
                name,
                format!("`{name}` is a scalar but a series is required"),
            )),
            None => Err(VerityError::missing_parameter(&self.name, name)),
        }
    }

    /// Returns a series parameter, or `None` when absent.
    pub fn series_opt(&self, name: &str) -> Result<Option<&[f64]>, VerityError> {
        if self.params.contains_key(name) {
            self.series(name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Starts a builder pre-populated with this snapshot's parameters.
    ///
    /// The original snapshot is untouched; the builder yields a new snapshot.
    pub fn to_builder(&self, name: impl Into<String>) -> SnapshotBuilder {
        SnapshotBuilder::from_parts(name.into(), self.params.clone())
    }
}

fn require_positive(name: &str, value: f64) -> Result<f64, VerityError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(VerityError::invalid_parameter(
            name,
            format!("`{name}` must be strictly positive, got {value}"),
        ))
    }
}

fn to_count(name: &str, value: f64) -> Result<u64, VerityError> {
    if value < 0.0 || value.fract() != 0.0 || value > u64::MAX as f64 {
        return Err(VerityError::invalid_parameter(
            name,
            format!("`{name}` must be a non-negative integer, got {value}"),
        ));
    }
    Ok(value as u64)
}

/// Builder producing frozen [`ParameterSnapshot`] values.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    name: String,
    params: BTreeMap<String, Parameter>,
}

impl SnapshotBuilder {
    /// Creates an empty builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    fn from_parts(name: String, params: BTreeMap<String, Parameter>) -> Self {
        Self { name, params }
    }

    /// Sets (or overrides) a scalar parameter.
    pub fn scalar(mut self, name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        self.params
            .insert(name.into(), Parameter::scalar(value, unit));
        self
    }

    /// Sets (or overrides) a series parameter.
    pub fn series(
        mut self,
        name: impl Into<String>,
        values: Vec<f64>,
        unit: impl Into<String>,
    ) -> Self {
        self.params
            .insert(name.into(), Parameter::series(values, unit));
        self
    }

    /// Sets (or overrides) a raw parameter.
    pub fn parameter(mut self, name: impl Into<String>, parameter: Parameter) -> Self {
        self.params.insert(name.into(), parameter);
        self
    }

    /// Validates the parameters and freezes the snapshot.
    pub fn build(self) -> Result<ParameterSnapshot, VerityError> {
        if self.name.trim().is_empty() {
            return Err(VerityError::Parameter(ErrorInfo::new(
                codes::INVALID_PARAMETER,
                "snapshot names must be non-empty",
            )));
        }
        for (name, param) in &self.params {
            if !param.is_finite() {
                return Err(VerityError::Parameter(
                    ErrorInfo::new(
                        codes::NON_FINITE_PARAMETER,
                        format!("`{name}` contains a non-finite value"),
                    )
                    .with_context("snapshot", self.name.clone())
                    .with_context("parameter", name.clone()),
                ));
            }
        }
        let checksum = compute_checksum(&self.params)?;
        Ok(ParameterSnapshot {
            name: self.name,
            params: self.params,
            checksum,
        })
    }
}

/// Named collection of snapshots a claim set can cite.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    snapshots: BTreeMap<String, Arc<ParameterSnapshot>>,
}

impl ParameterStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from snapshots, rejecting duplicate names.
    pub fn from_snapshots<I>(snapshots: I) -> Result<Self, VerityError>
    where
        I: IntoIterator<Item = ParameterSnapshot>,
    {
        let mut store = Self::new();
        for snapshot in snapshots {
            store.insert(snapshot)?;
        }
        Ok(store)
    }

    /// Adds a snapshot; names are unique within a store.
    pub fn insert(&mut self, snapshot: ParameterSnapshot) -> Result<(), VerityError> {
        if self.snapshots.contains_key(snapshot.name()) {
            return Err(VerityError::Parameter(
                ErrorInfo::new(
                    codes::DUPLICATE_SNAPSHOT,
                    format!("snapshot `{}` is already defined", snapshot.name()),
                )
                .with_context("snapshot", snapshot.name()),
            ));
        }
        self.snapshots
            .insert(snapshot.name().to_string(), Arc::new(snapshot));
        Ok(())
    }

    /// Returns a copy of the store with one snapshot swapped for a new version.
    pub fn with_replaced(&self, snapshot: ParameterSnapshot) -> Self {
        let mut snapshots = self.snapshots.clone();
        snapshots.insert(snapshot.name().to_string(), Arc::new(snapshot));
        Self { snapshots }
    }

    /// Looks up a snapshot by name.
    pub fn get(&self, name: &str) -> Option<&Arc<ParameterSnapshot>> {
        self.snapshots.get(name)
    }

    /// Looks up a snapshot by name, failing when absent.
    pub fn require(&self, name: &str) -> Result<&Arc<ParameterSnapshot>, VerityError> {
        self.snapshots.get(name).ok_or_else(|| {
            VerityError::Verification(
                ErrorInfo::new(
                    codes::MISSING_SNAPSHOT,
                    format!("snapshot `{name}` is not part of the parameter store"),
                )
                .with_context("snapshot", name),
            )
        })
    }

    /// Whether a snapshot with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.snapshots.contains_key(name)
    }

    /// Iterates snapshot names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.snapshots.keys().map(String::as_str)
    }

    /// Number of snapshots in the store.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
