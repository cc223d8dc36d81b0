//! YAML claim-set documents: policy, snapshots and claim declarations.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use verity_core::serde::from_yaml_slice;
use verity_core::{codes, ErrorInfo, ParameterSnapshot, ParameterStore, Tolerance, VerityError};
use verity_eval::EvaluatorSet;

use crate::claim::{Claim, Expectation, Source};
use crate::formula::Derivation;
use crate::policy::VerifyPolicy;
use crate::registry::ClaimRegistry;

/// Claim as written in a claim-set file. Range expectations may omit the
/// tolerance; point expectations must state one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimSpec {
    /// Claim id.
    pub id: String,
    /// Human label.
    #[serde(default)]
    pub label: String,
    /// `12.7` or `{ low: 7.0, high: 8.0 }`.
    pub expected: Expectation,
    /// Tolerance policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<Tolerance>,
    /// Formula over the sources; defaults to `value`.
    #[serde(default)]
    pub derivation: Derivation,
    /// Sources in formula order.
    pub sources: Vec<Source>,
}

impl ClaimSpec {
    /// Resolves defaults into a [`Claim`].
    pub fn into_claim(self) -> Result<Claim, VerityError> {
        let tolerance = match (self.tolerance, self.expected) {
            (Some(tolerance), _) => tolerance,
            (None, Expectation::Range { low, high }) => Tolerance::Range { low, high },
            (None, Expectation::Value(_)) => {
                return Err(VerityError::Registry(
                    ErrorInfo::new(
                        codes::INVALID_CLAIM,
                        format!("claim `{}` expects a value but states no tolerance", self.id),
                    )
                    .with_context("claim", self.id.clone())
                    .with_hint("add `tolerance: { absolute: .. }` or `tolerance: { relative: .. }`"),
                ))
            }
        };
        Ok(Claim {
            id: self.id,
            label: self.label,
            expected: self.expected,
            tolerance,
            derivation: self.derivation,
            sources: self.sources,
        })
    }
}

/// Raw shape of a claim-set document.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimSetFile {
    /// Run policy.
    #[serde(default)]
    pub policy: VerifyPolicy,
    /// Named parameter snapshots.
    #[serde(default)]
    pub snapshots: Vec<ParameterSnapshot>,
    /// Claim declarations in report order.
    #[serde(default)]
    pub claims: Vec<ClaimSpec>,
}

/// A loaded claim set: claims are registered (and their sources resolved)
/// against the evaluator set passed at load time.
#[derive(Debug, Clone)]
pub struct ClaimSet {
    /// Run policy.
    pub policy: VerifyPolicy,
    /// Snapshots by name.
    pub store: ParameterStore,
    /// Registered claims.
    pub registry: ClaimRegistry,
}

impl ClaimSet {
    /// Builds a claim set from a parsed document.
    pub fn from_file(file: ClaimSetFile, evaluators: &EvaluatorSet) -> Result<Self, VerityError> {
        let store = ParameterStore::from_snapshots(file.snapshots)?;
        let mut registry = ClaimRegistry::new();
        for spec in file.claims {
            registry.register(evaluators, spec.into_claim()?)?;
        }
        Ok(Self {
            policy: file.policy,
            store,
            registry,
        })
    }

    /// Parses YAML bytes.
    pub fn from_yaml_slice(bytes: &[u8], evaluators: &EvaluatorSet) -> Result<Self, VerityError> {
        let file: ClaimSetFile = from_yaml_slice(bytes)?;
        Self::from_file(file, evaluators)
    }

    /// Reads a YAML claim-set file.
    pub fn load(path: impl AsRef<Path>, evaluators: &EvaluatorSet) -> Result<Self, VerityError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| {
            VerityError::Serde(
                ErrorInfo::new("claim-set-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml_slice(&bytes, evaluators)
    }
}
