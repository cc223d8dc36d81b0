//! Tolerance policies shared by claims and the provenance ledger.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How far an observed value may sit from its expectation.
///
/// Serialized externally tagged, so YAML reads `{ absolute: 0.05 }`,
/// `{ relative: 0.01 }` or `{ range: { low: 7.0, high: 8.0 } }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tolerance {
    /// `|observed - expected| <= epsilon`.
    Absolute(f64),
    /// `|observed - expected| / |expected| <= epsilon`.
    Relative(f64),
    /// `low <= observed <= high`; the expected value is informational.
    Range {
        /// Inclusive lower bound.
        low: f64,
        /// Inclusive upper bound.
        high: f64,
    },
}

/// Outcome of comparing one observed value against a tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    /// Whether the observation is admitted.
    pub passed: bool,
    /// Signed distance past the tolerance boundary; negative means headroom.
    pub margin: f64,
}

impl Tolerance {
    /// Whether the bounds are finite and ordered.
    pub fn is_well_formed(&self) -> bool {
        match *self {
            Tolerance::Absolute(eps) | Tolerance::Relative(eps) => eps.is_finite() && eps >= 0.0,
            Tolerance::Range { low, high } => low.is_finite() && high.is_finite() && low <= high,
        }
    }

    /// Compares `observed` with `expected`. `rounding` absorbs floating point
    /// noise at the boundary.
    pub fn assess(&self, observed: f64, expected: f64, rounding: f64) -> Assessment {
        let margin = match *self {
            Tolerance::Absolute(eps) => (observed - expected).abs() - eps,
            Tolerance::Relative(eps) => {
                let scale = expected.abs();
                if scale == 0.0 {
                    (observed - expected).abs()
                } else {
                    (observed - expected).abs() / scale - eps
                }
            }
            Tolerance::Range { low, high } => (low - observed).max(observed - high),
        };
        Assessment {
            passed: margin <= rounding,
            margin,
        }
    }

    /// Whether moving from `previous` to `current` is a change worth
    /// re-publishing. Range tolerances drift when the value crosses a bound
    /// or moves while already outside.
    pub fn drifted(&self, previous: f64, current: f64, rounding: f64) -> bool {
        match *self {
            Tolerance::Range { .. } => {
                let before = self.assess(previous, previous, rounding).passed;
                let after = self.assess(current, current, rounding).passed;
                before != after || (!after && (current - previous).abs() > rounding)
            }
            _ => !self.assess(current, previous, rounding).passed,
        }
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tolerance::Absolute(eps) => write!(f, "abs:{eps}"),
            Tolerance::Relative(eps) => write!(f, "rel:{eps}"),
            Tolerance::Range { low, high } => write!(f, "range:[{low},{high}]"),
        }
    }
}
