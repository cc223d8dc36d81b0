//! The small formula language derived claims are written in.

use serde::{Deserialize, Serialize};
use verity_core::{codes, ErrorInfo, VerityError};

/// How a claim's sources combine into one observed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Derivation {
    /// The single source, unchanged.
    #[default]
    Value,
    /// `a / b`.
    Ratio,
    /// `a - b`.
    Difference,
    /// `100 * a / b`.
    Percentage,
    /// `100 * (a - b) / b`.
    PercentChange,
    /// Product of two or more sources.
    Product,
}

fn derivation_error(message: impl Into<String>) -> VerityError {
    VerityError::Verification(ErrorInfo::new(codes::DERIVATION, message))
}

impl Derivation {
    /// Whether the formula accepts `count` sources.
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Derivation::Value => count == 1,
            Derivation::Product => count >= 2,
            _ => count == 2,
        }
    }

    /// Whether the claim combines several outputs.
    pub fn is_derived(&self) -> bool {
        !matches!(self, Derivation::Value)
    }

    /// Evaluates the formula. A zero denominator or a non-finite result is an
    /// error, never an infinity.
    pub fn apply(&self, inputs: &[f64]) -> Result<f64, VerityError> {
        if !self.accepts(inputs.len()) {
            return Err(derivation_error(format!(
                "{self:?} cannot combine {} inputs",
                inputs.len()
            )));
        }
        let value = match self {
            Derivation::Value => inputs[0],
            Derivation::Difference => inputs[0] - inputs[1],
            Derivation::Product => inputs.iter().product(),
            Derivation::Ratio | Derivation::Percentage | Derivation::PercentChange => {
                let (a, b) = (inputs[0], inputs[1]);
                if b == 0.0 {
                    return Err(derivation_error(format!(
                        "{self:?} divides by a zero-valued source"
                    )));
                }
                match self {
                    Derivation::Ratio => a / b,
                    Derivation::Percentage => 100.0 * a / b,
                    _ => 100.0 * (a - b) / b,
                }
            }
        };
        if !value.is_finite() {
            return Err(derivation_error(format!("{self:?} produced {value}")));
        }
        Ok(value)
    }
}
