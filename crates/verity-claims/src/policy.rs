use serde::{Deserialize, Serialize};

/// Run-wide settings for a verification pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerifyPolicy {
    /// Worker threads used to check independent claims.
    #[serde(default = "VerifyPolicy::default_concurrency")]
    pub concurrency: usize,
    /// Floating point slack applied at tolerance boundaries and in drift checks.
    #[serde(default = "VerifyPolicy::default_rounding")]
    pub rounding: f64,
}

impl VerifyPolicy {
    const fn default_concurrency() -> usize {
        1
    }

    const fn default_rounding() -> f64 {
        1e-12
    }

    /// Overrides the worker count.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

impl Default for VerifyPolicy {
    fn default() -> Self {
        Self {
            concurrency: Self::default_concurrency(),
            rounding: Self::default_rounding(),
        }
    }
}
