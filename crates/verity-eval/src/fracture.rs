use std::f64::consts::PI;

use verity_core::{EvaluatorId, EvaluatorStamp, ParameterSnapshot, ResultRecord, SchemaVersion, VerityError};

use crate::{Evaluator, OutputDecl};

const OUTPUTS: &[OutputDecl] = &[
    OutputDecl::exact("critical_stress_mpa", "MPa"),
    OutputDecl::exact("critical_pressure_mpa", "MPa"),
    OutputDecl::exact("failure_probability_pct", "%"),
];

const fn default_operating_pressure() -> f64 {
    0.5
}

const fn default_weibull_threshold() -> f64 {
    15.0
}

const fn default_weibull_scale() -> f64 {
    25.0
}

const fn default_weibull_modulus() -> f64 {
    3.5
}

/// Griffith critical stress `K_IC / sqrt(pi * a)` in MPa.
pub fn critical_stress(k_ic: f64, flaw_size_m: f64) -> f64 {
    k_ic / (PI * flaw_size_m).sqrt()
}

/// Critical applied pressure: the Griffith stress divided by the concentration factor.
pub fn critical_pressure(k_ic: f64, flaw_size_m: f64, kt: f64) -> f64 {
    critical_stress(k_ic, flaw_size_m) / kt
}

/// Weibull micro-crack probability at `pressure`, as a fraction in `[0, 1]`.
pub fn weibull_failure_probability(pressure: f64, threshold: f64, scale: f64, modulus: f64) -> f64 {
    if pressure <= threshold {
        return 0.0;
    }
    1.0 - (-((pressure - threshold) / scale).powf(modulus)).exp()
}

/// Closed-form fracture threshold evaluator.
///
/// Required parameters: `k_ic` (MPa*m^0.5), `flaw_size` (m), `kt`.
/// Optional: `operating_pressure`, `weibull_threshold`, `weibull_scale`,
/// `weibull_modulus` (MPa, MPa, MPa, dimensionless).
#[derive(Debug, Clone, Default)]
pub struct FractureEvaluator;

impl FractureEvaluator {
    /// Stable identifier.
    pub const ID: &'static str = "fracture";
}

impl Evaluator for FractureEvaluator {
    fn stamp(&self) -> EvaluatorStamp {
        EvaluatorStamp {
            id: EvaluatorId::new(Self::ID),
            version: SchemaVersion::new(1, 0, 0),
        }
    }

    fn outputs(&self) -> &[OutputDecl] {
        OUTPUTS
    }

    fn step_budget(&self) -> u64 {
        1
    }

    fn evaluate(&self, snapshot: &ParameterSnapshot) -> Result<ResultRecord, VerityError> {
        let k_ic = snapshot.positive("k_ic")?;
        let flaw = snapshot.positive("flaw_size")?;
        let kt = snapshot.positive("kt")?;
        let operating = snapshot.scalar_or("operating_pressure", default_operating_pressure())?;
        let threshold = snapshot.scalar_or("weibull_threshold", default_weibull_threshold())?;
        let scale = snapshot.positive_or("weibull_scale", default_weibull_scale())?;
        let modulus = snapshot.positive_or("weibull_modulus", default_weibull_modulus())?;

        let sigma_c = critical_stress(k_ic, flaw);
        let pressure_c = critical_pressure(k_ic, flaw, kt);
        let failure = weibull_failure_probability(operating, threshold, scale, modulus);

        ResultRecord::builder(self.stamp(), snapshot.checksum())
            .output("critical_stress_mpa", sigma_c, "MPa")
            .output("critical_pressure_mpa", pressure_c, "MPa")
            .output("failure_probability_pct", failure * 100.0, "%")
            .build()
    }
}
