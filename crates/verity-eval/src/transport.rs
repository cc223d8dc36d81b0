use tracing::debug;
use verity_core::{
    codes, ErrorInfo, EvaluatorId, EvaluatorStamp, ParameterSnapshot, ResultRecord,
    SchemaVersion, Series, VerityError,
};

use crate::consts::{A2_PER_PS_TO_M2_PER_S, BOLTZMANN_J, ELEMENTARY_CHARGE};
use crate::fit::fit_line;
use crate::{check_budget, Evaluator, OutputDecl};

const OUTPUTS: &[OutputDecl] = &[
    OutputDecl::exact("diffusion_m2_s", "m^2/s"),
    OutputDecl::exact("conductivity_ms_cm", "mS/cm"),
    OutputDecl::exact("r_squared", ""),
    OutputDecl::exact("msd_slope_a2_ps", "A^2/ps"),
    OutputDecl::exact("fit_start_ps", "ps"),
    OutputDecl::exact("fit_end_ps", "ps"),
];

const fn default_fit_start() -> f64 {
    0.2
}

const fn default_fit_end() -> f64 {
    0.8
}

const fn default_min_r_squared() -> f64 {
    0.90
}

const fn default_dims() -> u64 {
    3
}

const fn default_budget() -> u64 {
    10_000_000
}

/// Nernst-Einstein conductivity in S/m for `n` carriers per m^3 of charge `z`.
pub fn nernst_einstein(number_density: f64, charge: f64, diffusion_m2_s: f64, temperature_k: f64) -> f64 {
    let q = charge * ELEMENTARY_CHARGE;
    number_density * q * q * diffusion_m2_s / (BOLTZMANN_J * temperature_k)
}

/// Fits the diffusive regime of a mean-squared-displacement trace.
///
/// Required parameters: `msd` (series, A^2), `dt` (ps between samples),
/// `temperature` (K), and either `number_density` (1/m^3) or `ion_count`
/// together with `volume_nm3`. Optional: `charge` (default 1), `dims`
/// (default 3), `fit_start`/`fit_end` window fractions (0.2/0.8) and
/// `min_r_squared` (0.90).
#[derive(Debug, Clone)]
pub struct TransportEvaluator {
    budget: u64,
}

impl Default for TransportEvaluator {
    fn default() -> Self {
        Self {
            budget: default_budget(),
        }
    }
}

impl TransportEvaluator {
    /// Stable identifier.
    pub const ID: &'static str = "transport";

    /// Overrides the maximum number of MSD samples accepted.
    pub fn with_budget(budget: u64) -> Self {
        Self { budget }
    }
}

fn number_density(snapshot: &ParameterSnapshot) -> Result<f64, VerityError> {
    if snapshot.get("number_density").is_some() {
        return snapshot.positive("number_density");
    }
    let ions = snapshot.positive("ion_count")?;
    let volume_nm3 = snapshot.positive("volume_nm3")?;
    Ok(ions / (volume_nm3 * 1e-27))
}

impl Evaluator for TransportEvaluator {
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
        self.budget
    }

    fn evaluate(&self, snapshot: &ParameterSnapshot) -> Result<ResultRecord, VerityError> {
        let msd = snapshot.series("msd")?;
        check_budget(msd.len() as u64, self.budget)?;
        let dt = snapshot.positive("dt")?;
        let temperature = snapshot.positive("temperature")?;
        let charge = snapshot.scalar_or("charge", 1.0)?;
        let density = number_density(snapshot)?;
        let dims = snapshot.count_or("dims", default_dims())?;
        if !(1..=3).contains(&dims) {
            return Err(VerityError::invalid_parameter(
                "dims",
                format!("`dims` must be 1, 2 or 3, got {dims}"),
            ));
        }
        let start = snapshot.scalar_or("fit_start", default_fit_start())?;
        let end = snapshot.scalar_or("fit_end", default_fit_end())?;
        if !(0.0..1.0).contains(&start) || end <= start || end > 1.0 {
            return Err(VerityError::invalid_parameter(
                "fit_start",
                format!("fit window [{start}, {end}] must satisfy 0 <= start < end <= 1"),
            ));
        }
        let min_r_squared = snapshot.scalar_or("min_r_squared", default_min_r_squared())?;

        let n = msd.len();
        let lo = (start * n as f64).floor() as usize;
        let hi = ((end * n as f64).ceil() as usize).min(n);
        if hi.saturating_sub(lo) < 3 {
            return Err(VerityError::Parameter(
                ErrorInfo::new(
                    codes::INVALID_PARAMETER,
                    format!("fit window holds {} samples; at least 3 are required", hi.saturating_sub(lo)),
                )
                .with_context("parameter", "msd")
                .with_context("samples", n.to_string()),
            ));
        }
        let times: Vec<f64> = (lo..hi).map(|idx| idx as f64 * dt).collect();
        let fit = fit_line(&times, &msd[lo..hi])?;
        debug!(
            r_squared = fit.r_squared,
            slope = fit.slope,
            samples = fit.samples,
            "msd fit"
        );
        if fit.r_squared < min_r_squared {
            return Err(VerityError::insufficient_regime(fit.r_squared, min_r_squared));
        }
        if fit.slope <= 0.0 {
            return Err(VerityError::Fit(
                ErrorInfo::new(
                    codes::INSUFFICIENT_DIFFUSIVE_REGIME,
                    format!("fitted MSD slope {} is not positive", fit.slope),
                )
                .with_context("r_squared", fit.r_squared.to_string()),
            ));
        }

        let scale = A2_PER_PS_TO_M2_PER_S / (2.0 * dims as f64);
        let diffusion = fit.slope * scale;
        let diffusion_err = fit.slope_std_error * scale;
        let sigma_ms_cm = nernst_einstein(density, charge, diffusion, temperature) * 10.0;
        let sigma_err = nernst_einstein(density, charge, diffusion_err, temperature) * 10.0;

        let mut trace = Series::new("time", "ps", "A^2");
        for (idx, value) in msd.iter().enumerate() {
            trace.push(idx as f64 * dt, *value);
        }

        ResultRecord::builder(self.stamp(), snapshot.checksum())
            .output_with_uncertainty("diffusion_m2_s", diffusion, "m^2/s", diffusion_err)
            .output_with_uncertainty("conductivity_ms_cm", sigma_ms_cm, "mS/cm", sigma_err)
            .output("r_squared", fit.r_squared, "")
            .output_with_uncertainty("msd_slope_a2_ps", fit.slope, "A^2/ps", fit.slope_std_error)
            .output("fit_start_ps", times[0], "ps")
            .output("fit_end_ps", times[times.len() - 1], "ps")
            .series("msd", trace)
            .build()
    }
}
