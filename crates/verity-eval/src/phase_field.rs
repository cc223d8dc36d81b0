//! Coupled Allen-Cahn / diffusion model of an electrodeposition front pushing
//! into a solid electrolyte whose stiffness resists the plating strain.
//!
//! The order parameter `phi` is 1 in lithium and 0 in electrolyte; `c` is the
//! normalised ion concentration replenished from the far boundary. Both fields
//! use explicit finite differences on a unit-spaced grid with zero-flux walls.

use tracing::debug;
use verity_core::{
    ErrorInfo, EvaluatorId, EvaluatorStamp, ParameterSnapshot, ResultRecord, SchemaVersion,
    Series, VerityError,
};

use crate::consts::{FARADAY, LI_MOLAR_VOLUME};
use crate::{check_budget, Evaluator, OutputDecl};

const OUTPUTS: &[OutputDecl] = &[
    OutputDecl::exact("baseline_max_deflection_nm", "nm"),
    OutputDecl::exact("baseline_peak_stress_mpa", "MPa"),
    OutputDecl::exact("baseline_penetration_pct", "%"),
    OutputDecl::exact("treatment_max_deflection_nm", "nm"),
    OutputDecl::exact("treatment_peak_stress_mpa", "MPa"),
    OutputDecl::exact("treatment_penetration_pct", "%"),
    OutputDecl::exact("trap_threshold_mpa", "MPa"),
];

/// Explicit-scheme stability ceiling for `dt * rate * 4` on a unit grid.
const STABILITY_LIMIT: f64 = 0.5;
/// Order-parameter excursion treated as blow-up.
const PHI_LOWER: f64 = -0.5;
const PHI_UPPER: f64 = 1.5;
/// Rows kept free between the front and the far wall.
const WALL_MARGIN: usize = 2;

const fn default_budget() -> u64 {
    200_000
}

fn diverged(message: impl Into<String>, profile: Profile) -> VerityError {
    VerityError::Simulation(
        ErrorInfo::new(verity_core::codes::DIVERGED_SIMULATION, message.into())
            .with_context("profile", profile.label()),
    )
}

/// Stiffness field used for one integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Uniform stiffness everywhere.
    Baseline,
    /// Stiffness rising linearly with depth below the initial front.
    Treatment,
}

impl Profile {
    fn label(self) -> &'static str {
        match self {
            Profile::Baseline => "baseline",
            Profile::Treatment => "treatment",
        }
    }
}

#[derive(Debug, Clone)]
struct Config {
    nx: usize,
    ny: usize,
    steps: u64,
    dt: f64,
    mobility: f64,
    kappa: f64,
    interface_width: f64,
    driving_force: f64,
    coupling: f64,
    misfit: f64,
    stiffness_gpa: f64,
    gradient: f64,
    energy_scale_mpa: f64,
    diffusivity: f64,
    consumption: f64,
    front: f64,
    bump_amplitude: f64,
    bump_width: f64,
    cell_nm: f64,
}

impl Config {
    fn from_snapshot(snapshot: &ParameterSnapshot) -> Result<Self, VerityError> {
        let nx = snapshot.count_or("grid_nx", 64)? as usize;
        let ny = snapshot.count_or("grid_ny", 128)? as usize;
        if nx < 4 || ny < 8 {
            return Err(VerityError::invalid_parameter(
                "grid_ny",
                format!("grid {nx}x{ny} is too small; need at least 4x8"),
            ));
        }
        let interface_width = snapshot.positive_or("interface_width", 2.0)?;
        let front = snapshot.scalar_or("front_position", (ny / 8) as f64)?;
        let bump_amplitude = snapshot.scalar_or("perturbation_amplitude", 3.0)?;
        if front < 1.0 || front + bump_amplitude.abs() >= (ny - 1 - WALL_MARGIN) as f64 {
            return Err(VerityError::invalid_parameter(
                "front_position",
                format!("initial front {front} (+/- {bump_amplitude}) does not fit a grid of depth {ny}"),
            ));
        }
        Ok(Self {
            nx,
            ny,
            steps: snapshot.count("steps")?,
            dt: snapshot.positive_or("dt", 0.02)?,
            mobility: snapshot.positive_or("mobility", 1.0)?,
            kappa: interface_width * interface_width,
            interface_width,
            driving_force: snapshot.scalar_or("driving_force", 0.3)?,
            coupling: snapshot.scalar_or("coupling", 1.0)?,
            misfit: snapshot.scalar_or("misfit_strain", 0.05)?,
            stiffness_gpa: snapshot.positive("stiffness")?,
            gradient: snapshot.scalar_or("stiffness_gradient", 0.02)?,
            energy_scale_mpa: snapshot.positive_or("energy_scale", 100.0)?,
            diffusivity: snapshot.positive_or("diffusivity", 1.0)?,
            consumption: snapshot.scalar_or("consumption", 0.05)?,
            front,
            bump_amplitude,
            bump_width: snapshot.positive_or("perturbation_width", 4.0)?,
            cell_nm: snapshot.positive_or("cell_size_nm", 2.0)?,
        })
    }

    fn check_stability(&self) -> Result<(), VerityError> {
        let phase = self.dt * self.mobility * self.kappa * 4.0;
        let diffusion = self.dt * self.diffusivity * 4.0;
        if phase > STABILITY_LIMIT || diffusion > STABILITY_LIMIT {
            return Err(VerityError::Simulation(
                ErrorInfo::new(
                    verity_core::codes::DIVERGED_SIMULATION,
                    "time step exceeds the explicit stability limit",
                )
                .with_context("phase_number", phase.to_string())
                .with_context("diffusion_number", diffusion.to_string())
                .with_hint("reduce `dt`, `mobility`, `interface_width` or `diffusivity`"),
            ));
        }
        Ok(())
    }

    fn stiffness_at(&self, profile: Profile, row: f64) -> f64 {
        match profile {
            Profile::Baseline => self.stiffness_gpa,
            Profile::Treatment => {
                self.stiffness_gpa * (1.0 + self.gradient * (row - self.front).max(0.0))
            }
        }
    }

    fn elastic_penalty(&self, profile: Profile, row: usize) -> f64 {
        let energy_mpa = 0.5 * self.stiffness_at(profile, row as f64) * 1000.0 * self.misfit * self.misfit;
        self.coupling * energy_mpa / self.energy_scale_mpa
    }
}

/// Outcome of one integration.
#[derive(Debug, Clone, PartialEq)]
struct FrontOutcome {
    max_deflection_nm: f64,
    peak_stress_mpa: f64,
    penetration_pct: f64,
    front: Vec<f64>,
}

struct Fields {
    nx: usize,
    ny: usize,
    phi: Vec<f64>,
    conc: Vec<f64>,
}

impl Fields {
    fn initial(cfg: &Config) -> Self {
        let (nx, ny) = (cfg.nx, cfg.ny);
        let mut phi = vec![0.0; nx * ny];
        let centre = (nx as f64 - 1.0) / 2.0;
        let steepness = (2.0 / cfg.kappa).sqrt();
        for x in 0..nx {
            let offset = x as f64 - centre;
            let height = cfg.front
                + cfg.bump_amplitude * (-(offset * offset) / (2.0 * cfg.bump_width * cfg.bump_width)).exp();
            for y in 0..ny {
                phi[y * nx + x] = 1.0 / (1.0 + (steepness * (y as f64 - height)).exp());
            }
        }
        Self {
            nx,
            ny,
            phi,
            conc: vec![1.0; nx * ny],
        }
    }

    fn laplacian(&self, field: &[f64], x: usize, y: usize) -> f64 {
        let nx = self.nx;
        let left = if x == 0 { x } else { x - 1 };
        let right = if x + 1 == nx { x } else { x + 1 };
        let up = if y == 0 { y } else { y - 1 };
        let down = if y + 1 == self.ny { y } else { y + 1 };
        field[y * nx + left] + field[y * nx + right] + field[up * nx + x] + field[down * nx + x]
            - 4.0 * field[y * nx + x]
    }

    /// Front height per column where `phi` crosses one half, or `None` if a
    /// column never crosses.
    fn front_heights(&self) -> Option<Vec<f64>> {
        let nx = self.nx;
        let mut heights = Vec::with_capacity(nx);
        for x in 0..nx {
            let mut found = None;
            for y in 1..self.ny {
                let above = self.phi[(y - 1) * nx + x];
                let here = self.phi[y * nx + x];
                if above >= 0.5 && here < 0.5 {
                    found = Some((y - 1) as f64 + (above - 0.5) / (above - here));
                    break;
                }
            }
            heights.push(found?);
        }
        Some(heights)
    }
}

fn integrate(cfg: &Config, profile: Profile) -> Result<FrontOutcome, VerityError> {
    let mut fields = Fields::initial(cfg);
    let (nx, ny) = (cfg.nx, cfg.ny);
    let penalty: Vec<f64> = (0..ny).map(|row| cfg.elastic_penalty(profile, row)).collect();
    let mut next_phi = fields.phi.clone();
    let mut next_conc = fields.conc.clone();
    let guard_row = ny - 1 - WALL_MARGIN;

    for step in 0..cfg.steps {
        for y in 0..ny {
            for x in 0..nx {
                let idx = y * nx + x;
                let p = fields.phi[idx];
                let c = fields.conc[idx];
                let lap = fields.laplacian(&fields.phi, x, y);
                let well = 2.0 * p * (1.0 - p) * (1.0 - 2.0 * p);
                let tilt = 30.0 * p * p * (1.0 - p) * (1.0 - p);
                let drive = cfg.driving_force * c - penalty[y];
                let updated = p + cfg.dt * cfg.mobility * (cfg.kappa * lap - well + tilt * drive);
                if !updated.is_finite() || !(PHI_LOWER..=PHI_UPPER).contains(&updated) {
                    return Err(diverged(
                        format!("order parameter left its bounds at step {step}"),
                        profile,
                    ));
                }
                next_phi[idx] = updated;
                let lap_c = fields.laplacian(&fields.conc, x, y);
                next_conc[idx] = if y + 1 == ny {
                    1.0
                } else {
                    c + cfg.dt * cfg.diffusivity * lap_c - cfg.consumption * (updated - p)
                };
            }
        }
        std::mem::swap(&mut fields.phi, &mut next_phi);
        std::mem::swap(&mut fields.conc, &mut next_conc);
        if fields.phi[guard_row * nx..(guard_row + 1) * nx]
            .iter()
            .any(|&value| value >= 0.5)
        {
            return Err(diverged(
                format!("interface reached the domain bound at step {step}"),
                profile,
            ));
        }
    }

    let front = fields
        .front_heights()
        .ok_or_else(|| diverged("interface is no longer a single front", profile))?;
    let tip = front.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let deflection = tip - cfg.front;
    let available = (ny - 1) as f64 - cfg.front;
    let concentration = 1.0 + 2.0 * (deflection.max(0.0) / cfg.interface_width).sqrt();
    let peak_stress = cfg.stiffness_at(profile, tip) * 1000.0 * cfg.misfit.abs() * concentration;

    Ok(FrontOutcome {
        max_deflection_nm: deflection * cfg.cell_nm,
        peak_stress_mpa: peak_stress,
        penetration_pct: 100.0 * deflection / available,
        front,
    })
}

/// Strain-energy trap threshold `F * eta / Omega` in MPa.
pub fn trap_threshold_mpa(overpotential_v: f64, molar_volume_m3: f64) -> f64 {
    FARADAY * overpotential_v / molar_volume_m3 / 1e6
}

/// Phase-field mechanics evaluator comparing a uniform and a graded stiffness field.
///
/// Required parameters: `steps`, `stiffness` (GPa). Optional: `grid_nx`,
/// `grid_ny`, `dt`, `mobility`, `interface_width`, `driving_force`,
/// `coupling`, `misfit_strain`, `stiffness_gradient` (per cell),
/// `energy_scale` (MPa), `diffusivity`, `consumption`, `front_position`,
/// `perturbation_amplitude`, `perturbation_width`, `cell_size_nm`,
/// `overpotential` (V) and `molar_volume` (m^3/mol).
#[derive(Debug, Clone)]
pub struct PhaseFieldEvaluator {
    budget: u64,
}

impl Default for PhaseFieldEvaluator {
    fn default() -> Self {
        Self {
            budget: default_budget(),
        }
    }
}

impl PhaseFieldEvaluator {
    /// Stable identifier.
    pub const ID: &'static str = "phase_field";

    /// Overrides the maximum number of time steps.
    pub fn with_budget(budget: u64) -> Self {
        Self { budget }
    }
}

fn front_series(cfg: &Config, outcome: &FrontOutcome) -> Series {
    let mut series = Series::new("x", "nm", "nm");
    for (x, height) in outcome.front.iter().enumerate() {
        series.push(x as f64 * cfg.cell_nm, (height - cfg.front) * cfg.cell_nm);
    }
    series
}

impl Evaluator for PhaseFieldEvaluator {
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
        let cfg = Config::from_snapshot(snapshot)?;
        check_budget(cfg.steps, self.budget)?;
        cfg.check_stability()?;
        let overpotential = snapshot.positive_or("overpotential", 0.05)?;
        let molar_volume = snapshot.positive_or("molar_volume", LI_MOLAR_VOLUME)?;

        let (baseline, treatment) = rayon::join(
            || integrate(&cfg, Profile::Baseline),
            || integrate(&cfg, Profile::Treatment),
        );
        let baseline = baseline?;
        let treatment = treatment?;
        debug!(
            baseline_nm = baseline.max_deflection_nm,
            treatment_nm = treatment.max_deflection_nm,
            steps = cfg.steps,
            "phase-field run"
        );

        ResultRecord::builder(self.stamp(), snapshot.checksum())
            .output("baseline_max_deflection_nm", baseline.max_deflection_nm, "nm")
            .output("baseline_peak_stress_mpa", baseline.peak_stress_mpa, "MPa")
            .output("baseline_penetration_pct", baseline.penetration_pct, "%")
            .output("treatment_max_deflection_nm", treatment.max_deflection_nm, "nm")
            .output("treatment_peak_stress_mpa", treatment.peak_stress_mpa, "MPa")
            .output("treatment_penetration_pct", treatment.penetration_pct, "%")
            .output("trap_threshold_mpa", trap_threshold_mpa(overpotential, molar_volume), "MPa")
            .series("baseline_front", front_series(&cfg, &baseline))
            .series("treatment_front", front_series(&cfg, &treatment))
            .build()
    }
}
