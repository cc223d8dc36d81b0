//! Physics-based capacity fade: parabolic SEI growth, Paris-law fatigue and
//! Boltzmann-suppressed dendrite nucleation, summed into a retention curve.

use std::collections::BTreeSet;

use tracing::debug;
use verity_core::{
    codes, ErrorInfo, EvaluatorId, EvaluatorStamp, ParameterSnapshot, ResultRecord, RngHandle,
    SchemaVersion, Series, VerityError,
};

use crate::consts::{AVOGADRO, BOLTZMANN_EV, ELEMENTARY_CHARGE, LI_MOLAR_VOLUME, REFERENCE_TEMPERATURE_K, ZERO_CELSIUS_K};
use crate::{check_budget, Evaluator, OutputDecl};

/// Prefix of the per-checkpoint retention outputs.
pub const RETENTION_PREFIX: &str = "retention_pct@";

const OUTPUTS: &[OutputDecl] = &[
    OutputDecl::exact("cycling_stress_mpa", "MPa"),
    OutputDecl::exact("dendrite_barrier_mpa", "MPa"),
    OutputDecl::exact("nucleation_probability", ""),
    OutputDecl::exact("sei_thickness_nm", "nm"),
    OutputDecl::exact("fatigue_damage", ""),
    OutputDecl::exact("dendrite_events", ""),
    OutputDecl::exact("final_retention_pct", "%"),
    OutputDecl::exact("cycles_to_80_pct", "cycles"),
    OutputDecl::family(RETENTION_PREFIX, "%"),
];

const SEI_BASE_DIFFUSIVITY: f64 = 8e-22;
const SEI_ACTIVATION_EV: f64 = 0.35;
const SEI_CRACK_ONSET_MPA: f64 = 5.0;
const SEI_LOSS_PER_NM: f64 = 0.0002;
const PARIS_C: f64 = 1e-12;
const PARIS_M: f64 = 15.0;
const INITIAL_FLAW_M: f64 = 5e-6;
const CRITICAL_FLAW_M: f64 = 100e-6;
const FAST_FRACTURE_RATE: f64 = 1e-3;
const SEPARATOR_TOUGHNESS: f64 = 1.0;
const FATIGUE_LOSS_AT_FAILURE: f64 = 0.3;
const DENDRITE_LOSS_PER_EVENT: f64 = 0.02;
const END_OF_LIFE_PCT: f64 = 80.0;

const fn default_budget() -> u64 {
    1_000_000
}

const fn default_record_every() -> u64 {
    50
}

/// Architecture-derived rates that stay fixed over the cycling history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegradationRates {
    /// Interface stress amplitude `sigma_yield * K_t` (MPa).
    pub cycling_stress_mpa: f64,
    /// Elastic strain-energy barrier `0.5 * K * eps^2` (MPa).
    pub dendrite_barrier_mpa: f64,
    /// Stress- and temperature-adjusted SEI diffusivity (m^2/s).
    pub sei_diffusivity: f64,
    /// Duration of one charge/discharge cycle (s).
    pub cycle_seconds: f64,
    /// Paris-law crack growth per cycle (m).
    pub crack_growth_per_cycle: f64,
    /// Dendrite nucleation probability per cycle.
    pub nucleation_probability: f64,
}

impl DegradationRates {
    /// SEI thickness in nm after `cycle` cycles.
    pub fn sei_thickness_nm(&self, cycle: u64) -> f64 {
        (2.0 * self.sei_diffusivity * self.cycle_seconds * cycle as f64).sqrt() * 1e9
    }

    /// Fatigue damage in `[0, 1]` after `cycle` cycles, measured from the initial flaw.
    pub fn fatigue_damage(&self, cycle: u64) -> f64 {
        let grown = self.crack_growth_per_cycle * cycle as f64;
        (grown / (CRITICAL_FLAW_M - INITIAL_FLAW_M)).min(1.0)
    }

    /// Capacity retention in percent for the given cycle and dendrite event count.
    pub fn retention_pct(&self, cycle: u64, events: f64) -> f64 {
        let loss = SEI_LOSS_PER_NM * self.sei_thickness_nm(cycle)
            + FATIGUE_LOSS_AT_FAILURE * self.fatigue_damage(cycle)
            + DENDRITE_LOSS_PER_EVENT * events;
        (1.0 - loss).max(0.0) * 100.0
    }
}

/// Inputs of the degradation model after defaults are applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegradationInputs {
    /// Internal constraint stiffness (GPa).
    pub k_constraint_gpa: f64,
    /// Stress concentration factor at the interface.
    pub kt: f64,
    /// Charge rate (1/h).
    pub c_rate: f64,
    /// Cell temperature (Celsius).
    pub temperature_c: f64,
    /// Depth of discharge fraction.
    pub depth_of_discharge: f64,
    /// Plating current density (mA/cm^2).
    pub current_density: f64,
    /// Lithium yield stress at cycling strain rates (MPa).
    pub yield_stress_mpa: f64,
    /// Misfit strain at the dendrite tip.
    pub misfit_strain: f64,
}

impl DegradationInputs {
    fn from_snapshot(snapshot: &ParameterSnapshot) -> Result<Self, VerityError> {
        let k_constraint_gpa = snapshot.scalar("k_constraint")?;
        if k_constraint_gpa < 0.0 {
            return Err(VerityError::invalid_parameter(
                "k_constraint",
                format!("`k_constraint` must be non-negative, got {k_constraint_gpa}"),
            ));
        }
        let depth_of_discharge = snapshot.positive_or("depth_of_discharge", 0.8)?;
        if depth_of_discharge > 1.0 {
            return Err(VerityError::invalid_parameter(
                "depth_of_discharge",
                format!("`depth_of_discharge` must be at most 1, got {depth_of_discharge}"),
            ));
        }
        let temperature_c = snapshot.scalar_or("temperature", 25.0)?;
        if temperature_c + ZERO_CELSIUS_K <= 0.0 {
            return Err(VerityError::invalid_parameter(
                "temperature",
                format!("`temperature` {temperature_c} C is below absolute zero"),
            ));
        }
        Ok(Self {
            k_constraint_gpa,
            kt: snapshot.positive_or("kt", 1.0)?,
            c_rate: snapshot.positive_or("c_rate", 0.33)?,
            temperature_c,
            depth_of_discharge,
            current_density: snapshot.positive_or("current_density", 1.0)?,
            yield_stress_mpa: snapshot.positive_or("yield_stress", 2.0)?,
            misfit_strain: snapshot.positive_or("misfit_strain", 0.05)?,
        })
    }

    /// Derives the per-cycle rates.
    pub fn rates(&self) -> DegradationRates {
        let temperature_k = self.temperature_c + ZERO_CELSIUS_K;
        let cycling_stress_mpa = self.yield_stress_mpa * self.kt;
        let dendrite_barrier_mpa = 0.5 * self.k_constraint_gpa * 1000.0 * self.misfit_strain.powi(2);

        let arrhenius = (-SEI_ACTIVATION_EV / BOLTZMANN_EV
            * (1.0 / temperature_k - 1.0 / REFERENCE_TEMPERATURE_K))
            .exp();
        let stress_factor = 1.0 + (cycling_stress_mpa / SEI_CRACK_ONSET_MPA).powf(1.5);
        let sei_diffusivity = SEI_BASE_DIFFUSIVITY * arrhenius * stress_factor;
        let cycle_seconds = 3600.0 / self.c_rate * 2.0;

        let delta_sigma = cycling_stress_mpa * self.depth_of_discharge * self.kt;
        let delta_k = delta_sigma * (std::f64::consts::PI * INITIAL_FLAW_M).sqrt();
        let crack_growth_per_cycle = if delta_k >= SEPARATOR_TOUGHNESS {
            FAST_FRACTURE_RATE
        } else if delta_k > 0.0 {
            PARIS_C * (delta_k / SEPARATOR_TOUGHNESS).powf(PARIS_M)
        } else {
            0.0
        };

        let base_probability = 0.001 * (self.current_density / 0.33);
        let barrier_ev = dendrite_barrier_mpa * 1e6 * LI_MOLAR_VOLUME / AVOGADRO / ELEMENTARY_CHARGE;
        let suppression = if barrier_ev > 0.0 {
            (-barrier_ev / (BOLTZMANN_EV * temperature_k)).exp()
        } else {
            1.0
        };

        DegradationRates {
            cycling_stress_mpa,
            dendrite_barrier_mpa,
            sei_diffusivity,
            cycle_seconds,
            crack_growth_per_cycle,
            nucleation_probability: (base_probability * suppression).min(1.0),
        }
    }
}

/// Cycle-life evaluator.
///
/// Required parameters: `cycles`, `k_constraint` (GPa). Optional: `kt`,
/// `c_rate`, `temperature` (C), `depth_of_discharge`, `current_density`,
/// `yield_stress`, `misfit_strain`, `record_every`, `checkpoints` (series of
/// cycle numbers) and `seed`. Without `seed` dendrite events accumulate at
/// their expected rate; with it they are sampled from a seeded stream.
#[derive(Debug, Clone)]
pub struct DegradationEvaluator {
    budget: u64,
}

impl Default for DegradationEvaluator {
    fn default() -> Self {
        Self {
            budget: default_budget(),
        }
    }
}

impl DegradationEvaluator {
    /// Stable identifier.
    pub const ID: &'static str = "degradation";

    /// Overrides the maximum number of simulated cycles.
    pub fn with_budget(budget: u64) -> Self {
        Self { budget }
    }
}

fn checkpoint_cycles(snapshot: &ParameterSnapshot, cycles: u64) -> Result<BTreeSet<u64>, VerityError> {
    let record_every = snapshot.count_or("record_every", default_record_every())?;
    if record_every == 0 {
        return Err(VerityError::invalid_parameter(
            "record_every",
            "`record_every` must be at least 1",
        ));
    }
    let mut points: BTreeSet<u64> = (0..=cycles).step_by(record_every as usize).collect();
    points.insert(cycles);
    if let Some(requested) = snapshot.series_opt("checkpoints")? {
        for &value in requested {
            if value < 0.0 || value.fract() != 0.0 || value > cycles as f64 {
                return Err(VerityError::invalid_parameter(
                    "checkpoints",
                    format!("checkpoint {value} must be an integer cycle within 0..={cycles}"),
                ));
            }
            points.insert(value as u64);
        }
    }
    Ok(points)
}

impl Evaluator for DegradationEvaluator {
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

    fn produces(&self, output: &str, snapshot: &ParameterSnapshot) -> bool {
        let Some(cycle) = output
            .strip_prefix(RETENTION_PREFIX)
            .and_then(|suffix| suffix.parse::<u64>().ok())
        else {
            return self.declares(output);
        };
        // A malformed snapshot is left for `evaluate` to report.
        let Ok(cycles) = snapshot.count("cycles") else {
            return true;
        };
        checkpoint_cycles(snapshot, cycles)
            .map(|points| points.contains(&cycle))
            .unwrap_or(true)
    }

    fn evaluate(&self, snapshot: &ParameterSnapshot) -> Result<ResultRecord, VerityError> {
        let cycles = snapshot.count("cycles")?;
        check_budget(cycles, self.budget)?;
        let inputs = DegradationInputs::from_snapshot(snapshot)?;
        let rates = inputs.rates();
        let checkpoints = checkpoint_cycles(snapshot, cycles)?;
        let mut rng = match snapshot.get("seed") {
            Some(_) => Some(RngHandle::substream(snapshot.count("seed")?, 1)),
            None => None,
        };

        let mut curve = Series::new("cycle", "cycles", "%");
        let mut builder = ResultRecord::builder(self.stamp(), snapshot.checksum());
        let mut events = 0.0;
        let mut previous = f64::INFINITY;
        let mut cycles_to_80 = cycles;
        let mut crossed = false;
        let mut retention = 100.0;

        for cycle in 0..=cycles {
            if cycle > 0 {
                events = match rng.as_mut() {
                    Some(rng) => {
                        if rng.chance(rates.nucleation_probability) {
                            events + 1.0
                        } else {
                            events
                        }
                    }
                    None => rates.nucleation_probability * cycle as f64,
                };
            }
            retention = rates.retention_pct(cycle, events);
            if retention > previous {
                return Err(VerityError::Invariant(
                    ErrorInfo::new(
                        codes::RETENTION_NOT_MONOTONIC,
                        format!("retention rose from {previous} to {retention} at cycle {cycle}"),
                    )
                    .with_context("cycle", cycle.to_string()),
                ));
            }
            previous = retention;
            if !crossed && retention < END_OF_LIFE_PCT {
                cycles_to_80 = cycle;
                crossed = true;
            }
            if checkpoints.contains(&cycle) {
                curve.push(cycle as f64, retention);
                builder = builder.output(format!("{RETENTION_PREFIX}{cycle}"), retention, "%");
            }
        }

        debug!(
            cycles,
            final_retention = retention,
            cycles_to_80,
            events,
            "degradation run"
        );

        builder
            .output("cycling_stress_mpa", rates.cycling_stress_mpa, "MPa")
            .output("dendrite_barrier_mpa", rates.dendrite_barrier_mpa, "MPa")
            .output("nucleation_probability", rates.nucleation_probability, "")
            .output("sei_thickness_nm", rates.sei_thickness_nm(cycles), "nm")
            .output("fatigue_damage", rates.fatigue_damage(cycles), "")
            .output("dendrite_events", events, "")
            .output("final_retention_pct", retention, "%")
            .output("cycles_to_80_pct", cycles_to_80 as f64, "cycles")
            .series("retention", curve)
            .build()
    }
}
