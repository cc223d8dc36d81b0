use std::f64::consts::{LN_10, PI};

use verity_core::{EvaluatorId, EvaluatorStamp, ParameterSnapshot, ResultRecord, SchemaVersion, VerityError};

use crate::consts::{AVOGADRO, BOLTZMANN_J, ELEMENTARY_CHARGE, VACUUM_PERMITTIVITY};
use crate::{Evaluator, OutputDecl};

const OUTPUTS: &[OutputDecl] = &[
    OutputDecl::exact("confined_dielectric", ""),
    OutputDecl::exact("bulk_solvation_kj_mol", "kJ/mol"),
    OutputDecl::exact("pore_solvation_kj_mol", "kJ/mol"),
    OutputDecl::exact("dehydration_barrier_kj_mol", "kJ/mol"),
    OutputDecl::exact("steric_exclusion", ""),
    OutputDecl::exact("selectivity_log10", ""),
];

/// Pores narrower than this fraction of the solvated diameter block the complex outright.
const STERIC_FRACTION: f64 = 0.8;
const SIGMOID_CLIP: f64 = 50.0;

/// Born solvation free energy in kJ/mol for charge `z` and radius `radius_m`.
pub fn born_energy(z: f64, radius_m: f64, epsilon_r: f64) -> f64 {
    if radius_m <= 0.0 || epsilon_r <= 0.0 {
        return 0.0;
    }
    let prefactor = AVOGADRO * z * z * ELEMENTARY_CHARGE * ELEMENTARY_CHARGE
        / (8.0 * PI * VACUUM_PERMITTIVITY * radius_m);
    -prefactor * (1.0 - 1.0 / epsilon_r) * 1e-3
}

/// Effective dielectric constant in a pore of diameter `pore_nm` (logistic transition).
pub fn confined_dielectric(
    pore_nm: f64,
    epsilon_bulk: f64,
    epsilon_floor: f64,
    critical_nm: f64,
    width_nm: f64,
) -> f64 {
    let x = ((pore_nm - critical_nm) / width_nm).clamp(-SIGMOID_CLIP, SIGMOID_CLIP);
    let sigmoid = 1.0 / (1.0 + (-x).exp());
    epsilon_floor + (epsilon_bulk - epsilon_floor) * sigmoid
}

/// Dehydration barrier of an ion entering a confined pore.
///
/// Required: `bare_radius_nm`, `solvated_radius_nm`. Optional: `pore_diameter_nm`
/// (0.7), `charge` (1), `epsilon_bulk` (30), `epsilon_confined` (2),
/// `critical_diameter_nm` (0.7), `transition_width_nm` (0.1), `temperature` (298.15 K).
/// When the pore is sterically too small the barrier is the full bulk
/// desolvation energy and `steric_exclusion` is 1.
#[derive(Debug, Clone, Default)]
pub struct SolvationEvaluator;

impl SolvationEvaluator {
    /// Stable identifier.
    pub const ID: &'static str = "solvation";
}

impl Evaluator for SolvationEvaluator {
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
        let bare_radius = snapshot.positive("bare_radius_nm")?;
        let solvated_radius = snapshot.positive("solvated_radius_nm")?;
        let pore = snapshot.positive_or("pore_diameter_nm", 0.7)?;
        let charge = snapshot.scalar_or("charge", 1.0)?;
        let epsilon_bulk = snapshot.positive_or("epsilon_bulk", 30.0)?;
        let epsilon_floor = snapshot.positive_or("epsilon_confined", 2.0)?;
        let critical = snapshot.positive_or("critical_diameter_nm", 0.7)?;
        let width = snapshot.positive_or("transition_width_nm", 0.1)?;
        let temperature = snapshot.positive_or("temperature", 298.15)?;

        let radius_m = bare_radius * 1e-9;
        let epsilon_pore = confined_dielectric(pore, epsilon_bulk, epsilon_floor, critical, width);
        let bulk = born_energy(charge, radius_m, epsilon_bulk);
        let confined = born_energy(charge, radius_m, epsilon_pore);
        let steric = pore < 2.0 * solvated_radius * STERIC_FRACTION;
        let barrier = if steric { bulk.abs() } else { confined - bulk };
        let rt = BOLTZMANN_J * temperature * AVOGADRO / 1000.0;

        ResultRecord::builder(self.stamp(), snapshot.checksum())
            .output("confined_dielectric", epsilon_pore, "")
            .output("bulk_solvation_kj_mol", bulk, "kJ/mol")
            .output("pore_solvation_kj_mol", confined, "kJ/mol")
            .output("dehydration_barrier_kj_mol", barrier, "kJ/mol")
            .output("steric_exclusion", if steric { 1.0 } else { 0.0 }, "")
            .output("selectivity_log10", barrier / (rt * LN_10), "")
            .build()
    }
}
