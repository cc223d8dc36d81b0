#![allow(dead_code)]

use verity_core::{ParameterSnapshot, VerityError};

pub fn fracture_snapshot(name: &str, kt: f64) -> Result<ParameterSnapshot, VerityError> {
    ParameterSnapshot::builder(name)
        .scalar("k_ic", 1.0, "MPa*m^0.5")
        .scalar("flaw_size", 10e-6, "m")
        .scalar("kt", kt, "")
        .build()
}

pub fn phase_field_snapshot(name: &str, steps: f64) -> Result<ParameterSnapshot, VerityError> {
    ParameterSnapshot::builder(name)
        .scalar("grid_nx", 24.0, "cells")
        .scalar("grid_ny", 48.0, "cells")
        .scalar("steps", steps, "")
        .scalar("stiffness", 20.0, "GPa")
        .scalar("stiffness_gradient", 0.02, "1/cell")
        .scalar("coupling", 1.0, "")
        .scalar("interface_width", 2.0, "cells")
        .scalar("misfit_strain", 0.05, "")
        .build()
}

/// Linear MSD trace `6 D t` with a deterministic wobble.
pub fn msd_trace(samples: usize, slope: f64, wobble: f64) -> Vec<f64> {
    (0..samples)
        .map(|idx| {
            let t = idx as f64;
            let jitter = if idx % 2 == 0 { wobble } else { -wobble };
            slope * t + jitter
        })
        .collect()
}

pub fn transport_snapshot(name: &str, msd: Vec<f64>) -> Result<ParameterSnapshot, VerityError> {
    ParameterSnapshot::builder(name)
        .series("msd", msd, "A^2")
        .scalar("dt", 1.0, "ps")
        .scalar("temperature", 300.0, "K")
        .scalar("ion_count", 56.0, "")
        .scalar("volume_nm3", 2.2, "nm^3")
        .build()
}

pub fn degradation_snapshot(name: &str, cycles: f64, kt: f64, k_constraint: f64) -> Result<ParameterSnapshot, VerityError> {
    ParameterSnapshot::builder(name)
        .scalar("cycles", cycles, "cycles")
        .scalar("kt", kt, "")
        .scalar("k_constraint", k_constraint, "GPa")
        .scalar("c_rate", 0.33, "1/h")
        .scalar("temperature", 25.0, "C")
        .series("checkpoints", vec![500.0, 1000.0, 1234.0], "cycles")
        .build()
}
