mod common;

use std::fs;

use tempfile::tempdir;
use verity_claims::{ClaimSet, ClaimStatus, Derivation, Expectation, Verifier};
use verity_core::{codes, Tolerance, VerityError};
use verity_eval::EvaluatorSet;

const CLAIM_SET: &str = r#"
policy:
  concurrency: 3
snapshots:
  - name: llzo
    params:
      k_ic: { value: 1.0, unit: "MPa*m^0.5" }
      flaw_size: { value: 1.0e-5, unit: m }
      kt: { value: 7 }
  - name: llzo-blunt
    params:
      k_ic: { value: 1.0, unit: "MPa*m^0.5" }
      flaw_size: { value: 1.0e-5, unit: m }
      kt: { value: 3.5 }
claims:
  - id: critical-pressure
    label: Critical pressure for Li penetration
    expected: 25.4
    tolerance: { absolute: 0.5 }
    sources:
      - { evaluator: fracture, output: critical_pressure_mpa, snapshot: llzo }
  - id: blunting-gain
    label: Blunting doubles the threshold
    expected: { low: 1.95, high: 2.05 }
    derivation: ratio
    sources:
      - { evaluator: fracture, output: critical_pressure_mpa, snapshot: llzo-blunt }
      - { evaluator: fracture, output: critical_pressure_mpa, snapshot: llzo }
"#;

#[test]
fn yaml_claim_set_loads_and_verifies() -> Result<(), VerityError> {
    let set = EvaluatorSet::with_builtins();
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("claims.yaml");
    fs::write(&path, CLAIM_SET).expect("write");

    let claim_set = ClaimSet::load(&path, &set)?;
    assert_eq!(claim_set.policy.concurrency, 3);
    assert_eq!(claim_set.policy.rounding, 1e-12);
    assert_eq!(claim_set.store.len(), 2);
    let gain = claim_set.registry.get("blunting-gain").expect("claim");
    assert_eq!(gain.derivation, Derivation::Ratio);
    assert_eq!(gain.expected, Expectation::Range { low: 1.95, high: 2.05 });
    assert_eq!(gain.tolerance, Tolerance::Range { low: 1.95, high: 2.05 });

    let verifier = Verifier::new(set, claim_set.policy);
    let report = verifier.verify(&claim_set.registry, &claim_set.store, &mut common::fixed_ledger())?;
    assert!(report.all_passed(), "{}", report.summary_text());
    assert_eq!(report.outcome("blunting-gain").map(|row| row.status), Some(ClaimStatus::Passed));
    Ok(())
}

#[test]
fn point_expectation_without_tolerance_is_invalid() {
    let yaml = r#"
claims:
  - id: loose
    expected: 1.0
    sources:
      - { evaluator: fracture, output: critical_pressure_mpa, snapshot: llzo }
"#;
    let err = ClaimSet::from_yaml_slice(yaml.as_bytes(), &EvaluatorSet::with_builtins())
        .expect_err("no tolerance");
    assert_eq!(err.code(), codes::INVALID_CLAIM);
}

#[test]
fn unresolved_source_in_file_fails_load() {
    let yaml = r#"
claims:
  - id: renamed
    expected: 9.1
    tolerance: { relative: 0.01 }
    sources:
      - { evaluator: phase_field, output: max_deflection_nm, snapshot: graded }
"#;
    let err = ClaimSet::from_yaml_slice(yaml.as_bytes(), &EvaluatorSet::with_builtins())
        .expect_err("unresolved");
    assert_eq!(err.code(), codes::UNRESOLVED_SOURCE);
}

#[test]
fn tampered_snapshot_checksum_is_rejected() {
    let yaml = r#"
snapshots:
  - name: llzo
    checksum: "0000"
    params:
      kt: { value: 7 }
claims: []
"#;
    let err = ClaimSet::from_yaml_slice(yaml.as_bytes(), &EvaluatorSet::with_builtins())
        .expect_err("checksum");
    assert!(err.to_string().contains("snapshot-checksum"));
}
