use verity_core::serde::{from_json_slice, from_yaml_slice, to_canonical_json_bytes, to_yaml_string};
use verity_core::{
    EvaluatorId, EvaluatorStamp, ParameterSnapshot, ResultRecord, SchemaVersion, Series,
    VerityError,
};

#[test]
fn snapshot_roundtrip_preserves_checksum() -> Result<(), VerityError> {
    let snapshot = ParameterSnapshot::builder("transport")
        .series("msd", vec![0.0, 6.0, 12.0, 18.0], "A^2")
        .scalar("dt", 1.0, "ps")
        .scalar("temperature", 300.0, "K")
        .build()?;
    let bytes = to_canonical_json_bytes(&snapshot)?;
    let restored: ParameterSnapshot = from_json_slice(&bytes)?;
    assert_eq!(snapshot, restored);
    assert_eq!(snapshot.checksum(), restored.checksum());
    assert_eq!(restored.name(), "transport");
    Ok(())
}

#[test]
fn snapshot_survives_yaml_with_its_checksum() -> Result<(), VerityError> {
    let snapshot = ParameterSnapshot::builder("llzo")
        .scalar("k_ic", 1.0, "MPa*m^0.5")
        .scalar("flaw_size", 1.0e-5, "m")
        .series("checkpoints", vec![500.0, 1000.0], "cycles")
        .build()?;
    let yaml = to_yaml_string(&snapshot)?;
    assert!(yaml.contains("checksum:"));
    let restored: ParameterSnapshot = from_yaml_slice(yaml.as_bytes())?;
    assert_eq!(restored.checksum(), snapshot.checksum());
    Ok(())
}

#[test]
fn tampered_checksum_is_rejected() {
    let payload = br#"{"name":"x","params":{"kt":{"value":7.0,"unit":""}},"checksum":"deadbeef"}"#;
    let result: Result<ParameterSnapshot, VerityError> = from_json_slice(payload);
    assert!(matches!(result, Err(VerityError::Serde(_))));
}

#[test]
fn record_hash_tracks_outputs() -> Result<(), VerityError> {
    let stamp = EvaluatorStamp {
        id: EvaluatorId::new("fracture"),
        version: SchemaVersion::new(1, 0, 0),
    };
    let mut curve = Series::new("cycle", "", "%");
    curve.push(0.0, 100.0);
    let first = ResultRecord::builder(stamp.clone(), "abc")
        .output("critical_pressure_mpa", 25.49, "MPa")
        .series("curve", curve.clone())
        .build()?;
    let second = ResultRecord::builder(stamp.clone(), "abc")
        .output("critical_pressure_mpa", 25.49, "MPa")
        .series("curve", curve)
        .build()?;
    let third = ResultRecord::builder(stamp, "abc")
        .output("critical_pressure_mpa", 25.50, "MPa")
        .build()?;
    assert_eq!(first.record_hash(), second.record_hash());
    assert_ne!(first.record_hash(), third.record_hash());
    assert_eq!(first.output("critical_pressure_mpa").map(|o| o.unit), Some("MPa"));
    Ok(())
}

#[test]
fn non_finite_outputs_are_divergence() {
    let stamp = EvaluatorStamp {
        id: EvaluatorId::new("fracture"),
        version: SchemaVersion::default(),
    };
    let err = ResultRecord::builder(stamp, "abc")
        .output("critical_pressure_mpa", f64::INFINITY, "MPa")
        .build()
        .unwrap_err();
    assert_eq!(err.code(), verity_core::codes::DIVERGED_SIMULATION);
}
