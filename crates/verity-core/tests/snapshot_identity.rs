use verity_core::{codes, ParameterSnapshot, ParameterStore, VerityError};

fn interface(name: &str, kt: f64) -> Result<ParameterSnapshot, VerityError> {
    ParameterSnapshot::builder(name)
        .scalar("k_ic", 1.0, "MPa*m^0.5")
        .scalar("flaw_size", 1e-5, "m")
        .scalar("kt", kt, "")
        .build()
}

#[test]
fn identical_content_shares_identity_across_names() -> Result<(), VerityError> {
    let first = interface("llzo_baseline", 7.0)?;
    let second = interface("llzo_copy", 7.0)?;
    assert_eq!(first.checksum(), second.checksum());
    assert_eq!(first, second);
    assert_ne!(first.name(), second.name());
    Ok(())
}

#[test]
fn any_parameter_change_changes_checksum() -> Result<(), VerityError> {
    let base = interface("llzo", 7.0)?;
    let bumped = base.to_builder("llzo").scalar("kt", 7.5, "").build()?;
    assert_ne!(base.checksum(), bumped.checksum());
    assert_ne!(base, bumped);
    assert_eq!(base.scalar("kt")?, 7.0);
    Ok(())
}

#[test]
fn non_finite_values_are_rejected() {
    let err = ParameterSnapshot::builder("broken")
        .scalar("k_ic", f64::NAN, "MPa*m^0.5")
        .build()
        .unwrap_err();
    assert_eq!(err.code(), codes::NON_FINITE_PARAMETER);

    let err = ParameterSnapshot::builder("broken")
        .series("trace", vec![0.0, f64::INFINITY], "A^2")
        .build()
        .unwrap_err();
    assert_eq!(err.code(), codes::NON_FINITE_PARAMETER);
}

#[test]
fn accessors_report_shape_and_absence() -> Result<(), VerityError> {
    let snapshot = ParameterSnapshot::builder("msd")
        .series("msd", vec![0.0, 1.0, 2.0], "A^2")
        .scalar("dt", 1.0, "ps")
        .scalar("dims", 3.0, "")
        .build()?;
    assert_eq!(snapshot.series("msd")?.len(), 3);
    assert_eq!(snapshot.count("dims")?, 3);
    assert_eq!(snapshot.scalar_or("missing", 4.0)?, 4.0);
    assert!(matches!(snapshot.scalar("msd"), Err(VerityError::Parameter(_))));
    assert_eq!(
        snapshot.scalar("temperature").unwrap_err().code(),
        codes::MISSING_PARAMETER
    );
    assert_eq!(
        snapshot.positive_or("temperature", -1.0).unwrap_err().code(),
        codes::INVALID_PARAMETER
    );
    Ok(())
}

#[test]
fn store_rejects_duplicate_names_and_replaces_immutably() -> Result<(), VerityError> {
    let mut store = ParameterStore::new();
    store.insert(interface("llzo", 7.0)?)?;
    let err = store.insert(interface("llzo", 8.0)?).unwrap_err();
    assert_eq!(err.code(), codes::DUPLICATE_SNAPSHOT);

    let replaced = store.with_replaced(interface("llzo", 8.0)?);
    assert_eq!(store.require("llzo")?.scalar("kt")?, 7.0);
    assert_eq!(replaced.require("llzo")?.scalar("kt")?, 8.0);
    assert_eq!(
        store.require("absent").unwrap_err().code(),
        codes::MISSING_SNAPSHOT
    );
    Ok(())
}
