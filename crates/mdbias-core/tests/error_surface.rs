use mdbias_core::errors::{BiasError, ErrorInfo};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("particles", "4")
        .with_context("reason", "example")
}

#[test]
fn config_error_surface() {
    let err = BiasError::Config(sample_info("F001", "mass count mismatch"));
    assert_eq!(err.info().code, "F001");
    assert!(err.info().context.contains_key("particles"));
}

#[test]
fn version_error_surface() {
    let err = BiasError::Version(sample_info("V001", "too old"));
    assert_eq!(err.info().code, "V001");
    assert!(err.info().context.contains_key("reason"));
}

#[test]
fn command_shorthand_records_key() {
    let err = BiasError::command("setStep", "rejected");
    assert_eq!(err.info().code, "mdbias.command_failed");
    assert_eq!(err.info().context.get("command").map(String::as_str), Some("setStep"));
}

#[test]
fn display_includes_context_and_hint() {
    let err = BiasError::Library(
        ErrorInfo::new("mdbias_host.symbol", "missing symbol")
            .with_context("symbol", "plumed_cmd")
            .with_context("path", "/opt/plumed/lib/libplumedKernel.so")
            .with_hint("rebuild the kernel"),
    );
    assert_eq!(
        err.to_string(),
        "library error: [mdbias_host.symbol] missing symbol \
         (path=/opt/plumed/lib/libplumedKernel.so, symbol=plumed_cmd); hint: rebuild the kernel"
    );
    let bare = BiasError::Version(ErrorInfo::new("mdbias_host.api_version", "too old"));
    assert_eq!(bare.to_string(), "version error: [mdbias_host.api_version] too old");
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = BiasError::Serde(ErrorInfo::new("S001", "bad toml"));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "Serde");
    assert_eq!(json["detail"]["code"], "S001");
    let back: BiasError = serde_json::from_value(json).unwrap();
    assert_eq!(back, err);
}
