use envelope::telemetry::init_telemetry;

#[test]
fn second_initialisation_is_an_error() {
    init_telemetry("debug").unwrap();
    tracing::info!(version = "v3", "telemetry initialised");
    assert!(init_telemetry("info").is_err());
}
