mod proptest;

/// Route engine logs to the test harness; set `RUST_LOG=automata=trace` to see traces.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
