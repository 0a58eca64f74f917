use std::sync::Once;

use tracing_subscriber::EnvFilter;
use wiremock::MockServer;

static TRACING: Once = Once::new();

/// Installs a test-writer subscriber once; `RUST_LOG=courier_request=debug`
/// shows the executor's events.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub async fn server() -> MockServer {
    init_tracing();
    MockServer::start().await
}
