//! Tracing setup for embedding applications.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a fmt subscriber honoring `RUST_LOG`, defaulting to info with
/// debug for the civica crates. Safe to call more than once; later calls
/// are no-ops.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("civica_session=debug,civica_client=debug,info"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
