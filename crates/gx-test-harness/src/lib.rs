//! Test support for the Galaxy workflow suites
//!
//! Nothing here talks HTTP directly: everything goes through `GalaxyApi`, so
//! the same helpers drive the in-memory mock and a live server.

pub mod config;
pub mod error;
pub mod fixtures;
pub mod polling;

pub use config::{Credentials, TestConfig};
pub use error::{HarnessError, HarnessResult};
pub use fixtures::{Fixtures, UPLOAD_TOOL};
pub use polling::{wait_for_invocation, PollConfig};

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test-friendly tracing subscriber once per process.
///
/// Honours `RUST_LOG`; defaults to `warn`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
