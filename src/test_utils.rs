//! Test utilities and global setup
//!
//! Test logging configuration plus fixtures shared by the tool tests.

use std::sync::Arc;
use tempfile::TempDir;

use crate::logging::FileOutputChannel;

/// Test logging utilities
#[cfg(feature = "test-logging")]
pub mod logging {
    use std::sync::Once;
    use tracing_subscriber::{EnvFilter, fmt};

    static INIT: Once = Once::new();

    /// Initialize test logging globally - safe to call multiple times
    ///
    /// Respects `RUST_LOG`, defaulting to debug for this crate. Output goes
    /// through the test writer so it only shows for failing tests.
    ///
    /// ```bash
    /// RUST_LOG=cpp_assist_bridge::hover=trace cargo test --features test-logging
    /// ```
    pub fn init() {
        INIT.call_once(|| {
            let env_filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("debug,tokio=info"));

            fmt()
                .with_env_filter(env_filter)
                .with_test_writer()
                .with_target(true)
                .with_thread_ids(true)
                .compact()
                .try_init()
                .ok(); // Another test may have installed a subscriber already
        });
    }
}

/// Install the test subscriber before any test in the invoking module runs
#[cfg(feature = "test-logging")]
#[macro_export]
macro_rules! setup_test_logging {
    () => {
        #[ctor::ctor]
        fn init_test_logging() {
            $crate::test_utils::logging::init();
        }
    };
}

/// Output channel writing into a fresh temporary directory.
///
/// Keep the returned `TempDir` alive for as long as the channel is used.
pub fn temp_output_channel() -> (TempDir, Arc<FileOutputChannel>) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let channel = FileOutputChannel::open(dir.path().join("output.log"))
        .expect("Failed to open output channel");
    (dir, Arc::new(channel))
}

/// Everything written to `channel` so far
pub fn output_contents(channel: &FileOutputChannel) -> String {
    std::fs::read_to_string(channel.path()).expect("Failed to read output channel")
}
