//! Tracing setup for test binaries.
//!
//! Controlled by `FERRY_TEST_LOG`:
//! - unset or empty → no subscriber (events are dropped)
//! - `"stderr"` → JSON events to stderr
//! - `"pretty"` → human-readable events, captured per test by the harness
//!
//! The level filter comes from `RUST_LOG`, defaulting to `info`.
//! [`init`] may be called from every test; only the first call installs a
//! subscriber.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// Environment variable selecting the log output.
pub const LOG_ENV: &str = "FERRY_TEST_LOG";

/// Where test logs go.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogOutput {
    /// No subscriber.
    Off,
    /// JSON lines on stderr.
    Json,
    /// Human-readable lines through the test harness's output capture.
    Pretty,
}

impl LogOutput {
    /// Interpret a `FERRY_TEST_LOG` value. Unknown values mean [`Self::Off`].
    #[must_use]
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("stderr" | "json") => Self::Json,
            Some("pretty") => Self::Pretty,
            _ => Self::Off,
        }
    }
}

/// Install a subscriber according to `FERRY_TEST_LOG`.
///
/// Returns the output that is in effect for this call. A subscriber that
/// was already installed (by an earlier call or by the test harness) is
/// left alone.
pub fn init() -> LogOutput {
    let output = LogOutput::from_env_value(std::env::var(LOG_ENV).ok().as_deref());
    init_with(output);
    output
}

/// Install a subscriber for `output`, ignoring `FERRY_TEST_LOG`.
pub fn init_with(output: LogOutput) {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // `try_init` fails only when a global subscriber already exists.
    let _ = match output {
        LogOutput::Off => return,
        LogOutput::Json => tracing_subscriber::registry()
            .with(filter())
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init(),
        LogOutput::Pretty => tracing_subscriber::registry()
            .with(filter())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true),
            )
            .try_init(),
    };
}
