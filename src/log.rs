// src/log.rs
use std::sync::OnceLock;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

/// Install the global tracing subscriber.
/// `RUST_LOG` wins when set; otherwise everything at `info` and above.
/// Calling this again is a no-op.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .try_init();
    });
}

/// `hh:mm:ss.mmm`
pub fn fmt_elapsed(d: Duration) -> String {
    let total_ms = d.as_millis() as u64;
    let h = total_ms / 3_600_000;
    let m = (total_ms % 3_600_000) / 60_000;
    let s = (total_ms % 60_000) / 1_000;
    let ms = total_ms % 1_000;
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

/// Info-level logging
#[macro_export]
macro_rules! logf {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "dex_board", $($arg)*)
    };
}

/// Debug-level logging
#[macro_export]
macro_rules! logd {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "dex_board", $($arg)*)
    };
}

/// Warn-level logging
#[macro_export]
macro_rules! logw {
    ($($arg:tt)*) => {
        ::tracing::warn!(target: "dex_board", $($arg)*)
    };
}

/// Error-level logging
#[macro_export]
macro_rules! loge {
    ($($arg:tt)*) => {
        ::tracing::error!(target: "dex_board", $($arg)*)
    };
}
