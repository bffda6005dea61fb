// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Structured logging for the drivefs workspace
//!
//! Usage:
//! - Set DRIVEFS_LOG=off (default) - no logs
//! - Set DRIVEFS_LOG=error|warn - problems only
//! - Set DRIVEFS_LOG=info - mutations (writes, deletes, moves)
//! - Set DRIVEFS_LOG=debug - resolution, cache and listing detail
//!
//! Library code logs through the short macros with emit's property syntax:
//!
//! ```ignore
//! use diagnostics::*;
//! debug!("cache hit for {path}", path: path.as_str());
//! ```

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable selecting the minimum level
pub const LOG_ENV: &str = "DRIVEFS_LOG";

static INIT: Once = Once::new();

/// Minimum level for a `DRIVEFS_LOG` value; `None` disables logging
fn parse_level(value: &str) -> Option<emit::Level> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" | "" => None,
        "error" => Some(emit::Level::Error),
        "warn" => Some(emit::Level::Warn),
        "debug" => Some(emit::Level::Debug),
        // "info" and anything unrecognized
        _ => Some(emit::Level::Info),
    }
}

/// Initialize diagnostics based on the DRIVEFS_LOG environment variable
///
/// Call once at application startup; later calls are ignored.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let value = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());
        let Some(level) = parse_level(&value) else {
            return;
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        if !matches!(value.trim().to_ascii_lowercase().as_str(), "info" | "error" | "warn" | "debug") {
            emit::warn!("unknown {env} value {value}, using info", env: LOG_ENV, value: value.as_str());
        }

        // The runtime must outlive the process
        std::mem::forget(rt);
    });
}

/// Log mutations and other operations users want to see in normal usage.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log resolution steps, cache activity and other internal detail.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log recoverable surprises, such as duplicate names or shared objects
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures that prevent an operation from completing
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

/// Re-export the init function for convenience
pub use init_diagnostics as init;
