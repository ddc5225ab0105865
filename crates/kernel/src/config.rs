//! Compile-time configuration and build metadata.

use crate::klib::printk::LogLevel;

/// Kernel version, as reported by the shell `version` command.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short git revision the kernel was built from, when available.
pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

/// Unix timestamp of the build, stamped by build.rs.
pub const BUILD_TIMESTAMP: Option<&str> = option_env!("BUILD_TIMESTAMP");

/// Target triple the image was built for.
pub const BUILD_TARGET: Option<&str> = option_env!("BUILD_TARGET");

/// Messages below this level are formatted but not emitted on serial.
pub const LOG_THRESHOLD: LogLevel = LogLevel::Info;

/// Shell line buffer capacity, including the terminating byte.
pub const SHELL_LINE_CAP: usize = 256;

/// Maximum argv entries produced by shell tokenization.
pub const SHELL_MAX_ARGS: usize = 16;

/// Keyboard ring capacity (x86_64 PS/2 path).
pub const KEY_RING_CAP: usize = 256;

/// Entries retained by the in-memory boot log (for `dmesg`).
pub const LOG_RING_CAP: usize = 64;

/// Bytes retained per boot-log entry.
pub const LOG_LINE_CAP: usize = 128;
