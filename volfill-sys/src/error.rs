// SPDX-License-Identifier: GPL-3.0-only

use std::time::Duration;

use thiserror::Error;

/// Error types for system-level operations
#[derive(Error, Debug)]
pub enum SysError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("required binary not found in PATH: {0}")]
    MissingBinary(String),

    #[error("failed to execute {command}: {reason}")]
    Spawn { command: String, reason: String },

    #[error("command failed: {command}; stderr: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("command timed out after {}s: {command}", .timeout.as_secs())]
    TimedOut { command: String, timeout: Duration },
}

/// Result type alias for system operations
pub type Result<T> = std::result::Result<T, SysError>;
