// SPDX-License-Identifier: GPL-3.0-only

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("unauthorized (HTTP {status}) for {url}: check username and password")]
    Unauthorized { status: u16, url: String },

    #[error("API error (HTTP {status}) for {url}: {message}{}", .code.as_deref().map(|c| format!(" (code: {c})")).unwrap_or_default())]
    Status {
        status: u16,
        url: String,
        message: String,
        code: Option<String>,
    },

    #[error("failed to parse response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ApiError>;
