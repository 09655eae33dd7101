// SPDX-License-Identifier: GPL-3.0-only

//! Management API client
//!
//! Only the handful of endpoints the filler needs are covered: volume lookup
//! by name, data interface discovery, export policy rules, and setting a
//! volume's junction path. [`ManagementApi`] is the seam the workflow is
//! written against; [`OntapClient`] is the HTTP implementation.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
mod wire;

pub use api::ManagementApi;
pub use client::OntapClient;
pub use config::ClientConfig;
pub use error::{ApiError, Result};
