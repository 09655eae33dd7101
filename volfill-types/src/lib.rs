// SPDX-License-Identifier: GPL-3.0-only

//! Canonical data models for the volume filler
//!
//! These types are shared by every crate in the workspace:
//!
//! - **volfill-ontap**: decodes management API records into [`VolumeDescriptor`],
//!   [`NetworkInterface`] and [`ExportPolicy`]
//! - **volfill-sys**: sizes the fill write from a [`FillPlan`]
//! - **volfill**: resolves a [`ClusterCredential`] and drives the run
//!
//! Nothing here performs network or process I/O. The only file access is
//! reading the credential store.

pub mod common;
pub mod credentials;
pub mod plan;
pub mod volume;

pub use common::*;
pub use credentials::*;
pub use plan::*;
pub use volume::*;
