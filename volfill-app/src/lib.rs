// SPDX-License-Identifier: GPL-3.0-only

//! Fill a volume to a target percentage of its capacity
//!
//! A single run resolves the cluster login, asks the management API for the
//! volume's size and usage, mounts the volume over NFS from a data
//! interface, writes one file of random bytes sized to the missing delta,
//! unmounts, and re-reads usage to confirm the result.

pub mod cli;
pub mod error;
pub mod report;
pub mod settings;
pub mod stages;
pub mod workflow;

pub use error::FillError;
pub use report::{FillOutcome, FillReport, FilledRun};
pub use settings::{FillSettings, SudoMode};
pub use workflow::{FillRequest, Workflow};
