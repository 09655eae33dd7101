// SPDX-License-Identifier: GPL-3.0-only

//! Low-level system operations for filling a network volume
//!
//! This crate wraps the host utilities the filler shells out to:
//! - `mount -t nfs` to attach the remote volume at a scratch directory
//! - `dd` to write a sized file of random bytes
//! - `umount` (with a forced fallback) to detach it again
//!
//! Every invocation is described by an [`ExternalCommand`] and executed
//! through a [`CommandRunner`], so the whole sequence can be scripted in
//! tests with [`RecordingRunner`]. These operations usually need elevated
//! privileges; [`Elevation`] decides when `sudo` is prepended.

pub mod command;
pub mod error;
pub mod mount;
pub mod runner;
pub mod session;

pub use command::{CommandOutcome, Elevation, ExternalCommand};
pub use error::{Result, SysError};
pub use mount::{MountOptions, MountTarget, fill_file_glob, fill_file_name, scratch_path};
pub use runner::{CommandRunner, RecordingRunner, Scripted, SystemRunner};
pub use session::{FillArtifact, MountSession, MountState, UnmountOutcome};
