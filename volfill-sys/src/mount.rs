// SPDX-License-Identifier: GPL-3.0-only

//! Command lines for the mount, fill-write and unmount utilities

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, TimeZone};

use crate::command::ExternalCommand;

/// Block size of the fill write (1 MiB)
pub const FILL_BLOCK_SIZE: u64 = 1024 * 1024;

/// Non-deterministic source so the array cannot compress or dedupe the filler
pub const RANDOM_SOURCE: &str = "/dev/urandom";

const SCRATCH_PREFIX: &str = "ontap_fill";
const FILL_FILE_PREFIX: &str = "fillfile";

/// How the remote volume is attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountOptions {
    pub fs_type: String,
    /// Passed verbatim to `mount -o`
    pub options: String,
    /// Bound on each unmount attempt before falling back
    pub unmount_timeout: Duration,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            fs_type: "nfs".to_string(),
            options: "vers=3,nolock".to_string(),
            unmount_timeout: Duration::from_secs(10),
        }
    }
}

/// Remote export and the local directory it is attached to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountTarget {
    pub remote_address: String,
    pub remote_path: String,
    pub scratch_path: PathBuf,
}

impl MountTarget {
    /// `address:/path` as given to `mount`
    pub fn source(&self) -> String {
        format!("{}:{}", self.remote_address, self.remote_path)
    }
}

/// Scratch mount point for this process, `{root}/ontap_fill_{pid}`
pub fn scratch_path(root: &Path, pid: u32) -> PathBuf {
    root.join(format!("{SCRATCH_PREFIX}_{pid}"))
}

/// Timestamp-qualified filler name, e.g. `fillfile_20260101_120000.dat`
///
/// Resolution is one second: two runs against the same volume within the
/// same second produce the same name.
pub fn fill_file_name<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("{FILL_FILE_PREFIX}_{}.dat", now.format("%Y%m%d_%H%M%S"))
}

/// Glob matching every filler file this tool writes
pub fn fill_file_glob() -> String {
    format!("{FILL_FILE_PREFIX}_*.dat")
}

pub(crate) fn mount_command(target: &MountTarget, options: &MountOptions) -> ExternalCommand {
    ExternalCommand::new("mount")
        .args(["-t", options.fs_type.as_str(), "-o", options.options.as_str()])
        .arg(target.source())
        .arg(target.scratch_path.display().to_string())
        .elevated()
}

pub(crate) fn fill_command(file: &Path, mib: u64) -> ExternalCommand {
    ExternalCommand::new("dd")
        .arg(format!("if={RANDOM_SOURCE}"))
        .arg(format!("of={}", file.display()))
        .arg(format!("bs={FILL_BLOCK_SIZE}"))
        .arg(format!("count={mib}"))
        .elevated()
}

pub(crate) fn unmount_command(scratch: &Path, force: bool, timeout: Duration) -> ExternalCommand {
    let command = ExternalCommand::new("umount");
    let command = if force { command.arg("-f") } else { command };
    command
        .arg(scratch.display().to_string())
        .elevated()
        .with_timeout(timeout)
}
