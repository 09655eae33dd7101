// SPDX-License-Identifier: GPL-3.0-only

//! Mount session lifecycle
//!
//! `Unmounted -> Mounted -> Filled -> Released`. A failure while mounted or
//! filled always goes through [`MountSession::release`] before it surfaces.
//! The scratch directory is removed only once the unmount succeeded; a
//! directory that may still be an active mount point is left in place.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::mount::{
    MountOptions, MountTarget, fill_command, fill_file_name, mount_command, unmount_command,
};
use crate::runner::CommandRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    Mounted,
    Filled,
    /// Unmounted and scratch directory removed
    Released,
    /// Neither graceful nor forced unmount succeeded
    Leaked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmountOutcome {
    Graceful,
    Forced,
    /// Mount may still be active; manual cleanup required
    Leaked,
}

impl UnmountOutcome {
    pub fn is_clean(self) -> bool {
        !matches!(self, UnmountOutcome::Leaked)
    }
}

/// The filler file written under the mount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillArtifact {
    pub path: PathBuf,
    pub mib_written: u64,
    /// Last line of the write utility's summary, if it printed one
    pub stats: Option<String>,
}

#[must_use = "a mounted session must be released"]
#[derive(Debug)]
pub struct MountSession {
    target: MountTarget,
    options: MountOptions,
    state: MountState,
    /// Runner only renders commands; the scratch directory is never created
    dry_run: bool,
}

impl MountSession {
    /// Create the scratch directory and mount the remote export on it
    ///
    /// On failure the scratch directory is removed again and nothing else
    /// is attempted. A dry-run runner leaves the filesystem untouched.
    pub fn mount<R: CommandRunner>(
        runner: &mut R,
        target: MountTarget,
        options: MountOptions,
    ) -> Result<Self> {
        let dry_run = runner.is_dry_run();
        if !dry_run {
            fs::create_dir_all(&target.scratch_path)?;
        }
        info!(
            "Mounting {} -> {}",
            target.source(),
            target.scratch_path.display()
        );

        if let Err(error) = runner.run(&mount_command(&target, &options)) {
            if !dry_run {
                remove_scratch(&target.scratch_path);
            }
            return Err(error);
        }

        Ok(Self {
            target,
            options,
            state: MountState::Mounted,
            dry_run,
        })
    }

    pub fn state(&self) -> MountState {
        self.state
    }

    pub fn target(&self) -> &MountTarget {
        &self.target
    }

    /// Write `mib` MiB of random bytes to a timestamp-named file
    ///
    /// On failure the session is released (errors during release are only
    /// logged) and the write error is returned.
    pub fn fill<R, Tz>(&mut self, runner: &mut R, mib: u64, now: &DateTime<Tz>) -> Result<FillArtifact>
    where
        R: CommandRunner,
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let path = self.target.scratch_path.join(fill_file_name(now));
        info!("Writing {} MiB of random data to {}", mib, path.display());

        match runner.run(&fill_command(&path, mib)) {
            Ok(outcome) => {
                self.state = MountState::Filled;
                let stats = outcome
                    .stderr
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .last()
                    .map(str::to_string);
                Ok(FillArtifact {
                    path,
                    mib_written: mib,
                    stats,
                })
            }
            Err(error) => {
                warn!("Fill write failed, unmounting before aborting: {}", error);
                self.release(runner);
                Err(error)
            }
        }
    }

    /// Unmount, falling back once to a forced unmount
    ///
    /// Never fails: an unmount that does not succeed is reported as
    /// [`UnmountOutcome::Leaked`] together with manual cleanup instructions.
    pub fn release<R: CommandRunner>(&mut self, runner: &mut R) -> UnmountOutcome {
        if matches!(self.state, MountState::Released | MountState::Leaked) {
            debug!("Session already released");
            return if self.state == MountState::Released {
                UnmountOutcome::Graceful
            } else {
                UnmountOutcome::Leaked
            };
        }

        let scratch = self.target.scratch_path.clone();
        let timeout = self.options.unmount_timeout;

        let outcome = match runner.run(&unmount_command(&scratch, false, timeout)) {
            Ok(_) => UnmountOutcome::Graceful,
            Err(error) => {
                warn!("Normal unmount failed ({}), trying force unmount", error);
                match runner.run(&unmount_command(&scratch, true, timeout)) {
                    Ok(_) => UnmountOutcome::Forced,
                    Err(error) => {
                        warn!(
                            "Failed to unmount cleanly, mount may still be active: {}",
                            error
                        );
                        warn!("Manual cleanup: {}", self.manual_cleanup_hint());
                        UnmountOutcome::Leaked
                    }
                }
            }
        };

        if outcome.is_clean() {
            if !self.dry_run {
                remove_scratch(&scratch);
            }
            self.state = MountState::Released;
        } else {
            self.state = MountState::Leaked;
        }
        outcome
    }

    pub fn manual_cleanup_hint(&self) -> String {
        let scratch = self.target.scratch_path.display();
        format!("sudo umount -f {scratch} && rmdir {scratch}")
    }
}

fn remove_scratch(path: &Path) {
    if let Err(error) = fs::remove_dir(path) {
        warn!(
            "Failed to remove scratch directory {}: {}",
            path.display(),
            error
        );
    }
}
