// SPDX-License-Identifier: GPL-3.0-only

//! Junction path provisioning
//!
//! A volume without a junction path is not reachable over NFS. One is
//! assigned (`/{volume name}`) and re-read until the array reports it.

use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};
use volfill_ontap::ManagementApi;
use volfill_types::VolumeDescriptor;

use crate::error::FillError;

/// The path the volume will be mounted from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JunctionPath {
    pub path: String,
    /// Assigned during this run rather than already present
    pub assigned: bool,
}

/// How a freshly assigned path is confirmed
#[derive(Debug, Clone, Copy)]
pub struct PathPolling {
    pub interval: Duration,
    pub attempts: u32,
}

/// Return the volume's junction path, assigning the default one if unset
///
/// Under `dry_run` the assignment is only logged. A path that never shows
/// up while polling is a warning, the mount step decides whether it works.
pub fn ensure<A: ManagementApi>(
    api: &A,
    svm: &str,
    volume: &VolumeDescriptor,
    polling: PathPolling,
    dry_run: bool,
) -> Result<JunctionPath, FillError> {
    if let Some(path) = volume.junction_path() {
        debug!("Volume {} is mounted at {}", volume.name, path);
        return Ok(JunctionPath {
            path: path.to_string(),
            assigned: false,
        });
    }

    let path = volume.default_junction_path();
    if dry_run {
        info!(
            "[dry-run] Volume {} has no junction path, would set it to {}",
            volume.name, path
        );
        return Ok(JunctionPath {
            path,
            assigned: true,
        });
    }

    info!("Volume {} has no junction path, setting it to {}", volume.name, path);
    api.set_junction_path(&volume.identifier, &path)
        .map_err(|source| FillError::PathAssignmentFailed {
            path: path.clone(),
            source,
        })?;

    if !wait_for_path(api, svm, &volume.name, &path, polling) {
        warn!(
            "Junction path {} not yet reported after {} check(s), continuing",
            path, polling.attempts
        );
    }

    Ok(JunctionPath {
        path,
        assigned: true,
    })
}

fn wait_for_path<A: ManagementApi>(
    api: &A,
    svm: &str,
    volume: &str,
    expected: &str,
    polling: PathPolling,
) -> bool {
    for attempt in 1..=polling.attempts {
        thread::sleep(polling.interval);
        match api.find_volume(svm, volume) {
            Ok(Some(refreshed)) if refreshed.junction_path() == Some(expected) => {
                debug!("Junction path {} visible after {} check(s)", expected, attempt);
                return true;
            }
            Ok(_) => debug!("Junction path not visible yet ({}/{})", attempt, polling.attempts),
            Err(error) => debug!("Junction path check {} failed: {}", attempt, error),
        }
    }
    false
}
