// SPDX-License-Identifier: GPL-3.0-only

use tracing::info;
use volfill_ontap::ManagementApi;
use volfill_types::{VolumeDescriptor, bytes_to_pretty};

use crate::error::FillError;

/// Current size and usage of `volume`; absence is fatal
pub fn inspect<A: ManagementApi>(
    api: &A,
    svm: &str,
    volume: &str,
) -> Result<VolumeDescriptor, FillError> {
    let descriptor = api
        .find_volume(svm, volume)?
        .ok_or_else(|| FillError::VolumeNotFound {
            volume: volume.to_string(),
            svm: svm.to_string(),
        })?;

    info!(
        "Volume {} ({}): {} used of {} ({:.2}%)",
        descriptor.name,
        descriptor.identifier,
        bytes_to_pretty(descriptor.used_bytes, false),
        bytes_to_pretty(descriptor.total_bytes, false),
        descriptor.used_percent()
    );
    Ok(descriptor)
}
