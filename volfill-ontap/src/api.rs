// SPDX-License-Identifier: GPL-3.0-only

use volfill_types::{ExportPolicy, NetworkInterface, VolumeDescriptor};

use crate::error::Result;

/// The management operations the filler relies on
pub trait ManagementApi {
    /// Look up a volume by name within a storage VM; `None` when absent
    fn find_volume(&self, svm: &str, volume: &str) -> Result<Option<VolumeDescriptor>>;

    /// IP interfaces of `svm` offering `service` (e.g. `data_nfs`)
    fn data_interfaces(&self, svm: &str, service: &str) -> Result<Vec<NetworkInterface>>;

    /// Export policy and its rules; `None` when no policy has that name
    fn export_policy(&self, svm: &str, name: &str) -> Result<Option<ExportPolicy>>;

    /// Set the volume's junction path
    fn set_junction_path(&self, volume_uuid: &str, path: &str) -> Result<()>;
}

impl<T: ManagementApi + ?Sized> ManagementApi for &T {
    fn find_volume(&self, svm: &str, volume: &str) -> Result<Option<VolumeDescriptor>> {
        (**self).find_volume(svm, volume)
    }

    fn data_interfaces(&self, svm: &str, service: &str) -> Result<Vec<NetworkInterface>> {
        (**self).data_interfaces(svm, service)
    }

    fn export_policy(&self, svm: &str, name: &str) -> Result<Option<ExportPolicy>> {
        (**self).export_policy(svm, name)
    }

    fn set_junction_path(&self, volume_uuid: &str, path: &str) -> Result<()> {
        (**self).set_junction_path(volume_uuid, path)
    }
}
