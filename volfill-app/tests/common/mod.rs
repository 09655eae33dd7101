// SPDX-License-Identifier: GPL-3.0-only

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::Path;

use volfill::FillSettings;
use volfill_ontap::{ApiError, ManagementApi, Result};
use volfill_types::{ExportPolicy, ExportRule, GIB, NetworkInterface, VolumeDescriptor};

pub const LIF_ADDRESS: &str = "10.0.0.20";
pub const VOLUME_UUID: &str = "4f5a1c2e-0000-11ef-9c3a-005056bb1234";

pub fn volume(total_gib: u64, used_bytes: u64, path: Option<&str>) -> VolumeDescriptor {
    VolumeDescriptor {
        identifier: VOLUME_UUID.to_string(),
        name: "vol1".to_string(),
        total_bytes: total_gib * GIB,
        used_bytes,
        filesystem_path: path.map(str::to_string),
        export_policy_name: Some("default".to_string()),
    }
}

/// Settings with no delays and a scratch root under `root`
pub fn settings(root: &Path) -> FillSettings {
    FillSettings {
        scratch_root: root.to_path_buf(),
        path_poll_interval_ms: 0,
        path_poll_attempts: 2,
        settle_delay_ms: 0,
        ..FillSettings::default()
    }
}

fn status(code: u16, message: &str) -> ApiError {
    ApiError::Status {
        status: code,
        url: "https://fake/api".to_string(),
        message: message.to_string(),
        code: None,
    }
}

/// Scripted management API
///
/// Volume lookups consume the scripted replies in order and keep returning
/// the last one.
pub struct FakeApi {
    volume_replies: RefCell<Vec<Option<VolumeDescriptor>>>,
    lookups: Cell<usize>,
    fail_lookups_after: Option<usize>,
    interfaces: Vec<NetworkInterface>,
    policy: Option<ExportPolicy>,
    fail_policy: bool,
    fail_patch: bool,
    interface_queries: Cell<usize>,
    /// Endpoint names in call order
    pub requests: RefCell<Vec<&'static str>>,
    pub patches: RefCell<Vec<(String, String)>>,
}

impl FakeApi {
    pub fn new(volume: Option<VolumeDescriptor>) -> Self {
        Self {
            volume_replies: RefCell::new(vec![volume]),
            lookups: Cell::new(0),
            fail_lookups_after: None,
            interfaces: vec![NetworkInterface {
                name: Some("lif_nfs_1".to_string()),
                address: LIF_ADDRESS.to_string(),
            }],
            policy: Some(ExportPolicy {
                name: "default".to_string(),
                rules: vec![ExportRule {
                    clients: vec!["0.0.0.0/0".to_string()],
                }],
            }),
            fail_policy: false,
            fail_patch: false,
            interface_queries: Cell::new(0),
            requests: RefCell::new(Vec::new()),
            patches: RefCell::new(Vec::new()),
        }
    }

    /// Reply for the next lookup after the ones already scripted
    pub fn then_volume(self, volume: VolumeDescriptor) -> Self {
        self.volume_replies.borrow_mut().push(Some(volume));
        self
    }

    pub fn fail_lookups_after(mut self, count: usize) -> Self {
        self.fail_lookups_after = Some(count);
        self
    }

    pub fn without_interfaces(mut self) -> Self {
        self.interfaces.clear();
        self
    }

    pub fn with_policy(mut self, policy: Option<ExportPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn failing_policy_lookup(mut self) -> Self {
        self.fail_policy = true;
        self
    }

    pub fn failing_patch(mut self) -> Self {
        self.fail_patch = true;
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }

    pub fn interface_queries(&self) -> usize {
        self.interface_queries.get()
    }
}

impl ManagementApi for FakeApi {
    fn find_volume(&self, _svm: &str, _volume: &str) -> Result<Option<VolumeDescriptor>> {
        self.requests.borrow_mut().push("volume");
        let count = self.lookups.get() + 1;
        self.lookups.set(count);
        if self.fail_lookups_after.is_some_and(|limit| count > limit) {
            return Err(status(503, "service unavailable"));
        }

        let mut replies = self.volume_replies.borrow_mut();
        if replies.len() > 1 {
            Ok(replies.remove(0))
        } else {
            Ok(replies.first().cloned().flatten())
        }
    }

    fn data_interfaces(&self, _svm: &str, _service: &str) -> Result<Vec<NetworkInterface>> {
        self.requests.borrow_mut().push("interfaces");
        self.interface_queries.set(self.interface_queries.get() + 1);
        Ok(self.interfaces.clone())
    }

    fn export_policy(&self, _svm: &str, _name: &str) -> Result<Option<ExportPolicy>> {
        self.requests.borrow_mut().push("policy");
        if self.fail_policy {
            return Err(status(500, "policy lookup failed"));
        }
        Ok(self.policy.clone())
    }

    fn set_junction_path(&self, volume_uuid: &str, path: &str) -> Result<()> {
        self.requests.borrow_mut().push("patch");
        if self.fail_patch {
            return Err(status(400, "junction path already in use"));
        }
        self.patches
            .borrow_mut()
            .push((volume_uuid.to_string(), path.to_string()));
        Ok(())
    }
}
