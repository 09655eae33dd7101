// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

use crate::common::percent_of;

/// Client match granting access to every IPv4 host
pub const ANY_HOST_MATCH: &str = "0.0.0.0/0";

/// A volume as reported by the management API
///
/// Fetched fresh at the start of a run and again for verification. Never
/// mutated locally; every change happens server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDescriptor {
    /// Server-assigned identifier (UUID)
    pub identifier: String,

    pub name: String,

    /// Provisioned size in bytes
    pub total_bytes: u64,

    /// Currently used bytes
    pub used_bytes: u64,

    /// Junction path under which the volume is exported, if any
    pub filesystem_path: Option<String>,

    /// Name of the export policy bound to the volume
    pub export_policy_name: Option<String>,
}

impl VolumeDescriptor {
    pub fn used_percent(&self) -> f64 {
        percent_of(self.used_bytes, self.total_bytes)
    }

    /// Junction path, treating an empty string as unset
    pub fn junction_path(&self) -> Option<&str> {
        self.filesystem_path
            .as_deref()
            .filter(|path| !path.trim().is_empty())
    }

    /// Default junction path assigned when the volume has none
    pub fn default_junction_path(&self) -> String {
        format!("/{}", self.name)
    }

    /// Bound export policy, or `fallback` when the API reports none
    pub fn export_policy_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.export_policy_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(fallback)
    }
}

/// A data-serving network interface (data LIF)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub name: Option<String>,
    pub address: String,
}

/// One rule of an export policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRule {
    /// Client match expressions (CIDR, host names, netgroups)
    pub clients: Vec<String>,
}

impl ExportRule {
    pub fn allows_any_host(&self) -> bool {
        self.clients.iter().any(|client| client == ANY_HOST_MATCH)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPolicy {
    pub name: String,
    pub rules: Vec<ExportRule>,
}

impl ExportPolicy {
    /// Heuristic only: host-specific allow-lists are not evaluated
    pub fn allows_any_host(&self) -> bool {
        self.rules.iter().any(ExportRule::allows_any_host)
    }
}
