// SPDX-License-Identifier: GPL-3.0-only

//! JSON records as returned by the REST API

use serde::Deserialize;
use volfill_types::{ExportPolicy, ExportRule, NetworkInterface, VolumeDescriptor};

/// Collection envelope: `{"records": [...], "num_records": n}`
#[derive(Debug, Deserialize)]
pub(crate) struct Records<T> {
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
    #[serde(default)]
    pub num_records: Option<u64>,
}

impl<T> Records<T> {
    pub fn into_records(self) -> Vec<T> {
        if self.num_records == Some(0) {
            return Vec::new();
        }
        self.records
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Named {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VolumeRecord {
    pub uuid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub space: Option<SpaceRecord>,
    #[serde(default)]
    pub nas: Option<NasRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SpaceRecord {
    pub size: Option<u64>,
    #[serde(default)]
    pub used: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NasRecord {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub export_policy: Option<Named>,
}

impl VolumeRecord {
    /// `requested_name` fills in the name when the record omits it
    pub fn into_descriptor(self, requested_name: &str) -> Result<VolumeDescriptor, String> {
        let space = self
            .space
            .ok_or_else(|| format!("volume {} has no space information", self.uuid))?;
        let total_bytes = space
            .size
            .ok_or_else(|| format!("volume {} has no space.size", self.uuid))?;
        let nas = self.nas.unwrap_or_default();

        Ok(VolumeDescriptor {
            identifier: self.uuid,
            name: self.name.unwrap_or_else(|| requested_name.to_string()),
            total_bytes,
            used_bytes: space.used.unwrap_or(0),
            filesystem_path: nas.path,
            export_policy_name: nas.export_policy.and_then(|policy| policy.name),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct InterfaceRecord {
    #[serde(default)]
    pub name: Option<String>,
    pub ip: Option<IpRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IpRecord {
    pub address: Option<String>,
}

impl InterfaceRecord {
    pub fn into_interface(self) -> Option<NetworkInterface> {
        let address = self.ip?.address.filter(|address| !address.is_empty())?;
        Some(NetworkInterface {
            name: self.name,
            address,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PolicyRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rules: Vec<RuleRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RuleRecord {
    #[serde(default)]
    pub clients: Vec<ClientMatch>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClientMatch {
    #[serde(rename = "match", default)]
    pub matcher: Option<String>,
}

impl PolicyRecord {
    pub fn into_policy(self, requested_name: &str) -> ExportPolicy {
        ExportPolicy {
            name: self.name.unwrap_or_else(|| requested_name.to_string()),
            rules: self
                .rules
                .into_iter()
                .map(|rule| ExportRule {
                    clients: rule
                        .clients
                        .into_iter()
                        .filter_map(|client| client.matcher)
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Error body: `{"error": {"message": "...", "code": "...", "target": "..."}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
}

/// Message and code from an error response, falling back to the raw body
pub(crate) fn parse_error_body(body: &str) -> (String, Option<String>) {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => {
            let mut message = error.message.unwrap_or_else(|| "unknown error".to_string());
            if let Some(target) = error.target {
                message = format!("{message} (target: {target})");
            }
            (message, error.code)
        }
        Err(_) => (body.trim().to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_volume_record() {
        let body = r#"{
            "records": [{
                "uuid": "4f5a1c2e-0000-11ef-9c3a-005056bb1234",
                "name": "full_vol_1",
                "space": { "size": 107374182400, "used": 53687091200 },
                "nas": { "path": "/full_vol_1", "export_policy": { "name": "default" } }
            }],
            "num_records": 1
        }"#;

        let records: Records<VolumeRecord> = serde_json::from_str(body).unwrap();
        let volume = records
            .into_records()
            .remove(0)
            .into_descriptor("full_vol_1")
            .unwrap();

        assert_eq!(volume.identifier, "4f5a1c2e-0000-11ef-9c3a-005056bb1234");
        assert_eq!(volume.total_bytes, 107_374_182_400);
        assert_eq!(volume.used_bytes, 53_687_091_200);
        assert_eq!(volume.filesystem_path.as_deref(), Some("/full_vol_1"));
        assert_eq!(volume.export_policy_name.as_deref(), Some("default"));
    }

    #[test]
    fn missing_used_defaults_to_zero_and_missing_size_is_rejected() {
        let record: VolumeRecord =
            serde_json::from_str(r#"{ "uuid": "u1", "space": { "size": 100 } }"#).unwrap();
        let volume = record.into_descriptor("v").unwrap();
        assert_eq!(volume.used_bytes, 0);
        assert_eq!(volume.name, "v");
        assert_eq!(volume.filesystem_path, None);

        let record: VolumeRecord = serde_json::from_str(r#"{ "uuid": "u2" }"#).unwrap();
        assert!(record.into_descriptor("v").is_err());
    }

    #[test]
    fn empty_collection_yields_no_records() {
        let records: Records<VolumeRecord> =
            serde_json::from_str(r#"{ "records": [], "num_records": 0 }"#).unwrap();
        assert!(records.into_records().is_empty());
    }

    #[test]
    fn interfaces_without_address_are_skipped() {
        let body = r#"{ "records": [
            { "name": "lif0", "ip": { "address": "" } },
            { "name": "lif1", "ip": { "address": "10.0.0.20" } }
        ] }"#;
        let records: Records<InterfaceRecord> = serde_json::from_str(body).unwrap();
        let interfaces: Vec<_> = records
            .into_records()
            .into_iter()
            .filter_map(InterfaceRecord::into_interface)
            .collect();
        assert_eq!(interfaces.len(), 1);
        assert_eq!(interfaces[0].address, "10.0.0.20");
    }

    #[test]
    fn decodes_policy_client_matches() {
        let body = r#"{ "name": "default", "rules": [
            { "clients": [{ "match": "0.0.0.0/0" }], "ro_rule": ["any"] },
            { "clients": [{ "match": "host1" }, { "match": "host2" }] }
        ] }"#;
        let policy = serde_json::from_str::<PolicyRecord>(body)
            .unwrap()
            .into_policy("default");
        assert!(policy.allows_any_host());
        assert_eq!(policy.rules[1].clients, vec!["host1", "host2"]);
    }

    #[test]
    fn parses_structured_error_body() {
        let body = r#"{ "error": { "message": "entry doesn't exist", "code": "4", "target": "uuid" } }"#;
        let (message, code) = parse_error_body(body);
        assert_eq!(message, "entry doesn't exist (target: uuid)");
        assert_eq!(code.as_deref(), Some("4"));

        let (message, code) = parse_error_body("  Bad Gateway\n");
        assert_eq!(message, "Bad Gateway");
        assert_eq!(code, None);
    }
}
