// SPDX-License-Identifier: GPL-3.0-only

//! Static cluster credential store
//!
//! The store maps a cluster name to its management address and login. It is
//! read once per run and never written back. Two JSON shapes are accepted:
//!
//! ```json
//! { "lab-1": { "cluster_ip": "10.0.0.5", "username": "admin", "password": "..." } }
//! ```
//!
//! ```json
//! [ { "name": "lab-1", "cluster_ip": "10.0.0.5", "username": "admin", "password": "..." } ]
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Default location of the credential store, relative to the working directory
pub const DEFAULT_CREDENTIALS_PATH: &str = "test/clusters.json";

/// Environment variable that may carry the store inline
pub const CREDENTIALS_ENV_VAR: &str = "ONTAP_CLUSTERS";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential store not found: {}", .path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read credential store {}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },
    #[error("invalid credential store JSON: {0}")]
    Parse(String),
    #[error("invalid credential entry: {0}")]
    Invalid(String),
    #[error("cluster '{name}' not found (known clusters: {})", .known.join(", "))]
    UnknownCluster { name: String, known: Vec<String> },
}

pub type Result<T> = std::result::Result<T, CredentialError>;

/// Login details for one storage cluster
#[derive(Clone, PartialEq, Eq)]
pub struct ClusterCredential {
    pub name: String,
    pub management_address: String,
    pub username: String,
    pub password: String,
    pub description: Option<String>,
    /// Validate the management endpoint's TLS certificate. Off unless the
    /// store says otherwise.
    pub verify_ssl: bool,
}

impl fmt::Debug for ClusterCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterCredential")
            .field("name", &self.name)
            .field("management_address", &self.management_address)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("description", &self.description)
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    cluster_ip: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    verify_ssl: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawStore {
    Array(Vec<RawEntry>),
    Object(BTreeMap<String, RawEntry>),
}

/// Immutable name -> credential lookup table
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    clusters: BTreeMap<String, ClusterCredential>,
}

impl CredentialStore {
    /// Load the store from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CredentialError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let raw = fs::read_to_string(path).map_err(|error| CredentialError::Unreadable {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;

        Self::from_json(&raw)
    }

    /// Parse the store from JSON text in either accepted shape
    pub fn from_json(raw: &str) -> Result<Self> {
        let parsed: RawStore =
            serde_json::from_str(raw).map_err(|error| CredentialError::Parse(error.to_string()))?;

        let entries: Vec<RawEntry> = match parsed {
            RawStore::Array(entries) => entries,
            RawStore::Object(map) => map
                .into_iter()
                .map(|(name, mut entry)| {
                    entry.name = name;
                    entry
                })
                .collect(),
        };

        let mut clusters = BTreeMap::new();
        for (index, entry) in entries.into_iter().enumerate() {
            let credential = validate(index, entry)?;
            clusters.insert(credential.name.clone(), credential);
        }

        Ok(Self { clusters })
    }

    /// Cluster names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.clusters.keys().cloned().collect()
    }

    /// Select one cluster by name
    pub fn resolve(&self, name: &str) -> Result<&ClusterCredential> {
        self.clusters
            .get(name)
            .ok_or_else(|| CredentialError::UnknownCluster {
                name: name.to_string(),
                known: self.names(),
            })
    }
}

fn validate(index: usize, entry: RawEntry) -> Result<ClusterCredential> {
    if entry.name.trim().is_empty() {
        return Err(CredentialError::Invalid(format!(
            "cluster {index}: name is required"
        )));
    }

    let label = entry.name.clone();
    for (field, value) in [
        ("cluster_ip", &entry.cluster_ip),
        ("username", &entry.username),
        ("password", &entry.password),
    ] {
        if value.trim().is_empty() {
            return Err(CredentialError::Invalid(format!(
                "cluster {label}: {field} is required"
            )));
        }
    }

    Ok(ClusterCredential {
        name: entry.name,
        management_address: entry.cluster_ip,
        username: entry.username,
        password: entry.password,
        description: entry.description,
        verify_ssl: entry.verify_ssl,
    })
}
