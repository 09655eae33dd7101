// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use tracing::{debug, info};
use volfill_types::{
    CREDENTIALS_ENV_VAR, ClusterCredential, CredentialError, CredentialStore,
    DEFAULT_CREDENTIALS_PATH,
};

use crate::error::FillError;

/// Where the cluster logins come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    File(PathBuf),
    /// JSON document taken from the environment
    Inline(String),
}

impl CredentialSource {
    /// An explicit path wins, then the environment, then the default file
    pub fn from_cli(explicit: Option<PathBuf>) -> Self {
        Self::select(explicit, std::env::var(CREDENTIALS_ENV_VAR).ok())
    }

    pub fn select(explicit: Option<PathBuf>, env_value: Option<String>) -> Self {
        if let Some(path) = explicit {
            return CredentialSource::File(path);
        }
        match env_value {
            Some(raw) if !raw.trim().is_empty() => CredentialSource::Inline(raw),
            _ => CredentialSource::File(PathBuf::from(DEFAULT_CREDENTIALS_PATH)),
        }
    }

    pub fn load(&self) -> Result<CredentialStore, CredentialError> {
        match self {
            CredentialSource::File(path) => {
                debug!("Loading cluster credentials from {}", path.display());
                CredentialStore::load(path)
            }
            CredentialSource::Inline(raw) => {
                debug!("Loading cluster credentials from ${}", CREDENTIALS_ENV_VAR);
                CredentialStore::from_json(raw)
            }
        }
    }

    /// Configured cluster names, or `None` when the store cannot be read
    pub fn known_cluster_names(&self) -> Option<Vec<String>> {
        self.load().ok().map(|store| store.names())
    }
}

/// Look up `cluster` in the store behind `source`
pub fn resolve(source: &CredentialSource, cluster: &str) -> Result<ClusterCredential, FillError> {
    let store = source.load()?;
    let credential = store.resolve(cluster)?.clone();
    info!(
        "Using cluster {} at {} as {}",
        credential.name, credential.management_address, credential.username
    );
    Ok(credential)
}
