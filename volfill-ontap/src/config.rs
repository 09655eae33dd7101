// SPDX-License-Identifier: GPL-3.0-only

use std::fmt;
use std::time::Duration;

use volfill_types::ClusterCredential;

/// Immutable connection settings, built once per run and shared by every request
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// `https://{management_address}/api`
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Skip TLS certificate and hostname validation
    pub accept_invalid_certs: bool,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn from_credential(credential: &ClusterCredential, timeout: Duration) -> Self {
        Self {
            base_url: format!("https://{}/api", credential.management_address),
            username: credential.username.clone(),
            password: credential.password.clone(),
            accept_invalid_certs: !credential.verify_ssl,
            timeout,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_https_base_url_without_cert_validation() {
        let credential = ClusterCredential {
            name: "vsim-1".to_string(),
            management_address: "10.1.1.1".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
            description: None,
            verify_ssl: false,
        };

        let config = ClientConfig::from_credential(&credential, Duration::from_secs(30));
        assert_eq!(config.base_url, "https://10.1.1.1/api");
        assert_eq!(config.url("/storage/volumes"), "https://10.1.1.1/api/storage/volumes");
        assert!(config.accept_invalid_certs);
        assert!(!format!("{config:?}").contains("secret"));
    }
}
