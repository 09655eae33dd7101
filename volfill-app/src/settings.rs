// SPDX-License-Identifier: GPL-3.0-only

//! Tunables for a fill run, optionally loaded from a TOML file
//!
//! Every key is optional; a missing file section falls back to the values
//! the tool has always used against NFSv3 exports.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use volfill_sys::{Elevation, MountOptions};

use crate::error::FillError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SudoMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl From<SudoMode> for Elevation {
    fn from(mode: SudoMode) -> Self {
        match mode {
            SudoMode::Auto => Elevation::Auto,
            SudoMode::Always => Elevation::Always,
            SudoMode::Never => Elevation::Never,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FillSettings {
    /// Parent of the per-process scratch mount point
    pub scratch_root: PathBuf,
    pub fs_type: String,
    pub mount_options: String,
    pub unmount_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Delay between junction path re-reads after assigning one
    pub path_poll_interval_ms: u64,
    pub path_poll_attempts: u32,
    /// Pause before the verification read so the array reports fresh usage
    pub settle_delay_ms: u64,
    /// Percentage points the observed fill may fall short of the target
    pub tolerance_pct: f64,
    pub use_sudo: SudoMode,
    /// Interface service name the data endpoint must offer
    pub data_service: String,
    /// Policy assumed when the volume does not report one
    pub default_export_policy: String,
}

impl Default for FillSettings {
    fn default() -> Self {
        Self {
            scratch_root: PathBuf::from("/tmp"),
            fs_type: "nfs".to_string(),
            mount_options: "vers=3,nolock".to_string(),
            unmount_timeout_secs: 10,
            request_timeout_secs: 30,
            path_poll_interval_ms: 2000,
            path_poll_attempts: 5,
            settle_delay_ms: 2000,
            tolerance_pct: 0.5,
            use_sudo: SudoMode::Auto,
            data_service: "data_nfs".to_string(),
            default_export_policy: "default".to_string(),
        }
    }
}

impl FillSettings {
    /// Defaults when `path` is `None`, otherwise the file layered over them
    pub fn load(path: Option<&Path>) -> Result<Self, FillError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = fs::read_to_string(path).map_err(|e| FillError::Settings {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let settings = Self::from_toml(&raw).map_err(|reason| FillError::Settings {
            path: path.to_path_buf(),
            reason,
        })?;
        debug!("Loaded settings from {}: {:?}", path.display(), settings);
        Ok(settings)
    }

    pub fn from_toml(raw: &str) -> Result<Self, String> {
        let settings: Self = toml::from_str(raw).map_err(|e| e.to_string())?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), String> {
        if !(0.0..100.0).contains(&self.tolerance_pct) {
            return Err(format!(
                "tolerance_pct must be within [0, 100), got {}",
                self.tolerance_pct
            ));
        }
        if self.unmount_timeout_secs == 0 {
            return Err("unmount_timeout_secs must be positive".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be positive".to_string());
        }
        if self.data_service.trim().is_empty() {
            return Err("data_service must not be empty".to_string());
        }
        Ok(())
    }

    pub fn mount_options(&self) -> MountOptions {
        MountOptions {
            fs_type: self.fs_type.clone(),
            options: self.mount_options.clone(),
            unmount_timeout: Duration::from_secs(self.unmount_timeout_secs),
        }
    }

    pub fn elevation(&self) -> Elevation {
        self.use_sudo.into()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn path_poll_interval(&self) -> Duration {
        Duration::from_millis(self.path_poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_nfs3_behaviour() {
        let settings = FillSettings::default();
        assert_eq!(settings.mount_options(), MountOptions::default());
        assert_eq!(settings.elevation(), Elevation::Auto);
        assert_eq!(settings.settle_delay(), Duration::from_secs(2));
        assert_eq!(settings.path_poll_attempts, 5);
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let settings = FillSettings::from_toml(
            r#"
            scratch_root = "/var/tmp"
            mount_options = "vers=4.1"
            use_sudo = "never"
            "#,
        )
        .unwrap();

        assert_eq!(settings.scratch_root, PathBuf::from("/var/tmp"));
        assert_eq!(settings.mount_options().options, "vers=4.1");
        assert_eq!(settings.elevation(), Elevation::Never);
        assert_eq!(settings.data_service, "data_nfs");
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        assert!(FillSettings::from_toml("scratch = \"/tmp\"").is_err());
        assert!(FillSettings::from_toml("tolerance_pct = 120.0").is_err());
        assert!(FillSettings::from_toml("unmount_timeout_secs = 0").is_err());
    }

    #[test]
    fn missing_file_is_a_settings_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = FillSettings::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(error, FillError::Settings { .. }));
        assert_eq!(FillSettings::load(None).unwrap(), FillSettings::default());
    }
}
