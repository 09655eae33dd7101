// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use thiserror::Error;
use volfill_ontap::ApiError;
use volfill_sys::SysError;
use volfill_types::CredentialError;

/// Fatal conditions; every variant aborts the run with a non-zero status
#[derive(Debug, Error)]
pub enum FillError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("credential store not found: {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("cluster '{name}' not found in credential store")]
    UnknownCluster { name: String, known: Vec<String> },

    #[error(transparent)]
    Credentials(CredentialError),

    #[error("invalid settings file {}: {reason}", .path.display())]
    Settings { path: PathBuf, reason: String },

    #[error("management API request failed: {0}")]
    Api(#[from] ApiError),

    #[error("volume '{volume}' not found in SVM '{svm}'")]
    VolumeNotFound { volume: String, svm: String },

    #[error("no {service} data interface found for SVM '{svm}'; the SVM must have NFS configured with a data LIF")]
    NoDataEndpoint { svm: String, service: String },

    #[error("failed to set junction path {path}: {source}")]
    PathAssignmentFailed {
        path: String,
        #[source]
        source: ApiError,
    },

    #[error("failed to mount {export}: {source}")]
    MountFailed {
        export: String,
        #[source]
        source: SysError,
    },

    #[error("failed to write fill file: {source}")]
    WriteFailed {
        #[source]
        source: SysError,
    },
}

impl FillError {
    pub fn exit_code(&self) -> u8 {
        match self {
            FillError::InvalidArgument(_) => 2,
            _ => 1,
        }
    }
}

impl From<CredentialError> for FillError {
    fn from(error: CredentialError) -> Self {
        match error {
            CredentialError::NotFound { path } => FillError::ConfigNotFound { path },
            CredentialError::UnknownCluster { name, known } => {
                FillError::UnknownCluster { name, known }
            }
            other => FillError::Credentials(other),
        }
    }
}
