// SPDX-License-Identifier: GPL-3.0-only

//! Export policy inspection
//!
//! Advisory only: nothing here stops a run. The mount itself is the real
//! test of whether this host may attach the volume.

use std::fmt;

use tracing::{info, warn};
use volfill_ontap::{ApiError, ManagementApi};
use volfill_types::ANY_HOST_MATCH;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessVerdict {
    /// Some rule matches every client
    AllowsAnyHost { policy: String },
    /// No rule matches every client; this host may still be listed
    MayNotAllowHost { policy: String },
    PolicyNotFound { policy: String },
    /// The lookup itself failed
    Unverified { policy: String, reason: String },
}

impl fmt::Display for AccessVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessVerdict::AllowsAnyHost { policy } => {
                write!(f, "export policy '{policy}' allows {ANY_HOST_MATCH}")
            }
            AccessVerdict::MayNotAllowHost { policy } => write!(
                f,
                "export policy '{policy}' has no {ANY_HOST_MATCH} rule; mount may fail"
            ),
            AccessVerdict::PolicyNotFound { policy } => {
                write!(f, "export policy '{policy}' not found")
            }
            AccessVerdict::Unverified { policy, reason } => {
                write!(f, "could not check export policy '{policy}': {reason}")
            }
        }
    }
}

/// Query `policy` and classify it
pub fn check<A: ManagementApi>(
    api: &A,
    svm: &str,
    policy: &str,
) -> Result<AccessVerdict, ApiError> {
    let verdict = match api.export_policy(svm, policy)? {
        Some(found) if found.allows_any_host() => AccessVerdict::AllowsAnyHost {
            policy: found.name,
        },
        Some(found) => AccessVerdict::MayNotAllowHost { policy: found.name },
        None => AccessVerdict::PolicyNotFound {
            policy: policy.to_string(),
        },
    };
    Ok(verdict)
}

/// [`check`] with every problem downgraded to a warning
pub fn advise<A: ManagementApi>(api: &A, svm: &str, policy: &str) -> AccessVerdict {
    let verdict = check(api, svm, policy).unwrap_or_else(|error| AccessVerdict::Unverified {
        policy: policy.to_string(),
        reason: error.to_string(),
    });

    match &verdict {
        AccessVerdict::AllowsAnyHost { .. } => info!("{}", verdict),
        _ => warn!("{}", verdict),
    }
    verdict
}
