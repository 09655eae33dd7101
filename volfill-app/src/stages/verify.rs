// SPDX-License-Identifier: GPL-3.0-only

use std::fmt;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};
use volfill_ontap::ManagementApi;
use volfill_types::FillPercentage;

/// Post-fill usage check; never fatal
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    Met { observed_pct: f64 },
    BelowTarget { observed_pct: f64 },
    /// The refreshed usage could not be read
    Unverified { reason: String },
}

impl Verification {
    pub fn is_met(&self) -> bool {
        matches!(self, Verification::Met { .. })
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verification::Met { observed_pct } => {
                write!(f, "target reached ({observed_pct:.2}% used)")
            }
            Verification::BelowTarget { observed_pct } => write!(
                f,
                "below target ({observed_pct:.2}% used); the array may still be updating its usage"
            ),
            Verification::Unverified { reason } => write!(f, "could not verify usage: {reason}"),
        }
    }
}

/// Wait `settle`, re-read usage and compare it to `target` within `tolerance`
pub fn confirm<A: ManagementApi>(
    api: &A,
    svm: &str,
    volume: &str,
    target: FillPercentage,
    settle: Duration,
    tolerance: f64,
) -> Verification {
    if !settle.is_zero() {
        thread::sleep(settle);
    }

    let verification = match api.find_volume(svm, volume) {
        Ok(Some(refreshed)) => {
            let observed_pct = refreshed.used_percent();
            if target.is_met_by(observed_pct, tolerance) {
                Verification::Met { observed_pct }
            } else {
                Verification::BelowTarget { observed_pct }
            }
        }
        Ok(None) => Verification::Unverified {
            reason: format!("volume {volume} no longer found"),
        },
        Err(error) => Verification::Unverified {
            reason: error.to_string(),
        },
    };

    match &verification {
        Verification::Met { .. } => info!("Verification: {}", verification),
        _ => warn!("Verification: {}", verification),
    }
    verification
}
