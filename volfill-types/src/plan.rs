// SPDX-License-Identifier: GPL-3.0-only

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::{MIB, percent_of};
use crate::volume::VolumeDescriptor;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("fill percentage must be a valid integer, got '{0}'")]
    NotAnInteger(String),
    #[error("fill percentage must be between 1 and 99, got {0}")]
    OutOfRange(i64),
}

/// Requested fill level, an integer percentage in 1..=99
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct FillPercentage(u8);

impl FillPercentage {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 99;

    pub fn get(self) -> u8 {
        self.0
    }

    /// Whether `observed` reaches this target, allowing `tolerance` points below it
    pub fn is_met_by(self, observed: f64, tolerance: f64) -> bool {
        observed >= f64::from(self.0) - tolerance
    }
}

impl TryFrom<i64> for FillPercentage {
    type Error = PlanError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(PlanError::OutOfRange(value))
        }
    }
}

impl From<FillPercentage> for u8 {
    fn from(value: FillPercentage) -> Self {
        value.0
    }
}

impl FromStr for FillPercentage {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| PlanError::NotAnInteger(s.to_string()))?;
        Self::try_from(value)
    }
}

impl fmt::Display for FillPercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Byte target derived from a volume's capacity and a requested percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillPlan {
    pub target_percentage: FillPercentage,
    pub total_bytes: u64,
    pub used_bytes: u64,
    /// `floor(total_bytes * target_percentage / 100)`
    pub target_bytes: u64,
    /// `target_bytes - used_bytes`; zero or negative when already at target
    pub bytes_to_fill: i64,
}

impl FillPlan {
    pub fn new(total_bytes: u64, used_bytes: u64, target_percentage: FillPercentage) -> Self {
        let target_bytes =
            (u128::from(total_bytes) * u128::from(target_percentage.get()) / 100) as u64;
        let bytes_to_fill = (i128::from(target_bytes) - i128::from(used_bytes))
            .clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;

        Self {
            target_percentage,
            total_bytes,
            used_bytes,
            target_bytes,
            bytes_to_fill,
        }
    }

    pub fn for_volume(volume: &VolumeDescriptor, target_percentage: FillPercentage) -> Self {
        Self::new(volume.total_bytes, volume.used_bytes, target_percentage)
    }

    /// Whole mebibytes to write, rounded down
    pub fn mib_to_fill(&self) -> u64 {
        if self.bytes_to_fill <= 0 {
            return 0;
        }
        self.bytes_to_fill as u64 / MIB
    }

    /// False when the volume is already at target or the delta is under one MiB
    pub fn is_actionable(&self) -> bool {
        self.mib_to_fill() > 0
    }

    pub fn current_percent(&self) -> f64 {
        percent_of(self.used_bytes, self.total_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::GIB;

    fn pct(value: i64) -> FillPercentage {
        FillPercentage::try_from(value).unwrap()
    }

    #[test]
    fn computes_target_and_delta() {
        let plan = FillPlan::new(100 * GIB, 50 * GIB, pct(91));
        assert_eq!(plan.target_bytes, 91 * GIB);
        assert_eq!(plan.bytes_to_fill, (41 * GIB) as i64);
        assert_eq!(plan.mib_to_fill(), 41 * 1024);
        assert!(plan.is_actionable());
    }

    #[test]
    fn already_above_target_is_not_actionable() {
        let plan = FillPlan::new(10 * GIB, 9 * GIB + GIB / 2, pct(90));
        assert!(plan.bytes_to_fill <= 0);
        assert_eq!(plan.mib_to_fill(), 0);
        assert!(!plan.is_actionable());
        assert!((plan.current_percent() - 95.0).abs() < 1e-9);
    }

    #[test]
    fn target_bytes_round_down() {
        let plan = FillPlan::new(999, 0, pct(50));
        assert_eq!(plan.target_bytes, 499);
    }

    #[test]
    fn sub_mebibyte_delta_is_not_actionable() {
        let plan = FillPlan::new(100 * MIB, 50 * MIB - 10, pct(50));
        assert_eq!(plan.bytes_to_fill, 10);
        assert!(!plan.is_actionable());
    }

    #[test]
    fn target_is_floor_of_exact_product() {
        for total in [1_u64, 7, 1023, 10 * GIB + 3, u64::MAX / 2] {
            for p in 1..=99 {
                let plan = FillPlan::new(total, 0, pct(p));
                let expected = (u128::from(total) * p as u128 / 100) as u64;
                assert_eq!(plan.target_bytes, expected);
            }
        }
    }

    #[test]
    fn percentage_parsing_validates_range() {
        assert_eq!("91".parse::<FillPercentage>().unwrap().get(), 91);
        assert_eq!(
            "0".parse::<FillPercentage>().unwrap_err(),
            PlanError::OutOfRange(0)
        );
        assert_eq!(
            "100".parse::<FillPercentage>().unwrap_err(),
            PlanError::OutOfRange(100)
        );
        assert!(matches!(
            "ninety".parse::<FillPercentage>(),
            Err(PlanError::NotAnInteger(_))
        ));
    }

    #[test]
    fn tolerance_allows_half_a_point_below_target() {
        let target = pct(91);
        assert!(target.is_met_by(90.5, 0.5));
        assert!(target.is_met_by(92.0, 0.5));
        assert!(!target.is_met_by(90.4, 0.5));
    }
}
