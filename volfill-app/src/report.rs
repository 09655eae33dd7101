// SPDX-License-Identifier: GPL-3.0-only

use std::fmt;

use volfill_sys::{FillArtifact, UnmountOutcome, fill_file_glob};
use volfill_types::{ClusterCredential, FillPlan, VolumeDescriptor, bytes_to_pretty};

use crate::stages::{AccessVerdict, JunctionPath, Verification};
use crate::workflow::FillRequest;

const CLEANUP_MOUNT_POINT: &str = "/mnt/temp";

/// What a completed run did
#[derive(Debug, Clone)]
pub struct FillReport {
    pub volume: VolumeDescriptor,
    pub plan: FillPlan,
    pub outcome: FillOutcome,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub enum FillOutcome {
    /// Usage already meets the target; nothing was mounted
    AlreadyAtTarget { current_pct: f64 },
    Filled(FilledRun),
}

#[derive(Debug, Clone)]
pub struct FilledRun {
    pub data_address: String,
    pub junction: JunctionPath,
    pub access: AccessVerdict,
    pub artifact: FillArtifact,
    pub unmount: UnmountOutcome,
    pub verification: Verification,
}

impl FilledRun {
    pub fn unmount_clean(&self) -> bool {
        self.unmount.is_clean()
    }

    /// Shell steps to remove the filler files again
    pub fn cleanup_hint(&self) -> Vec<String> {
        vec![
            format!(
                "sudo mount -t nfs {}:{} {CLEANUP_MOUNT_POINT}",
                self.data_address, self.junction.path
            ),
            format!("sudo rm {CLEANUP_MOUNT_POINT}/{}", fill_file_glob()),
            format!("sudo umount {CLEANUP_MOUNT_POINT}"),
        ]
    }
}

impl FillReport {
    /// Target confirmed by the post-fill read, or no fill needed
    pub fn target_met(&self) -> bool {
        match &self.outcome {
            FillOutcome::AlreadyAtTarget { .. } => true,
            FillOutcome::Filled(run) => run.verification.is_met(),
        }
    }
}

/// Header printed before the run starts
pub fn render_banner(credential: &ClusterCredential, request: &FillRequest) -> String {
    let mut banner = format!(
        "Cluster: {} ({})\nSVM: {}\nVolume: {}\nTarget fill: {}",
        credential.name,
        credential.management_address,
        request.svm,
        request.volume,
        request.percentage
    );
    if let Some(description) = &credential.description {
        banner.push_str(&format!("\nDescription: {description}"));
    }
    banner
}

impl fmt::Display for FillReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Volume: {} ({})", self.volume.name, self.volume.identifier)?;
        writeln!(f, "  Total: {}", bytes_to_pretty(self.plan.total_bytes, true))?;
        writeln!(
            f,
            "  Used:  {} ({:.2}%)",
            bytes_to_pretty(self.plan.used_bytes, true),
            self.plan.current_percent()
        )?;
        writeln!(
            f,
            "  Target: {} ({})",
            bytes_to_pretty(self.plan.target_bytes, true),
            self.plan.target_percentage
        )?;

        match &self.outcome {
            FillOutcome::AlreadyAtTarget { current_pct } => write!(
                f,
                "Volume is already at {current_pct:.2}%, at or above the {} target; nothing to do",
                self.plan.target_percentage
            ),
            FillOutcome::Filled(run) => {
                writeln!(f, "Data interface: {}", run.data_address)?;
                if run.junction.assigned {
                    writeln!(f, "Junction path: {} (assigned)", run.junction.path)?;
                } else {
                    writeln!(f, "Junction path: {}", run.junction.path)?;
                }
                writeln!(f, "Export policy: {}", run.access)?;
                writeln!(
                    f,
                    "Fill file: {} ({} MiB)",
                    run.artifact.path.display(),
                    run.artifact.mib_written
                )?;
                if let Some(stats) = &run.artifact.stats {
                    writeln!(f, "  {stats}")?;
                }
                match run.unmount {
                    UnmountOutcome::Graceful => writeln!(f, "Unmounted")?,
                    UnmountOutcome::Forced => writeln!(f, "Unmounted (forced)")?,
                    UnmountOutcome::Leaked => writeln!(
                        f,
                        "WARNING: unmount failed, {} may still be mounted",
                        run.artifact
                            .path
                            .parent()
                            .map(|dir| dir.display().to_string())
                            .unwrap_or_default()
                    )?,
                }
                if self.dry_run {
                    writeln!(f, "Dry run: no changes were made")?;
                } else {
                    writeln!(f, "Verification: {}", run.verification)?;
                }
                writeln!(f, "To remove the fill files later:")?;
                for (index, step) in run.cleanup_hint().iter().enumerate() {
                    if index > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "  {step}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use volfill_types::FillPercentage;

    use super::*;

    fn volume() -> VolumeDescriptor {
        VolumeDescriptor {
            identifier: "u1".to_string(),
            name: "vol1".to_string(),
            total_bytes: 100,
            used_bytes: 95,
            filesystem_path: Some("/vol1".to_string()),
            export_policy_name: None,
        }
    }

    fn filled(verification: Verification, unmount: UnmountOutcome) -> FillReport {
        let volume = volume();
        let plan = FillPlan::for_volume(&volume, FillPercentage::try_from(90).unwrap());
        FillReport {
            volume,
            plan,
            outcome: FillOutcome::Filled(FilledRun {
                data_address: "10.0.0.20".to_string(),
                junction: JunctionPath {
                    path: "/vol1".to_string(),
                    assigned: false,
                },
                access: AccessVerdict::AllowsAnyHost {
                    policy: "default".to_string(),
                },
                artifact: FillArtifact {
                    path: PathBuf::from("/tmp/ontap_fill_1/fillfile_20260101_000000.dat"),
                    mib_written: 4,
                    stats: None,
                },
                unmount,
                verification,
            }),
            dry_run: false,
        }
    }

    #[test]
    fn early_exit_report_counts_as_met() {
        let volume = volume();
        let plan = FillPlan::for_volume(&volume, FillPercentage::try_from(90).unwrap());
        let report = FillReport {
            volume,
            plan,
            outcome: FillOutcome::AlreadyAtTarget { current_pct: 95.0 },
            dry_run: false,
        };
        assert!(report.target_met());
        assert!(report.to_string().contains("nothing to do"));
    }

    #[test]
    fn filled_report_includes_cleanup_steps() {
        let report = filled(Verification::Met { observed_pct: 90.1 }, UnmountOutcome::Graceful);
        let text = report.to_string();
        assert!(report.target_met());
        assert!(text.contains("sudo mount -t nfs 10.0.0.20:/vol1 /mnt/temp"));
        assert!(text.contains("sudo rm /mnt/temp/fillfile_*.dat"));
        assert!(text.contains("target reached (90.10% used)"));
    }

    #[test]
    fn leaked_unmount_is_flagged() {
        let report = filled(
            Verification::BelowTarget { observed_pct: 80.0 },
            UnmountOutcome::Leaked,
        );
        let FillOutcome::Filled(run) = &report.outcome else {
            panic!("expected filled outcome");
        };
        assert!(!run.unmount_clean());
        assert!(!report.target_met());
        assert!(report.to_string().contains("/tmp/ontap_fill_1 may still be mounted"));
    }
}
