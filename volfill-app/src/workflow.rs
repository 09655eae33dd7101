// SPDX-License-Identifier: GPL-3.0-only

//! The fill run, from capacity lookup to verification
//!
//! Stages run strictly in order and each fatal error returns immediately.
//! Once the volume is mounted every exit path goes through an unmount
//! attempt first.

use chrono::Local;
use tracing::{info, warn};
use volfill_ontap::ManagementApi;
use volfill_sys::{CommandRunner, MountSession, MountTarget, scratch_path};
use volfill_types::{FillPercentage, FillPlan, bytes_to_pretty, signed_bytes_to_pretty};

use crate::error::FillError;
use crate::report::{FillOutcome, FillReport, FilledRun};
use crate::settings::FillSettings;
use crate::stages::path::PathPolling;
use crate::stages::{Verification, capacity, endpoint, path, policy, verify};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillRequest {
    pub svm: String,
    pub volume: String,
    pub percentage: FillPercentage,
}

pub struct Workflow<'a, A, R> {
    api: A,
    runner: R,
    settings: &'a FillSettings,
    dry_run: bool,
    pid: u32,
}

impl<'a, A, R> Workflow<'a, A, R>
where
    A: ManagementApi,
    R: CommandRunner,
{
    pub fn new(api: A, runner: R, settings: &'a FillSettings) -> Self {
        Self {
            api,
            runner,
            settings,
            dry_run: false,
            pid: std::process::id(),
        }
    }

    /// Skip the junction path assignment and the post-fill verification
    ///
    /// The runner is expected to be in dry-run mode as well.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Identifier for the scratch directory name
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    pub fn run(&mut self, request: &FillRequest) -> Result<FillReport, FillError> {
        let volume = capacity::inspect(&self.api, &request.svm, &request.volume)?;
        let plan = FillPlan::for_volume(&volume, request.percentage);

        info!(
            "Target {} of {}: {} to write",
            request.percentage,
            bytes_to_pretty(plan.total_bytes, false),
            signed_bytes_to_pretty(plan.bytes_to_fill, false)
        );

        if !plan.is_actionable() {
            let current_pct = plan.current_percent();
            if plan.bytes_to_fill > 0 {
                info!(
                    "Only {} bytes short of target, less than one MiB; nothing to write",
                    plan.bytes_to_fill
                );
            } else {
                info!(
                    "Volume is already at {:.2}%, target {} reached",
                    current_pct, request.percentage
                );
            }
            return Ok(FillReport {
                volume,
                plan,
                outcome: FillOutcome::AlreadyAtTarget { current_pct },
                dry_run: self.dry_run,
            });
        }

        let interface = endpoint::locate(&self.api, &request.svm, &self.settings.data_service)?;

        let policy_name = volume.export_policy_or(&self.settings.default_export_policy);
        let access = policy::advise(&self.api, &request.svm, policy_name);

        let polling = PathPolling {
            interval: self.settings.path_poll_interval(),
            attempts: self.settings.path_poll_attempts,
        };
        let junction = path::ensure(&self.api, &request.svm, &volume, polling, self.dry_run)?;

        let target = MountTarget {
            remote_address: interface.address.clone(),
            remote_path: junction.path.clone(),
            scratch_path: scratch_path(&self.settings.scratch_root, self.pid),
        };
        let export = target.source();

        let mut session =
            MountSession::mount(&mut self.runner, target, self.settings.mount_options())
                .map_err(|source| FillError::MountFailed { export, source })?;

        let artifact = session
            .fill(&mut self.runner, plan.mib_to_fill(), &Local::now())
            .map_err(|source| FillError::WriteFailed { source })?;
        if let Some(stats) = &artifact.stats {
            info!("{}", stats);
        }

        let unmount = session.release(&mut self.runner);
        if !unmount.is_clean() {
            warn!("Continuing to verification with the volume possibly still mounted");
        }

        let verification = if self.dry_run {
            Verification::Unverified {
                reason: "dry run".to_string(),
            }
        } else {
            verify::confirm(
                &self.api,
                &request.svm,
                &volume.name,
                request.percentage,
                self.settings.settle_delay(),
                self.settings.tolerance_pct,
            )
        };

        Ok(FillReport {
            volume,
            plan,
            outcome: FillOutcome::Filled(FilledRun {
                data_address: interface.address,
                junction,
                access,
                artifact,
                unmount,
                verification,
            }),
            dry_run: self.dry_run,
        })
    }
}
