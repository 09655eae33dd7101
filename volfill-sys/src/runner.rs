// SPDX-License-Identifier: GPL-3.0-only

//! Command execution
//!
//! [`SystemRunner`] executes commands on the host through `duct`.
//! [`RecordingRunner`] records them and replays scripted failures, for
//! exercising the mount/fill/unmount sequence without touching the host.

use std::path::PathBuf;
use std::process::Output;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use which::which;

use crate::command::{
    CommandOutcome, Elevation, ExternalCommand, TIMEOUT_EXPIRED_STATUS, TIMEOUT_KILL_AFTER,
};
use crate::error::{Result, SysError};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const SUDO_WAIT_SLACK: Duration = Duration::from_secs(1);

/// Executes [`ExternalCommand`]s
pub trait CommandRunner {
    /// Run to completion. A non-zero exit status is an error.
    fn run(&mut self, command: &ExternalCommand) -> Result<CommandOutcome>;

    /// Commands are only rendered; nothing on the host changes
    fn is_dry_run(&self) -> bool {
        false
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &mut R {
    fn run(&mut self, command: &ExternalCommand) -> Result<CommandOutcome> {
        (**self).run(command)
    }

    fn is_dry_run(&self) -> bool {
        (**self).is_dry_run()
    }
}

/// Runs commands on the local host
#[derive(Debug, Clone)]
pub struct SystemRunner {
    elevation: Elevation,
    dry_run: bool,
    sudo_path: Option<PathBuf>,
}

impl SystemRunner {
    pub fn new(elevation: Elevation) -> Self {
        Self {
            elevation,
            dry_run: false,
            sudo_path: None,
        }
    }

    /// Print commands instead of executing them
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn sudo(&mut self) -> Result<PathBuf> {
        if let Some(path) = &self.sudo_path {
            return Ok(path.clone());
        }
        let path = which("sudo").map_err(|_| SysError::MissingBinary("sudo".to_string()))?;
        debug!("Found sudo binary at {:?}", path);
        self.sudo_path = Some(path.clone());
        Ok(path)
    }
}

impl CommandRunner for SystemRunner {
    fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn run(&mut self, command: &ExternalCommand) -> Result<CommandOutcome> {
        let use_sudo = command.elevate && self.elevation.requires_sudo();
        let rendered = command.render(use_sudo);

        if self.dry_run {
            info!("[dry-run] {}", rendered);
            return Ok(CommandOutcome::skipped(rendered));
        }

        debug!("Running {}", rendered);
        let expression = if use_sudo {
            let sudo = self.sudo()?;
            duct::cmd(sudo, command.argv(true).into_iter().skip(1))
        } else {
            duct::cmd(&command.program, &command.args)
        };
        let expression = expression.stdout_capture().stderr_capture().unchecked();

        let output = match command.timeout {
            // timeout(1) under sudo enforces the bound; the local wait only backs it up
            Some(timeout) if use_sudo => {
                let output = wait_with_timeout(
                    expression,
                    &rendered,
                    timeout + TIMEOUT_KILL_AFTER + SUDO_WAIT_SLACK,
                )?;
                if output.status.code() == Some(TIMEOUT_EXPIRED_STATUS) {
                    warn!("{} timed out after {:?}", rendered, timeout);
                    return Err(SysError::TimedOut {
                        command: rendered,
                        timeout,
                    });
                }
                output
            }
            Some(timeout) => wait_with_timeout(expression, &rendered, timeout)?,
            None => expression.run().map_err(|e| SysError::Spawn {
                command: rendered.clone(),
                reason: e.to_string(),
            })?,
        };

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            warn!("{} failed: {}", rendered, stderr.trim());
            return Err(SysError::CommandFailed {
                command: rendered,
                stderr,
            });
        }

        Ok(CommandOutcome {
            command: rendered,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr,
            executed: true,
        })
    }
}

fn wait_with_timeout(
    expression: duct::Expression,
    rendered: &str,
    timeout: Duration,
) -> Result<Output> {
    let handle = expression.start().map_err(|e| SysError::Spawn {
        command: rendered.to_string(),
        reason: e.to_string(),
    })?;

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(output) = handle.try_wait()? {
            return Ok(output.clone());
        }
        if Instant::now() >= deadline {
            if let Err(e) = handle.kill() {
                warn!("Failed to kill timed out command {}: {}", rendered, e);
            }
            return Err(SysError::TimedOut {
                command: rendered.to_string(),
                timeout,
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Scripted response for [`RecordingRunner`]
#[derive(Debug, Clone)]
pub enum Scripted {
    Fail { stderr: String },
    TimeOut,
}

type Matcher = Box<dyn Fn(&ExternalCommand) -> bool>;

/// Records every command and succeeds unless a scripted rule matches
#[derive(Default)]
pub struct RecordingRunner {
    calls: Vec<ExternalCommand>,
    rules: Vec<(Matcher, Scripted)>,
    stderr: String,
    dry_run: bool,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond with `response` to commands matching `matcher`; first match wins
    pub fn respond_when<F>(mut self, matcher: F, response: Scripted) -> Self
    where
        F: Fn(&ExternalCommand) -> bool + 'static,
    {
        self.rules.push((Box::new(matcher), response));
        self
    }

    /// Fail every invocation of `program`
    pub fn fail_program(self, program: &'static str, stderr: &str) -> Self {
        self.respond_when(
            move |command| command.program == program,
            Scripted::Fail {
                stderr: stderr.to_string(),
            },
        )
    }

    /// Stderr returned by successful commands
    pub fn with_stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.to_string();
        self
    }

    /// Report dry-run mode to callers, as a `SystemRunner` would
    pub fn in_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn calls(&self) -> &[ExternalCommand] {
        &self.calls
    }

    pub fn programs(&self) -> Vec<&str> {
        self.calls.iter().map(|call| call.program.as_str()).collect()
    }

    pub fn count(&self, program: &str) -> usize {
        self.calls.iter().filter(|call| call.program == program).count()
    }
}

impl std::fmt::Debug for RecordingRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingRunner")
            .field("calls", &self.calls)
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl CommandRunner for RecordingRunner {
    fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn run(&mut self, command: &ExternalCommand) -> Result<CommandOutcome> {
        self.calls.push(command.clone());
        let rendered = command.render(false);

        let scripted = self
            .rules
            .iter()
            .find(|(matcher, _)| matcher(command))
            .map(|(_, response)| response.clone());

        match scripted {
            Some(Scripted::Fail { stderr }) => Err(SysError::CommandFailed {
                command: rendered,
                stderr,
            }),
            Some(Scripted::TimeOut) => Err(SysError::TimedOut {
                command: rendered,
                timeout: command.timeout.unwrap_or_default(),
            }),
            None => Ok(CommandOutcome {
                command: rendered,
                stdout: String::new(),
                stderr: self.stderr.clone(),
                executed: true,
            }),
        }
    }
}
