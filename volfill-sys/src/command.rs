// SPDX-License-Identifier: GPL-3.0-only

use std::time::Duration;

pub(crate) const TIMEOUT_PROGRAM: &str = "timeout";

/// Grace period `timeout(1)` leaves between TERM and KILL
pub(crate) const TIMEOUT_KILL_AFTER: Duration = Duration::from_secs(1);

/// Exit status `timeout(1)` reports when the deadline passed
pub(crate) const TIMEOUT_EXPIRED_STATUS: i32 = 124;

/// When to prefix privileged commands with `sudo`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Elevation {
    /// Only when not already running as root
    #[default]
    Auto,
    Always,
    Never,
}

impl Elevation {
    /// Whether a command flagged as privileged needs `sudo` under this policy
    pub fn requires_sudo(self) -> bool {
        match self {
            Elevation::Auto => unsafe { libc::geteuid() != 0 },
            Elevation::Always => true,
            Elevation::Never => false,
        }
    }
}

/// One invocation of a host utility
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Needs root; the runner prepends `sudo` according to its [`Elevation`]
    pub elevate: bool,
    /// Upper bound on the wait; `None` blocks until exit
    pub timeout: Option<Duration>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            elevate: false,
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn elevated(mut self) -> Self {
        self.elevate = true;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|candidate| candidate == arg)
    }

    /// Full argv, with `sudo` first when `sudo` is set and the command is privileged
    ///
    /// A privileged command with a timeout also runs under `timeout(1)`
    /// inside `sudo`. Killing `sudo` on the deadline does not reach its child,
    /// so the bound has to be enforced on the far side of the privilege switch.
    pub fn argv(&self, sudo: bool) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 5);
        if sudo && self.elevate {
            argv.push("sudo".to_string());
            if let Some(timeout) = self.timeout {
                argv.push(TIMEOUT_PROGRAM.to_string());
                argv.push(format!("--kill-after={}s", TIMEOUT_KILL_AFTER.as_secs()));
                argv.push(format!("{}s", timeout.as_secs().max(1)));
            }
        }
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }

    pub fn render(&self, sudo: bool) -> String {
        self.argv(sudo).join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    /// False for dry runs
    pub executed: bool,
}

impl CommandOutcome {
    pub fn skipped(command: String) -> Self {
        Self {
            command,
            stdout: String::new(),
            stderr: String::new(),
            executed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_privileged_command_with_sudo() {
        let command = ExternalCommand::new("umount").arg("-f").arg("/tmp/x").elevated();
        assert_eq!(command.render(true), "sudo umount -f /tmp/x");
        assert_eq!(command.render(false), "umount -f /tmp/x");
    }

    #[test]
    fn bounded_privileged_command_runs_under_timeout() {
        let command = ExternalCommand::new("umount")
            .arg("/tmp/x")
            .elevated()
            .with_timeout(Duration::from_secs(10));
        assert_eq!(
            command.render(true),
            "sudo timeout --kill-after=1s 10s umount /tmp/x"
        );
        assert_eq!(command.render(false), "umount /tmp/x");

        let quick = ExternalCommand::new("umount")
            .elevated()
            .with_timeout(Duration::from_millis(200));
        assert_eq!(quick.argv(true)[3], "1s");
    }

    #[test]
    fn unprivileged_command_never_gets_sudo() {
        let command = ExternalCommand::new("true");
        assert_eq!(command.argv(true), vec!["true".to_string()]);
    }

    #[test]
    fn auto_elevates_only_when_not_root() {
        let root = unsafe { libc::geteuid() == 0 };
        assert_eq!(Elevation::Auto.requires_sudo(), !root);
    }

    #[test]
    fn explicit_policies_ignore_euid() {
        assert!(Elevation::Always.requires_sudo());
        assert!(!Elevation::Never.requires_sudo());
    }
}
