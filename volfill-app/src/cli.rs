// SPDX-License-Identifier: GPL-3.0-only

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use volfill_types::FillPercentage;

use crate::error::FillError;
use crate::workflow::FillRequest;

/// Fill a volume to a target percentage of its capacity
#[derive(Debug, Parser)]
#[command(name = "volfill", version)]
#[command(about = "Fill an ONTAP volume to a target percentage over NFS", long_about = None)]
pub struct Cli {
    /// Cluster name from the credential store
    pub cluster: String,

    /// Storage VM that owns the volume
    pub svm: String,

    /// Volume name
    pub volume: String,

    /// Target fill percentage (1-99)
    #[arg(value_parser = parse_percentage)]
    pub percentage: FillPercentage,

    /// Credential store, instead of $ONTAP_CLUSTERS or test/clusters.json
    #[arg(long, value_name = "FILE")]
    pub credentials: Option<PathBuf>,

    /// TOML file overriding mount options, timeouts and delays
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Query the cluster but print commands instead of running them
    #[arg(long)]
    pub dry_run: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn request(&self) -> FillRequest {
        FillRequest {
            svm: self.svm.clone(),
            volume: self.volume.clone(),
            percentage: self.percentage,
        }
    }
}

fn parse_percentage(raw: &str) -> Result<FillPercentage, String> {
    raw.parse::<FillPercentage>().map_err(|e| e.to_string())
}

/// A rejected command line, carrying clap's rendered usage text
pub fn invalid_arguments(error: &clap::Error) -> FillError {
    FillError::InvalidArgument(error.render().to_string())
}

/// Value of `--credentials` in a command line clap rejected
///
/// Best effort: only the `--credentials PATH` and `--credentials=PATH`
/// forms before a `--` separator are recognised.
pub fn credentials_flag<I>(args: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.to_str() {
            Some("--") => break,
            Some("--credentials") => return args.next().map(PathBuf::from),
            Some(flag) => {
                if let Some(value) = flag.strip_prefix("--credentials=") {
                    return Some(PathBuf::from(value));
                }
            }
            None => {}
        }
    }
    None
}

/// What the binary prints on stderr for a fatal error
///
/// Usage errors are followed by `clusters`, the configured names if the
/// store could be read. An unknown cluster lists the names it was
/// checked against.
pub fn render_failure(error: &FillError, clusters: Option<Vec<String>>) -> String {
    let (mut text, names) = match error {
        FillError::InvalidArgument(usage) => (usage.trim_end().to_string(), clusters),
        FillError::UnknownCluster { known, .. } => (format!("Error: {error}"), Some(known.clone())),
        _ => (format!("Error: {error}"), None),
    };

    if let Some(names) = names.filter(|names| !names.is_empty()) {
        text.push_str("\n\nAvailable clusters:");
        for name in names {
            text.push_str(&format!("\n  - {name}"));
        }
    }
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_positional_arguments() {
        let cli = Cli::try_parse_from(["volfill", "lab", "vs0", "vol1", "91", "--dry-run"]).unwrap();
        assert_eq!(cli.cluster, "lab");
        assert!(cli.dry_run);
        let request = cli.request();
        assert_eq!(request.volume, "vol1");
        assert_eq!(request.percentage.get(), 91);
    }

    #[test]
    fn rejects_out_of_range_and_missing_arguments() {
        assert!(Cli::try_parse_from(["volfill", "lab", "vs0", "vol1", "100"]).is_err());
        assert!(Cli::try_parse_from(["volfill", "lab", "vs0", "vol1", "abc"]).is_err());
        assert!(Cli::try_parse_from(["volfill", "lab", "vs0"]).is_err());
    }

    #[test]
    fn parse_failure_is_an_invalid_argument_with_usage_status() {
        let error = Cli::try_parse_from(["volfill", "lab", "vs0", "vol1", "100"]).unwrap_err();
        let failure = invalid_arguments(&error);
        assert!(matches!(failure, FillError::InvalidArgument(_)));
        assert_eq!(failure.exit_code(), 2);

        let text = render_failure(&failure, Some(vec!["lab".to_string(), "prod".to_string()]));
        assert!(text.contains("Usage:"));
        assert_eq!(text.matches("  - lab").count(), 1);
        assert_eq!(text.matches("  - prod").count(), 1);
    }

    #[test]
    fn unreadable_store_adds_no_cluster_list() {
        let failure = FillError::InvalidArgument("error: missing argument\n".to_string());
        assert_eq!(render_failure(&failure, None), "error: missing argument\n");
    }

    #[test]
    fn unknown_cluster_lists_known_names_once() {
        let failure = FillError::UnknownCluster {
            name: "nope".to_string(),
            known: vec!["lab-a400".to_string(), "vsim-1".to_string()],
        };
        let text = render_failure(&failure, None);

        assert!(text.starts_with("Error: cluster 'nope' not found in credential store"));
        assert_eq!(text.matches("Available clusters:").count(), 1);
        assert_eq!(text.matches("lab-a400").count(), 1);
        assert_eq!(text.matches("vsim-1").count(), 1);
        assert_eq!(failure.exit_code(), 1);
    }

    #[test]
    fn other_failures_render_without_cluster_list() {
        let failure = FillError::VolumeNotFound {
            volume: "vol1".to_string(),
            svm: "vs0".to_string(),
        };
        let text = render_failure(&failure, Some(vec!["lab".to_string()]));
        assert_eq!(text, "Error: volume 'vol1' not found in SVM 'vs0'\n");
        assert_eq!(failure.exit_code(), 1);
    }

    #[test]
    fn finds_credentials_flag_in_rejected_arguments() {
        let args = |list: &[&str]| list.iter().map(OsString::from).collect::<Vec<_>>();

        assert_eq!(
            credentials_flag(args(&["--credentials", "/etc/c.json", "vsim-1"])),
            Some(PathBuf::from("/etc/c.json"))
        );
        assert_eq!(
            credentials_flag(args(&["vsim-1", "--credentials=/etc/c.json"])),
            Some(PathBuf::from("/etc/c.json"))
        );
        assert_eq!(credentials_flag(args(&["vsim-1", "--credentials"])), None);
        assert_eq!(
            credentials_flag(args(&["--", "--credentials", "/etc/c.json"])),
            None
        );
        assert_eq!(credentials_flag(args(&["vsim-1", "vs0"])), None);
    }
}
