// SPDX-License-Identifier: GPL-3.0-only

//! volfill - fill a storage volume to a target percentage over NFS

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::{EnvFilter, fmt};
use volfill::cli::{self, Cli};
use volfill::stages::{CredentialSource, credentials};
use volfill::{FillError, FillReport, FillSettings, Workflow, report};
use volfill_ontap::{ClientConfig, OntapClient};
use volfill_sys::SystemRunner;

const DEFAULT_FILTER: &str = "volfill=info,volfill_sys=info,volfill_ontap=info,warn";

fn main() -> Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error)
            if matches!(
                error.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) =>
        {
            error.exit()
        }
        Err(error) => {
            let failure = cli::invalid_arguments(&error);
            let explicit = cli::credentials_flag(std::env::args_os().skip(1));
            let clusters = CredentialSource::from_cli(explicit).known_cluster_names();
            eprint!("{}", cli::render_failure(&failure, clusters));
            return Ok(ExitCode::from(failure.exit_code()));
        }
    };

    let filter = if cli.verbose {
        EnvFilter::new("volfill=debug,volfill_sys=debug,volfill_ontap=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(report) => {
            println!("{report}");
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            eprint!("{}", cli::render_failure(&error, None));
            Ok(ExitCode::from(error.exit_code()))
        }
    }
}

fn run(cli: &Cli) -> Result<FillReport, FillError> {
    let settings = FillSettings::load(cli.settings.as_deref())?;
    let source = CredentialSource::from_cli(cli.credentials.clone());
    let credential = credentials::resolve(&source, &cli.cluster)?;

    let request = cli.request();
    println!("{}\n", report::render_banner(&credential, &request));

    let client = OntapClient::new(ClientConfig::from_credential(
        &credential,
        settings.request_timeout(),
    ))?;
    let runner = SystemRunner::new(settings.elevation()).dry_run(cli.dry_run);

    Workflow::new(&client, runner, &settings)
        .dry_run(cli.dry_run)
        .run(&request)
}
