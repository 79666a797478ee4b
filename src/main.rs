use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};

use sah_media::cli::Cli;
use sah_media::config::MediaLayout;
use sah_media::core::{MediaPreparer, Outcome};
use sah_media::kickstart::TemplateKickstart;
use sah_media::utils::{LogSession, SystemRunner};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let session = match LogSession::start(&cli.log_file, cli.verbose) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("✗ {:?}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("sah-media v{} starting", env!("CARGO_PKG_VERSION"));

    match run(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("✗ Media preparation failed: {:?}", e);
            error!("Full log: {}", session.log_file().display());
            if cli.exit_zero_on_failure {
                warn!("Exiting with status 0 as requested by --exit-zero-on-failure");
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: &Cli) -> Result<Outcome> {
    let config = cli.run_config()?;
    let layout = MediaLayout::detect()?;
    let kickstart = TemplateKickstart::new(&layout)?;
    let preparer = MediaPreparer::new(SystemRunner::new(), kickstart, layout);
    preparer.prepare(&config)
}
