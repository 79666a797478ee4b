use clap::Parser;
use std::path::PathBuf;

use crate::core::{Mode, RunConfig};
use crate::error::PrepError;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "sah-media")]
pub struct Cli {
    /// ini settings file, e.g. settings/acme.ini
    #[arg(short, long, value_name = "PATH")]
    pub settings: PathBuf,

    /// Use a physical USB key, e.g. --usb_key /dev/sdb
    #[arg(long = "usb_key", value_name = "DEVICE")]
    pub usb_key: Option<PathBuf>,

    /// Use an idrac virtual media image
    #[arg(long = "idrac_vmedia_img")]
    pub idrac_vmedia_img: bool,

    /// Bundle the generated kickstart into the provided RHEL 8.x ISO
    #[arg(long = "idrac_bundle_iso")]
    pub idrac_bundle_iso: bool,

    #[arg(short, long)]
    pub verbose: bool,

    /// Log file receiving the full debug trace
    #[arg(long, value_name = "PATH", default_value = "setup_usb_idrac_ocp.log")]
    pub log_file: PathBuf,

    /// Log the command plan without regenerating the kickstart or running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Exit 0 even when preparation fails; failures are only reported in the log
    #[arg(long)]
    pub exit_zero_on_failure: bool,
}

impl Cli {
    pub fn run_config(&self) -> Result<RunConfig, PrepError> {
        let mode = Mode::select(
            self.usb_key.clone(),
            self.idrac_vmedia_img,
            self.idrac_bundle_iso,
        )?;
        Ok(RunConfig {
            mode,
            settings: self.settings.clone(),
            dry_run: self.dry_run,
        })
    }
}
