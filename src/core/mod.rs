pub mod executor;
pub mod plan;
pub mod preflight;
pub mod preparer;

use std::fmt;
use std::path::PathBuf;

use crate::error::PrepError;

pub use executor::{ExecutionReport, Executor};
pub use plan::{build_plan, Plan, Step};
pub use preparer::{MediaPreparer, Outcome};

/// Kind of installation medium to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Format and fill a physical USB key.
    UsbKey { device: PathBuf },
    /// Build an ext3 image file for iDRAC virtual media.
    VirtualMediaImage,
    /// Repack the RHEL installer ISO with the kickstart embedded.
    BundledIso,
}

const MODE_USAGE: &str = "You need to specify the type of installation to perform\n\
    --usb_key <device> if using a physical key\n\
    --idrac_vmedia_img if using an idrac virtual media image\n\
    --idrac_bundle_iso if using a RHEL 8.x ISO with an embedded kickstart";

impl Mode {
    /// Pick the mode from the three mutually exclusive indicators.
    pub fn select(
        usb_key: Option<PathBuf>,
        idrac_vmedia_img: bool,
        idrac_bundle_iso: bool,
    ) -> Result<Self, PrepError> {
        let given: Vec<&str> = [
            usb_key.as_ref().map(|_| "--usb_key"),
            idrac_vmedia_img.then_some("--idrac_vmedia_img"),
            idrac_bundle_iso.then_some("--idrac_bundle_iso"),
        ]
        .into_iter()
        .flatten()
        .collect();

        match given.len() {
            0 => Err(PrepError::Usage(MODE_USAGE.to_string())),
            1 => Ok(match usb_key {
                Some(device) => Mode::UsbKey { device },
                None if idrac_vmedia_img => Mode::VirtualMediaImage,
                None => Mode::BundledIso,
            }),
            _ => Err(PrepError::Usage(format!(
                "Only one installation type may be given, got {}\n{}",
                given.join(", "),
                MODE_USAGE
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::UsbKey { device } => write!(f, "usb key {}", device.display()),
            Mode::VirtualMediaImage => f.write_str("idrac virtual media image"),
            Mode::BundledIso => f.write_str("RHEL ISO with embedded kickstart"),
        }
    }
}

/// One parsed invocation of the preparer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub mode: Mode,
    pub settings: PathBuf,
    /// Log the plan instead of regenerating the kickstart and running it.
    pub dry_run: bool,
}
