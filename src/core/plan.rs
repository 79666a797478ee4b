//! Command plans for each kind of installation medium.
//!
//! Building a plan has no side effects: it is fully determined by the mode,
//! the settings and the media layout. The ISO volume label is the one value
//! only known at execution time, so the steps that need it are native steps
//! the executor fills in after probing.

use std::fmt;
use std::path::PathBuf;

use crate::config::{MediaLayout, Settings};
use crate::core::Mode;
use crate::error::PrepError;
use crate::iso::{self, Bootloader, KICKSTART_ARG};
use crate::utils::Invocation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Run the invocations back to back; the first failure ends the step.
    Run(Vec<Invocation>),
    /// Read the volume label of `device` with blkid.
    ProbeLabel { device: PathBuf },
    /// Add the kickstart boot argument to a bootloader config.
    PatchBootConfig { path: PathBuf, bootloader: Bootloader },
    /// Author the ISO from `source_dir`, labelled with the probed label.
    AuthorIso { source_dir: PathBuf, output: PathBuf },
}

impl Step {
    fn run(invocation: Invocation) -> Self {
        Step::Run(vec![invocation])
    }

    /// External programs this step may start.
    pub fn programs(&self) -> Vec<&str> {
        match self {
            Step::Run(invocations) => invocations.iter().map(Invocation::program).collect(),
            Step::ProbeLabel { .. } => vec!["blkid"],
            Step::PatchBootConfig { .. } => Vec::new(),
            Step::AuthorIso { .. } => vec!["mkisofs"],
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Run(invocations) => {
                for (i, invocation) in invocations.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{}", invocation)?;
                }
                Ok(())
            }
            Step::ProbeLabel { device } => write!(f, "{}", iso::blkid_invocation(device)),
            Step::PatchBootConfig { path, bootloader } => write!(
                f,
                "add {} to {} config {}",
                KICKSTART_ARG,
                bootloader,
                path.display()
            ),
            Step::AuthorIso { source_dir, output } => write!(
                f,
                "{}",
                iso::mkisofs_invocation(source_dir, output, "<label>")
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub mode: Mode,
    pub steps: Vec<Step>,
}

impl Plan {
    /// Distinct programs the plan will start, in first-use order.
    pub fn programs(&self) -> Vec<&str> {
        let mut programs: Vec<&str> = Vec::new();
        for program in self.steps.iter().flat_map(Step::programs) {
            if !programs.contains(&program) {
                programs.push(program);
            }
        }
        programs
    }
}

pub fn build_plan(mode: &Mode, settings: &Settings, layout: &MediaLayout) -> Result<Plan, PrepError> {
    let steps = match mode {
        Mode::UsbKey { device } => usb_key_steps(device, layout),
        Mode::VirtualMediaImage => vmedia_steps(layout),
        Mode::BundledIso => bundled_iso_steps(settings.rhel_iso()?.to_path_buf(), layout),
    };
    Ok(Plan {
        mode: mode.clone(),
        steps,
    })
}

fn usb_key_steps(device: &std::path::Path, layout: &MediaLayout) -> Vec<Step> {
    let mut steps = vec![
        Step::run(Invocation::new("mkfs.ext3").arg("-F").arg(device)),
        Step::run(Invocation::new("mkdir").arg("-p").arg(&layout.mount_point)),
        Step::run(Invocation::new("mount").arg(device).arg(&layout.mount_point)),
    ];
    steps.extend(populate_media_steps(&layout.sah_kickstart, layout));
    steps
}

fn vmedia_steps(layout: &MediaLayout) -> Vec<Step> {
    let image = layout.image_name.as_str();
    let mut steps = vec![
        Step::run(
            Invocation::new("rm")
                .args(["-f", image])
                .current_dir(&layout.home),
        ),
        Step::run(
            Invocation::new("dd")
                .arg("if=/dev/zero")
                .arg(format!("of={image}"))
                .arg("bs=1M")
                .arg(format!("count={}", layout.image_size_mib))
                .current_dir(&layout.home),
        ),
        Step::run(
            Invocation::new("mkfs.ext3")
                .args(["-F", image])
                .current_dir(&layout.home),
        ),
        Step::run(Invocation::new("mkdir").arg("-p").arg(&layout.mount_point)),
        Step::run(
            Invocation::new("mount")
                .args(["-o", "loop", image])
                .arg(&layout.mount_point)
                .current_dir(&layout.home),
        ),
    ];
    steps.extend(populate_media_steps(&layout.csah_kickstart, layout));
    steps
}

/// Copy the automation content onto the mounted medium, then flush and unmount.
fn populate_media_steps(kickstart: &str, layout: &MediaLayout) -> Vec<Step> {
    let pilot_dir = layout.pilot_dir_on_media();
    vec![
        Step::run(
            Invocation::new("cp")
                .arg("-R")
                .arg(layout.ansible_dir())
                .arg(&layout.mount_point),
        ),
        Step::run(
            Invocation::new("cp")
                .arg(kickstart)
                .arg(&layout.mount_point)
                .current_dir(&layout.home),
        ),
        Step::run(Invocation::new("mkdir").arg("-p").arg(&pilot_dir)),
        Step::run(
            Invocation::new("cp")
                .arg(layout.inventory_file())
                .arg(format!("{}/", pilot_dir.display())),
        ),
        Step::Run(vec![
            Invocation::new("sync"),
            Invocation::new("umount").arg(&layout.mount_point),
        ]),
    ]
}

fn bundled_iso_steps(rhel_iso: PathBuf, layout: &MediaLayout) -> Vec<Step> {
    let tree = layout.iso_tree();
    let output = layout.output_iso();
    vec![
        Step::run(Invocation::new("rm").arg("-f").arg(&output)),
        // Nothing may be mounted there yet.
        Step::run(
            Invocation::new("umount")
                .arg(&layout.iso_mount)
                .tolerate_failure(),
        ),
        Step::run(Invocation::new("rm").arg("-rf").arg(&tree)),
        Step::run(
            Invocation::new("mount")
                .args(["-o", "loop"])
                .arg(&rhel_iso)
                .arg(&layout.iso_mount),
        ),
        Step::run(Invocation::new("mkdir").arg(&tree)),
        // "<mnt>/." copies hidden entries such as .discinfo and .treeinfo too.
        Step::run(
            Invocation::new("cp")
                .arg("-avRf")
                .arg(layout.iso_mount.join("."))
                .arg(&tree),
        ),
        Step::run(
            Invocation::new("cp")
                .arg(&layout.csah_kickstart)
                .arg(tree.join("ks.cfg"))
                .current_dir(&layout.home),
        ),
        Step::ProbeLabel { device: rhel_iso },
        Step::PatchBootConfig {
            path: layout.isolinux_cfg(),
            bootloader: Bootloader::Isolinux,
        },
        Step::PatchBootConfig {
            path: layout.grub_cfg(),
            bootloader: Bootloader::Grub,
        },
        Step::AuthorIso {
            source_dir: tree,
            output: output.clone(),
        },
        Step::run(iso::isohybrid_invocation(&output)),
    ]
}
