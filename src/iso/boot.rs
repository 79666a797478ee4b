use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::PrepError;

/// Kernel argument that points anaconda at the kickstart on the optical medium.
pub const KICKSTART_ARG: &str = "inst.ks=cdrom:/ks.cfg";

/// Bootloader configs found on a RHEL installer ISO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootloader {
    /// BIOS: `isolinux/isolinux.cfg`; only the first install entry is patched.
    Isolinux,
    /// UEFI: `EFI/BOOT/grub.cfg`; every install entry is patched.
    Grub,
}

impl fmt::Display for Bootloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bootloader::Isolinux => f.write_str("isolinux"),
            Bootloader::Grub => f.write_str("grub"),
        }
    }
}

impl Bootloader {
    /// The install entry text, without the kickstart argument.
    fn entry(&self, label: &str) -> String {
        match self {
            Bootloader::Isolinux => {
                format!("append initrd=initrd.img inst.stage2=hd:LABEL={label}")
            }
            Bootloader::Grub => {
                format!("linuxefi /images/pxeboot/vmlinuz inst.stage2=hd:LABEL={label} quiet")
            }
        }
    }

    fn patched_entry(&self, label: &str) -> String {
        match self {
            Bootloader::Isolinux => format!("{} {}", self.entry(label), KICKSTART_ARG),
            Bootloader::Grub => format!(
                "linuxefi /images/pxeboot/vmlinuz inst.stage2=hd:LABEL={label} {KICKSTART_ARG} quiet"
            ),
        }
    }
}

/// Result of patching one config's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchedConfig {
    pub content: String,
    pub patched_entries: usize,
    pub already_patched: usize,
}

/// Insert the kickstart argument into the install entries for `label`.
pub fn patch_config(content: &str, bootloader: Bootloader, label: &str) -> PatchedConfig {
    let entry = bootloader.entry(label);
    let patched = bootloader.patched_entry(label);

    let mut out = String::with_capacity(content.len() + KICKSTART_ARG.len() + 1);
    let mut patched_entries = 0;
    let mut already_patched = 0;

    for line in content.split_inclusive('\n') {
        let first_only_done =
            bootloader == Bootloader::Isolinux && patched_entries + already_patched > 0;
        if first_only_done {
            out.push_str(line);
            continue;
        }

        if line.contains(&patched) {
            already_patched += 1;
            out.push_str(line);
            continue;
        }

        let found = find_entry(line, &entry);
        if found.is_some() && carries_kickstart_arg(line) {
            already_patched += 1;
            out.push_str(line);
            continue;
        }

        match found {
            Some(pos) => {
                out.push_str(&line[..pos]);
                out.push_str(&patched);
                out.push_str(&line[pos + entry.len()..]);
                patched_entries += 1;
            }
            None => out.push_str(line),
        }
    }

    PatchedConfig {
        content: out,
        patched_entries,
        already_patched,
    }
}

/// Position of `entry` in `line`, only where the label ends at a word boundary.
fn find_entry(line: &str, entry: &str) -> Option<usize> {
    line.match_indices(entry).map(|(pos, _)| pos).find(|pos| {
        line[pos + entry.len()..]
            .chars()
            .next()
            .map_or(true, char::is_whitespace)
    })
}

fn carries_kickstart_arg(line: &str) -> bool {
    line.split_whitespace().any(|word| word == KICKSTART_ARG)
}

/// Patch a bootloader config on disk in place.
pub fn patch_config_file(path: &Path, bootloader: Bootloader, label: &str) -> Result<()> {
    info!("Configuring {} bootloader: {}", bootloader, path.display());

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} configuration: {}", bootloader, path.display()))?;

    let result = patch_config(&content, bootloader, label);
    if result.patched_entries == 0 && result.already_patched == 0 {
        return Err(PrepError::BootConfigUnpatched(path.to_path_buf()).into());
    }

    if result.patched_entries > 0 {
        fs::write(path, &result.content).with_context(|| {
            format!("Failed to write {} configuration: {}", bootloader, path.display())
        })?;
    }

    debug!(
        "{} configuration: {} entries patched, {} already carried {}",
        bootloader, result.patched_entries, result.already_patched, KICKSTART_ARG
    );
    Ok(())
}
