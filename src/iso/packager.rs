use std::path::Path;

use crate::utils::Invocation;

/// `mkisofs` invocation authoring a BIOS + UEFI bootable installer ISO from
/// the unpacked tree in `source_dir`.
pub fn mkisofs_invocation(source_dir: &Path, output_path: &Path, volume_label: &str) -> Invocation {
    Invocation::new("mkisofs")
        .arg("-o")
        .arg(output_path)
        .args([
            "-b", "isolinux/isolinux.bin",
            "-J", // Joliet extensions
            "-R", // Rock Ridge extensions
            "-l", // Allow full 31 character filenames
            "-c", "isolinux/boot.cat",
            "-no-emul-boot",
            "-boot-load-size", "4",
            "-boot-info-table",
            "-eltorito-alt-boot",
            "-e", "images/efiboot.img",
            "-no-emul-boot",
            "-graft-points",
        ])
        .arg("-V")
        .arg(volume_label)
        .arg(".")
        .current_dir(source_dir)
}

pub fn isohybrid_invocation(iso_path: &Path) -> Invocation {
    Invocation::new("isohybrid").arg("--uefi").arg(iso_path)
}
