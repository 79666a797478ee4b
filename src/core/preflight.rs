//! Checks run between planning and execution.
//!
//! Only a source ISO checksum mismatch is fatal; everything else is reported
//! as a warning and left for the failing command to surface.

use anyhow::Result;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::{MediaLayout, Settings};
use crate::core::{Mode, Plan};
use crate::utils::command::find_on_path;
use crate::utils::ChecksumVerifier;

/// Warnings collected while checking a plan.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Findings {
    pub warnings: Vec<String>,
}

impl Findings {
    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}

pub fn check(plan: &Plan, layout: &MediaLayout) -> Findings {
    let mut findings = Findings::default();

    if !running_as_root() {
        findings.warn("Not running as root; formatting and mounting will likely fail".to_string());
    }

    for program in plan.programs() {
        match find_on_path(program) {
            Some(path) => debug!("found {} at {}", program, path.display()),
            None => findings.warn(format!("`{}` was not found on PATH", program)),
        }
    }

    if matches!(plan.mode, Mode::UsbKey { .. } | Mode::VirtualMediaImage) {
        check_inventory(&layout.inventory_file(), &mut findings);
    }

    findings
}

/// Verify the source ISO against `rhel_iso_sha256` when the settings carry one.
pub fn verify_source_iso(settings: &Settings) -> Result<()> {
    let Some(expected) = settings.rhel_iso_sha256() else {
        debug!("No rhel_iso_sha256 configured, skipping source ISO verification");
        return Ok(());
    };
    ChecksumVerifier::new().verify_sha256(settings.rhel_iso()?, expected)
}

fn check_inventory(path: &Path, findings: &mut Findings) {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            findings.warn(format!("Cannot read inventory {}: {}", path.display(), e));
            return;
        }
    };

    if let Err(e) = serde_json::from_str::<serde_json::Value>(&content) {
        findings.warn(format!("Inventory {} is not valid JSON: {}", path.display(), e));
    }
}

#[cfg(unix)]
fn running_as_root() -> bool {
    nix::unistd::Uid::effective().is_root()
}

#[cfg(not(unix))]
fn running_as_root() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::build_plan;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::PathBuf;

    fn settings(extra: &[(&str, &str)]) -> Settings {
        let mut values: BTreeMap<String, String> = extra
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        values.insert("nodes_yaml".to_string(), "nodes.yaml".to_string());
        Settings::from_values(PathBuf::from("/root/s.ini"), values).unwrap()
    }

    fn inventory_warnings(findings: &Findings) -> Vec<&String> {
        findings
            .warnings
            .iter()
            .filter(|w| w.starts_with("Inventory") || w.starts_with("Cannot read inventory"))
            .collect()
    }

    #[test]
    fn test_inventory_checks() {
        let home = tempfile::tempdir().unwrap();
        let layout = MediaLayout::for_home(home.path());
        let settings = settings(&[]);
        let plan = build_plan(&Mode::VirtualMediaImage, &settings, &layout).unwrap();

        let findings = check(&plan, &layout);
        assert_eq!(inventory_warnings(&findings).len(), 1);
        assert!(inventory_warnings(&findings)[0].starts_with("Cannot read inventory"));

        let inventory = layout.inventory_file();
        fs::create_dir_all(inventory.parent().unwrap()).unwrap();
        fs::write(&inventory, "{ not json").unwrap();
        let findings = check(&plan, &layout);
        assert!(inventory_warnings(&findings)[0].contains("is not valid JSON"));

        fs::write(&inventory, r#"[{"service_tag": "ABC1234", "role": "sah"}]"#).unwrap();
        let findings = check(&plan, &layout);
        assert!(inventory_warnings(&findings).is_empty());
    }

    #[test]
    fn test_iso_mode_skips_inventory() {
        let home = tempfile::tempdir().unwrap();
        let layout = MediaLayout::for_home(home.path());
        let settings = settings(&[("rhel_iso", "/isos/rhel.iso")]);
        let plan = build_plan(&Mode::BundledIso, &settings, &layout).unwrap();

        let findings = check(&plan, &layout);
        assert!(inventory_warnings(&findings).is_empty());
    }

    #[test]
    fn test_source_iso_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let iso = dir.path().join("rhel.iso");
        fs::write(&iso, b"abc").unwrap();
        let iso = iso.to_string_lossy().into_owned();

        verify_source_iso(&settings(&[("rhel_iso", iso.as_str())])).unwrap();
        verify_source_iso(&settings(&[
            ("rhel_iso", iso.as_str()),
            (
                "rhel_iso_sha256",
                "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
            ),
        ]))
        .unwrap();

        let err = verify_source_iso(&settings(&[
            ("rhel_iso", iso.as_str()),
            ("rhel_iso_sha256", "00"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("Checksum mismatch"));
    }
}
