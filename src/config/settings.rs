use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::PrepError;

/// Installation settings read from the deployment ini file.
///
/// Keys are looked up across all sections; the first section that defines a
/// key wins. Path-valued keys are resolved against the settings file's
/// directory when relative.
#[derive(Debug, Clone)]
pub struct Settings {
    pub settings_file: PathBuf,
    pub nodes_yaml: PathBuf,
    rhel_iso: Option<PathBuf>,
    rhel_iso_sha256: Option<String>,
    kickstart_template: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let settings_file = path
            .canonicalize()
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let ini = tini::Ini::from_file(&settings_file).with_context(|| {
            format!("Failed to parse settings file as ini: {}", settings_file.display())
        })?;

        let mut values = BTreeMap::new();
        for (section, items) in ini.iter() {
            debug!("settings section [{}]", section);
            for (key, value) in items.iter() {
                values
                    .entry(key.trim().to_string())
                    .or_insert_with(|| value.trim().to_string());
            }
        }

        Self::from_values(settings_file, values)
    }

    pub fn from_values(settings_file: PathBuf, values: BTreeMap<String, String>) -> Result<Self> {
        let base = settings_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let resolve = |key: &str| {
            values
                .get(key)
                .filter(|v| !v.is_empty())
                .map(|v| base.join(v))
        };

        let nodes_yaml = resolve("nodes_yaml").ok_or(PrepError::MissingSetting("nodes_yaml"))?;
        let rhel_iso = resolve("rhel_iso");
        let kickstart_template = resolve("kickstart_template");
        let rhel_iso_sha256 = values
            .get("rhel_iso_sha256")
            .filter(|v| !v.is_empty())
            .cloned();

        Ok(Self {
            settings_file,
            nodes_yaml,
            rhel_iso,
            rhel_iso_sha256,
            kickstart_template,
            values,
        })
    }

    /// Source installer ISO; only required when bundling a kickstart ISO.
    pub fn rhel_iso(&self) -> Result<&Path, PrepError> {
        self.rhel_iso
            .as_deref()
            .ok_or(PrepError::MissingSetting("rhel_iso"))
    }

    pub fn rhel_iso_sha256(&self) -> Option<&str> {
        self.rhel_iso_sha256.as_deref()
    }

    pub fn kickstart_template(&self) -> Option<&Path> {
        self.kickstart_template.as_deref()
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}
