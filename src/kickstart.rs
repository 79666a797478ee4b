//! Kickstart regeneration.
//!
//! The kickstart handed to the SAH node is rendered from a handlebars template
//! using the deployment settings, then written under every name the media
//! plans copy from.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::{MediaLayout, Settings};
use crate::utils::TemplateEngine;

pub trait KickstartRegenerator {
    /// Rewrite the on-disk kickstarts; returns the files written.
    fn regenerate(&self, settings: &Settings) -> Result<Vec<PathBuf>>;
}

pub struct TemplateKickstart {
    engine: TemplateEngine,
    default_template: PathBuf,
    outputs: Vec<PathBuf>,
}

impl TemplateKickstart {
    pub fn new(layout: &MediaLayout) -> Result<Self> {
        Ok(Self {
            engine: TemplateEngine::new()?,
            default_template: layout.default_kickstart_template(),
            outputs: layout.kickstart_outputs(),
        })
    }
}

impl KickstartRegenerator for TemplateKickstart {
    fn regenerate(&self, settings: &Settings) -> Result<Vec<PathBuf>> {
        let template_path = settings
            .kickstart_template()
            .unwrap_or(self.default_template.as_path());
        info!("Regenerating kickstart from {}", template_path.display());

        let template = std::fs::read_to_string(template_path).with_context(|| {
            format!("Failed to read kickstart template: {}", template_path.display())
        })?;

        let mut variables = settings.values().clone();
        variables.insert(
            "settings_file".to_string(),
            settings.settings_file.display().to_string(),
        );
        variables.insert(
            "nodes_yaml".to_string(),
            settings.nodes_yaml.display().to_string(),
        );

        let rendered = self
            .engine
            .render_string(&template, &variables)
            .with_context(|| format!("Failed to render {}", template_path.display()))?;

        for output in &self.outputs {
            std::fs::write(output, &rendered)
                .with_context(|| format!("Failed to write kickstart: {}", output.display()))?;
            debug!("Wrote kickstart {}", output.display());
        }

        Ok(self.outputs.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;

    fn settings_in(dir: &std::path::Path, extra: &[(&str, &str)]) -> Settings {
        let mut values: BTreeMap<String, String> = [("nodes_yaml", "nodes.yaml")]
            .iter()
            .chain(extra)
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        values.insert("sah_hostname".to_string(), "csah.acme.local".to_string());
        Settings::from_values(dir.join("acme.ini"), values).unwrap()
    }

    #[test]
    fn test_renders_default_template_to_all_outputs() {
        let home = tempfile::tempdir().unwrap();
        let layout = MediaLayout::for_home(home.path());
        let template = layout.default_kickstart_template();
        fs::create_dir_all(template.parent().unwrap()).unwrap();
        fs::write(
            &template,
            "network --hostname={{sah_hostname}}\n# nodes: ${env.nodes_yaml}\n",
        )
        .unwrap();

        let settings = settings_in(home.path(), &[]);
        let written = TemplateKickstart::new(&layout)
            .unwrap()
            .regenerate(&settings)
            .unwrap();

        assert_eq!(written, layout.kickstart_outputs());
        let expected = format!(
            "network --hostname=csah.acme.local\n# nodes: {}\n",
            home.path().join("nodes.yaml").display()
        );
        for path in written {
            assert_eq!(fs::read_to_string(path).unwrap(), expected);
        }
    }

    #[test]
    fn test_template_from_settings_overrides_default() {
        let home = tempfile::tempdir().unwrap();
        let layout = MediaLayout::for_home(home.path());
        fs::write(home.path().join("custom.ks.hbs"), "rootpw {{root_password}}\n").unwrap();

        let settings = settings_in(
            home.path(),
            &[("kickstart_template", "custom.ks.hbs"), ("root_password", "s3cr&t")],
        );
        TemplateKickstart::new(&layout)
            .unwrap()
            .regenerate(&settings)
            .unwrap();

        let sah = fs::read_to_string(home.path().join("ocp-sah.ks")).unwrap();
        assert_eq!(sah, "rootpw s3cr&t\n");
    }

    #[test]
    fn test_missing_template() {
        let home = tempfile::tempdir().unwrap();
        let layout = MediaLayout::for_home(home.path());

        let err = TemplateKickstart::new(&layout)
            .unwrap()
            .regenerate(&settings_in(home.path(), &[]))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read kickstart template"));
        assert!(!home.path().join("ocp-sah.ks").exists());
    }

    #[test]
    fn test_unknown_setting_fails_without_writing() {
        let home = tempfile::tempdir().unwrap();
        let layout = MediaLayout::for_home(home.path());
        fs::write(home.path().join("custom.ks.hbs"), "network --hostname={{sah_hostnme}}\n").unwrap();

        let settings = settings_in(home.path(), &[("kickstart_template", "custom.ks.hbs")]);
        let err = TemplateKickstart::new(&layout)
            .unwrap()
            .regenerate(&settings)
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to render"));
        assert!(!home.path().join("ocp-sah.ks").exists());
        assert!(!home.path().join("ocp-csah.ks").exists());
    }
}
