use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::{MediaLayout, Settings};
use crate::core::executor::Executor;
use crate::core::plan::build_plan;
use crate::core::{preflight, Mode, RunConfig};
use crate::kickstart::KickstartRegenerator;
use crate::utils::CommandRunner;

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub mode: Mode,
    pub steps_planned: usize,
    pub steps_run: usize,
    pub dry_run: bool,
}

impl Outcome {
    /// Next manual step for the operator.
    pub fn completion_message(&self) -> &'static str {
        match self.mode {
            Mode::VirtualMediaImage => {
                "All done - attach ~/ocp_ks.img to the sah node & continue with the deployment ..."
            }
            _ => "All done - plug the usb into the sah node & continue with the deployment ...",
        }
    }
}

pub struct MediaPreparer<R, K> {
    runner: R,
    kickstart: K,
    layout: MediaLayout,
}

impl<R: CommandRunner, K: KickstartRegenerator> MediaPreparer<R, K> {
    pub fn new(runner: R, kickstart: K, layout: MediaLayout) -> Self {
        Self {
            runner,
            kickstart,
            layout,
        }
    }

    pub fn prepare(&self, config: &RunConfig) -> Result<Outcome> {
        info!("* Creating the SAH node usb image.");
        info!("Installation type: {}", config.mode);

        debug!("loading settings files {}", config.settings.display());
        let settings = Settings::load(&config.settings)?;
        info!("Settings .ini: {}", settings.settings_file.display());
        info!("Settings .yaml {}", settings.nodes_yaml.display());

        if config.dry_run {
            info!("Dry run: not regenerating the kickstart");
        } else {
            let written = self
                .kickstart
                .regenerate(&settings)
                .context("Failed to regenerate the kickstart")?;
            for path in &written {
                info!("Kickstart updated: {}", path.display());
            }
        }

        let plan = build_plan(&config.mode, &settings, &self.layout)?;
        let findings = preflight::check(&plan, &self.layout);
        if !findings.warnings.is_empty() {
            info!("Preflight: {} warning(s), continuing", findings.warnings.len());
        }

        let total = plan.steps.len();
        if config.dry_run {
            for (index, step) in plan.steps.iter().enumerate() {
                info!("[{}/{}] {}", index + 1, total, step);
            }
            info!("Dry run complete: {} steps planned, none executed", total);
            return Ok(Outcome {
                mode: plan.mode,
                steps_planned: total,
                steps_run: 0,
                dry_run: true,
            });
        }

        if config.mode == Mode::BundledIso {
            preflight::verify_source_iso(&settings)?;
        }

        let report = Executor::new(&self.runner).execute(&plan)?;

        let outcome = Outcome {
            steps_planned: total,
            steps_run: report.steps_run,
            mode: plan.mode,
            dry_run: false,
        };
        info!("{}", outcome.completion_message());
        Ok(outcome)
    }
}
