use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::core::plan::{Plan, Step};
use crate::error::PrepError;
use crate::iso;
use crate::utils::{CommandOutput, CommandRunner, Invocation};

/// What a completed plan left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub steps_run: usize,
    pub volume_label: Option<String>,
}

/// Runs a plan strictly in order, stopping at the first failing step.
pub struct Executor<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Executor<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    pub fn execute(&self, plan: &Plan) -> Result<ExecutionReport> {
        let mut report = ExecutionReport::default();
        let total = plan.steps.len();

        for (index, step) in plan.steps.iter().enumerate() {
            info!("[{}/{}] {}", index + 1, total, step);
            self.execute_step(step, &mut report)
                .with_context(|| format!("Step {} of {} failed: {}", index + 1, total, step))?;
            report.steps_run += 1;
        }

        Ok(report)
    }

    fn execute_step(&self, step: &Step, report: &mut ExecutionReport) -> Result<()> {
        match step {
            Step::Run(invocations) => {
                for invocation in invocations {
                    self.run_checked(invocation)?;
                }
            }
            Step::ProbeLabel { device } => {
                let output = self.run_checked(&iso::blkid_invocation(device))?;
                let label = iso::parse_blkid_label(&output.stdout)?;
                info!("Volume label of {}: {}", device.display(), label);
                report.volume_label = Some(label);
            }
            Step::PatchBootConfig { path, bootloader } => {
                let label = report
                    .volume_label
                    .as_deref()
                    .ok_or(PrepError::LabelNotProbed("patch the boot configuration"))?;
                iso::patch_config_file(path, *bootloader, label)?;
            }
            Step::AuthorIso { source_dir, output } => {
                let label = report
                    .volume_label
                    .as_deref()
                    .ok_or(PrepError::LabelNotProbed("author the ISO"))?;
                self.run_checked(&iso::mkisofs_invocation(source_dir, output, label))?;
            }
        }
        Ok(())
    }

    fn run_checked(&self, invocation: &Invocation) -> Result<CommandOutput, PrepError> {
        match invocation.cwd() {
            Some(dir) => debug!("running {} (in {})", invocation, dir.display()),
            None => debug!("running {}", invocation),
        }

        let output = self.runner.run(invocation)?;
        let combined = output.combined();
        if !combined.is_empty() {
            debug!("{}", combined.trim_end());
        }

        if output.success() {
            Ok(output)
        } else if invocation.tolerates_failure() {
            warn!(
                "{} exited with {:?}, continuing",
                invocation.program(),
                output.code
            );
            Ok(output)
        } else {
            Err(output.into_failure(invocation.program()))
        }
    }
}
