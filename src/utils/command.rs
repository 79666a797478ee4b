//! Structured process invocations.
//!
//! Every external tool is started directly with an argument vector. Nothing is
//! routed through a shell, so paths taken from the settings file never get
//! word-split or interpolated.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

use crate::error::PrepError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    tolerate_failure: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            tolerate_failure: false,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// A non-zero exit from this invocation is logged and the run carries on.
    pub fn tolerate_failure(mut self) -> Self {
        self.tolerate_failure = true;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arg_list(&self) -> &[OsString] {
        &self.args
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn tolerates_failure(&self) -> bool {
        self.tolerate_failure
    }

    /// Arguments rendered lossily, mostly for assertions and log lines.
    pub fn argv(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", quote(&arg.to_string_lossy()))?;
        }
        Ok(())
    }
}

fn quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && !arg
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '$' | '`' | '\\'));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Captured result of one finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stdout followed by stderr.
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}{}", self.stdout, self.stderr),
        }
    }

    pub fn into_failure(self, program: &str) -> PrepError {
        PrepError::CommandFailed {
            program: program.to_string(),
            code: self.code,
            output: self.combined(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Run to completion. A non-zero exit is reported through the output, not as an error.
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, PrepError>;
}

/// Runs invocations on the host, blocking until each process exits.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, PrepError> {
        let mut cmd = Command::new(invocation.program());
        cmd.args(invocation.arg_list()).stdin(Stdio::null());
        if let Some(dir) = invocation.cwd() {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|source| PrepError::Spawn {
            program: invocation.program().to_string(),
            source,
        })?;

        debug!("{} exited with {:?}", invocation.program(), output.status.code());

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Locate `program` on `PATH` the way a shell would.
pub fn find_on_path(program: &str) -> Option<PathBuf> {
    if program.contains('/') {
        let path = PathBuf::from(program);
        return path.is_file().then_some(path);
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_only_when_needed() {
        let inv = Invocation::new("mkisofs")
            .args(["-V", "RHEL 8"])
            .arg("")
            .arg("it's");
        assert_eq!(inv.to_string(), r"mkisofs -V 'RHEL 8' '' 'it'\''s'");

        let inv = Invocation::new("cp").arg("-R").arg(Path::new("/root/ansible"));
        assert_eq!(inv.to_string(), "cp -R /root/ansible");
    }

    #[test]
    fn test_builder_fields() {
        let inv = Invocation::new("umount")
            .arg("/mnt")
            .current_dir("/root")
            .tolerate_failure();
        assert_eq!(inv.program(), "umount");
        assert_eq!(inv.argv(), vec!["/mnt"]);
        assert_eq!(inv.cwd(), Some(Path::new("/root")));
        assert!(inv.tolerates_failure());
    }

    #[test]
    fn test_combined_output() {
        let out = CommandOutput {
            code: Some(1),
            stdout: "copying\n".to_string(),
            stderr: "cp: no space left\n".to_string(),
        };
        assert!(!out.success());
        assert_eq!(out.combined(), "copying\ncp: no space left\n");

        let err = out.into_failure("cp");
        assert!(matches!(err, PrepError::CommandFailed { code: Some(1), .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_output_and_status() {
        let runner = SystemRunner::new();

        let out = runner.run(&Invocation::new("echo").arg("hello")).unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "hello\n");

        let out = runner.run(&Invocation::new("false")).unwrap();
        assert_eq!(out.code, Some(1));

        let dir = tempfile::tempdir().unwrap();
        let out = runner
            .run(&Invocation::new("pwd").current_dir(dir.path()))
            .unwrap();
        let reported = PathBuf::from(out.stdout.trim()).canonicalize().unwrap();
        assert_eq!(reported, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let err = SystemRunner::new()
            .run(&Invocation::new("definitely-not-a-real-tool-4711"))
            .unwrap_err();
        assert!(matches!(err, PrepError::Spawn { .. }));
    }

    #[test]
    fn test_find_on_path_rejects_unknown() {
        assert!(find_on_path("definitely-not-a-real-tool-4711").is_none());
    }
}
