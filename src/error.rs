use std::path::PathBuf;
use thiserror::Error;

/// Failures the media preparer reports on its own behalf.
///
/// Collaborator and I/O failures travel as `anyhow::Error` with context; these
/// are the cases callers may want to tell apart with `downcast_ref`.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("{0}")]
    Usage(String),

    #[error("`{program}` failed ({}):\n{output}", describe_status(.code))]
    CommandFailed {
        program: String,
        code: Option<i32>,
        output: String,
    },

    #[error("Failed to launch `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required setting `{0}`")]
    MissingSetting(&'static str),

    #[error("No volume label found in blkid output: {0:?}")]
    LabelNotFound(String),

    #[error("Volume label has not been probed yet, cannot {0}")]
    LabelNotProbed(&'static str),

    #[error("No boot entry to patch in {}", .0.display())]
    BootConfigUnpatched(PathBuf),

    #[error("Checksum mismatch for {}\nExpected: {expected}\nCalculated: {actual}", .path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

fn describe_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}
