use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::error::PrepError;

pub struct ChecksumVerifier;

impl ChecksumVerifier {
    pub fn new() -> Self {
        Self
    }

    pub fn verify_sha256(&self, file_path: &Path, expected: &str) -> Result<()> {
        info!("Verifying checksum for: {}", file_path.display());
        debug!("Expected sha256: {}", expected);

        let calculated = self.sha256(file_path)?;

        if calculated.eq_ignore_ascii_case(expected.trim()) {
            info!("✓ Checksum verification passed");
            Ok(())
        } else {
            Err(PrepError::ChecksumMismatch {
                path: file_path.to_path_buf(),
                expected: expected.trim().to_string(),
                actual: calculated,
            }
            .into())
        }
    }

    pub fn sha256(&self, file_path: &Path) -> Result<String> {
        let file = File::open(file_path)
            .with_context(|| format!("Failed to open file: {}", file_path.display()))?;

        let mut reader = BufReader::new(file);
        let mut buffer = vec![0; 64 * 1024];
        let mut hasher = Sha256::new();
        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .context("Failed to read file data")?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }
        Ok(hex::encode(hasher.finalize()))
    }
}

impl Default for ChecksumVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn test_sha256_of_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.iso");
        std::fs::write(&path, b"abc").unwrap();

        let verifier = ChecksumVerifier::new();
        assert_eq!(verifier.sha256(&path).unwrap(), ABC_SHA256);
        verifier
            .verify_sha256(&path, &ABC_SHA256.to_uppercase())
            .unwrap();
    }

    #[test]
    fn test_mismatch_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.iso");
        std::fs::write(&path, b"abcd").unwrap();

        let err = ChecksumVerifier::new()
            .verify_sha256(&path, ABC_SHA256)
            .unwrap_err();
        match err.downcast_ref::<PrepError>() {
            Some(PrepError::ChecksumMismatch { expected, .. }) => {
                assert_eq!(expected, ABC_SHA256)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = ChecksumVerifier::new()
            .sha256(Path::new("/nonexistent/rhel.iso"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to open file"));
    }
}
