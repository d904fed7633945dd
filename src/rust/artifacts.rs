use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// File name of the classifier artifact inside an artifact directory.
pub const MODEL_FILE_NAME: &str = "model.onnx";
/// File name of the optional vectorizer artifact inside an artifact directory.
pub const VECTORIZER_FILE_NAME: &str = "vectorizer.onnx";
/// Environment variable consulted for the artifact directory.
pub const HOME_ENV_VAR: &str = "SENTIMENT_ANALYZER_HOME";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
}

/// Locations of the persisted artifacts, with optional SHA-256 digests they
/// must match before being deserialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model_path: PathBuf,
    pub vectorizer_path: PathBuf,
    pub model_sha256: Option<String>,
    pub vectorizer_sha256: Option<String>,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl ArtifactPaths {
    /// Uses the conventional file names inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            model_path: dir.join(MODEL_FILE_NAME),
            vectorizer_path: dir.join(VECTORIZER_FILE_NAME),
            model_sha256: None,
            vectorizer_sha256: None,
        }
    }

    /// Resolves the artifact directory: an explicit directory wins, then
    /// `SENTIMENT_ANALYZER_HOME`, then the current directory.
    pub fn resolve(explicit_dir: Option<&Path>) -> Self {
        Self::in_dir(Self::resolve_dir(explicit_dir))
    }

    pub fn resolve_dir(explicit_dir: Option<&Path>) -> PathBuf {
        if let Some(dir) = explicit_dir {
            return dir.to_path_buf();
        }
        if let Ok(path) = env::var(HOME_ENV_VAR) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }
        PathBuf::from(".")
    }

    pub fn with_model_sha256(mut self, hash: impl Into<String>) -> Self {
        self.model_sha256 = Some(hash.into());
        self
    }

    pub fn with_vectorizer_sha256(mut self, hash: impl Into<String>) -> Self {
        self.vectorizer_sha256 = Some(hash.into());
        self
    }

    /// Checks the classifier file exists and, when a digest is configured,
    /// that its contents match it.
    pub fn check_model(&self) -> Result<(), ArtifactError> {
        check_file(&self.model_path, self.model_sha256.as_deref(), "model")
    }

    pub fn check_vectorizer(&self) -> Result<(), ArtifactError> {
        check_file(
            &self.vectorizer_path,
            self.vectorizer_sha256.as_deref(),
            "vectorizer",
        )
    }
}

fn check_file(path: &Path, expected_hash: Option<&str>, file_type: &str) -> Result<(), ArtifactError> {
    if !path.is_file() {
        return Err(ArtifactError::NotFound(format!(
            "{} file {}",
            file_type,
            path.display()
        )));
    }
    let Some(expected) = expected_hash else {
        return Ok(());
    };

    let actual = file_sha256(path)?;
    log::info!("Verifying {} file {:?}", file_type, path);
    log::debug!("  Calculated hash: {}", actual);
    log::debug!("  Expected hash:   {}", expected);
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        log::error!("{} hash mismatch: expected {}, got {}", file_type, expected, actual);
        return Err(ArtifactError::HashMismatch {
            file_type: file_type.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Hex-encoded SHA-256 of a file's contents.
pub fn file_sha256(path: &Path) -> Result<String, ArtifactError> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}
