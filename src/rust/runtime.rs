use std::path::Path;
use std::sync::OnceLock;

use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use ort::Result as OrtResult;

use crate::sentiment::AnalyzerError;

static INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Settings for the ONNX Runtime sessions backing the loaded artifacts.
#[derive(Debug)]
pub struct RuntimeConfig {
    pub inter_threads: usize,
    pub intra_threads: usize,
    pub optimization_level: GraphOptimizationLevel,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            inter_threads: 0, // Let ONNX Runtime decide
            intra_threads: 0, // Let ONNX Runtime decide
            optimization_level: GraphOptimizationLevel::Level3,
        }
    }
}

impl Clone for RuntimeConfig {
    fn clone(&self) -> Self {
        Self {
            inter_threads: self.inter_threads,
            intra_threads: self.intra_threads,
            optimization_level: copy_level(&self.optimization_level),
        }
    }
}

impl RuntimeConfig {
    /// Pins both thread pools to `threads`. Zero leaves the choice to ONNX Runtime.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.inter_threads = threads;
        self.intra_threads = threads;
        self
    }
}

fn copy_level(level: &GraphOptimizationLevel) -> GraphOptimizationLevel {
    match level {
        GraphOptimizationLevel::Level1 => GraphOptimizationLevel::Level1,
        GraphOptimizationLevel::Level2 => GraphOptimizationLevel::Level2,
        GraphOptimizationLevel::Level3 => GraphOptimizationLevel::Level3,
        GraphOptimizationLevel::Disable => GraphOptimizationLevel::Disable,
    }
}

fn init_onnx_environment() -> OrtResult<()> {
    ort::init()
        .with_name("sentiment-analyzer")
        .commit()?;
    Ok(())
}

/// Initializes the process-wide ONNX Runtime environment. Later calls reuse
/// the first outcome.
pub fn ensure_initialized() -> Result<(), AnalyzerError> {
    INIT.get_or_init(|| init_onnx_environment().map_err(|e| e.to_string()))
        .clone()
        .map_err(|msg| {
            AnalyzerError::ArtifactLoadError(format!(
                "Failed to initialize ONNX Runtime environment: {}",
                msg
            ))
        })
}

pub fn create_session_builder(config: &RuntimeConfig) -> Result<SessionBuilder, AnalyzerError> {
    ensure_initialized()?;
    let mut builder = Session::builder()?;

    if config.inter_threads > 0 {
        builder = builder.with_inter_threads(config.inter_threads)?;
    }
    if config.intra_threads > 0 {
        builder = builder.with_intra_threads(config.intra_threads)?;
    }
    builder = builder.with_optimization_level(copy_level(&config.optimization_level))?;

    Ok(builder)
}

/// Deserializes one ONNX artifact from disk.
pub fn load_session(path: &Path, config: &RuntimeConfig) -> Result<Session, AnalyzerError> {
    let session = create_session_builder(config)?
        .commit_from_file(path)
        .map_err(|e| {
            AnalyzerError::ArtifactLoadError(format!(
                "Failed to load {}: {}",
                path.display(),
                e
            ))
        })?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_initialization() {
        assert!(ensure_initialized().is_ok());
        assert!(ensure_initialized().is_ok()); // Second call should be fine
    }

    #[test]
    fn test_session_builder_config() {
        let config = RuntimeConfig {
            inter_threads: 2,
            intra_threads: 2,
            optimization_level: GraphOptimizationLevel::Level1,
        };
        let builder = create_session_builder(&config);
        assert!(builder.is_ok());
    }

    #[test]
    fn test_with_threads() {
        let config = RuntimeConfig::default().with_threads(4);
        assert_eq!(config.inter_threads, 4);
        assert_eq!(config.intra_threads, 4);
        let cloned = config.clone();
        assert_eq!(cloned.intra_threads, 4);
    }

    #[test]
    fn test_load_garbage_file_fails() {
        let path = std::env::temp_dir().join("sentiment-analyzer-runtime-garbage.onnx");
        std::fs::write(&path, b"not an onnx graph").unwrap();
        let result = load_session(&path, &RuntimeConfig::default());
        assert!(matches!(result, Err(AnalyzerError::ArtifactLoadError(_))));
        let _ = std::fs::remove_file(&path);
    }
}
