use std::path::PathBuf;

/// Failures surfaced by the engine. Each one ends the operation that raised it
/// and leaves any previously published index serving.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("corpus source {path} is unavailable: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    #[error("corpus contains no documents with a storyline")]
    EmptyCorpus,

    #[error("recommendation engine is not initialized")]
    EngineNotInitialized,
}

impl EngineError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        EngineError::SourceUnavailable { path: path.into(), reason: reason.to_string() }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
