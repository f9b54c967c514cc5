use crate::ml::TrainError;

/// Errors surfaced by the exposed engine operations. Provider failures and
/// unparseable picks never reach this level: the capturer degrades the
/// snapshot and the resolver leaves the row pending.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("database error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("training error: {0}")]
    Training(#[from] TrainError),

    #[error("unknown model: {0}")]
    UnknownModel(String),
}
