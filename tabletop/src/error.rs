use thiserror::Error;

use crate::object::ObjectId;

/// Errors surfaced by the engine and its collaborators.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("object {0} is already registered")]
    AlreadyRegistered(ObjectId),

    #[error("failed to load texture `{key}`: {reason}")]
    TextureLoad { key: String, reason: String },

    #[error("invalid engine configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
