//! Crate-wide error type

use crate::core::types::EntityId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HollowError {
    #[error("Entity not found: {0:?}")]
    EntityNotFound(EntityId),

    #[error("Building not found: {0}")]
    BuildingNotFound(u32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HollowError>;
