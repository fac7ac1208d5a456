//! Shared error types for the services crate.

use thiserror::Error;

use milim_core::model::{ListError, WordError};
use storage::repository::StorageError;

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no words available for session")]
    Empty,
    #[error("no active word")]
    NoActiveWord,
    #[error("current word already answered; advance first")]
    AlreadyAnswered,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ListService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ListServiceError {
    #[error("no valid words found in input")]
    EmptyInput,
    #[error(transparent)]
    List(#[from] ListError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the snapshot export/import service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error(transparent)]
    Word(#[from] WordError),
    #[error(transparent)]
    List(#[from] ListError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("snapshot serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
