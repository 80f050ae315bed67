//! Flashcard error types

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::models::ReviewStats;

/// Errors that can occur in the flashcard engine
#[derive(Debug, Error)]
pub enum FlashcardError {
    #[error("Card not found: {0}")]
    CardNotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("No cards due for review")]
    NoCardsDue { stats: ReviewStats },

    #[error("No cards tagged with all of: {}", tags.join(", "))]
    NoTagMatch { tags: Vec<String>, stats: ReviewStats },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Coarse failure category handed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    NotFound,
    Validation,
    NoCardsDue,
    NoTagMatch,
    Io,
}

impl FlashcardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CardNotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::NoCardsDue { .. } => ErrorKind::NoCardsDue,
            Self::NoTagMatch { .. } => ErrorKind::NoTagMatch,
            Self::Io(_) | Self::Json(_) | Self::Corrupt { .. } => ErrorKind::Io,
        }
    }

    /// Stats carried by the "nothing to review" outcomes
    pub fn stats(&self) -> Option<&ReviewStats> {
        match self {
            Self::NoCardsDue { stats } | Self::NoTagMatch { stats, .. } => Some(stats),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FlashcardError>;
