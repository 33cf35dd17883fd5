//! Boundary error type and its coarse classification for callers.

use crate::agent::GenerationError;
use crate::config::ConfigError;
use crate::content::InputError;
use crate::extractor::ExtractionError;
use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GistError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("Failed to extract content: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("Failed to generate gist: {0}")]
    Generation(#[from] GenerationError),
}

/// What the caller should make of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request itself was wrong; retrying it unchanged will not help
    InvalidInput,
    /// The service is missing credentials or settings
    Configuration,
    /// Extraction or generation failed
    Internal,
}

impl GistError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GistError::Input(_) | GistError::Extraction(ExtractionError::Input(_)) => {
                ErrorKind::InvalidInput
            }
            GistError::Configuration(_) => ErrorKind::Configuration,
            GistError::Extraction(_) | GistError::Generation(_) => ErrorKind::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Configuration | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
