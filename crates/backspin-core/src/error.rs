use thiserror::Error;

use crate::model::{ReviewStatus, TargetKind};

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid rating: {field} must be between 1 and 10, got {value}")]
    InvalidRating { field: &'static str, value: u8 },

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("target not found: {kind} with id {id}")]
    TargetNotFound { kind: TargetKind, id: String },

    #[error("forbidden: actor may not {action}")]
    Forbidden { action: &'static str },

    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid transition: review is {from}, cannot become {to}")]
    InvalidTransition { from: ReviewStatus, to: ReviewStatus },

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("already exists: {entity} {key}")]
    AlreadyExists { entity: &'static str, key: String },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` for errors caused by the caller's input or identity
    /// rather than by the storage layer.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::Database(_) | Self::Io(_) | Self::Serialization(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_rating_names_field() {
        let err = Error::InvalidRating {
            field: "rhymes",
            value: 11,
        };
        assert_eq!(
            err.to_string(),
            "invalid rating: rhymes must be between 1 and 10, got 11"
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(Error::Forbidden { action: "edit review" }.is_client_error());
        assert!(Error::InvalidTransition {
            from: ReviewStatus::Approved,
            to: ReviewStatus::Rejected,
        }
        .is_client_error());
        assert!(!Error::Database(rusqlite::Error::QueryReturnedNoRows).is_client_error());
    }
}
