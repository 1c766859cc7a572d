use thiserror::Error;

use crate::model::Id;

/// Failure of a remote call or a local lookup performed by the sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The response did not have any shape the normalizer accepts.
    #[error("{0}")]
    ShapeMismatch(String),
    /// The server answered with `success: false`.
    #[error("{0}")]
    Rejected(String),
    #[error("{message}")]
    Transport { status: Option<u16>, message: String },
    #[error("session expired, please sign in again")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl SyncError {
    pub fn transport(message: impl Into<String>) -> Self {
        SyncError::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        SyncError::Transport {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn not_found(kind: &str, id: Id) -> Self {
        SyncError::NotFound(format!("{kind} {id} is not loaded"))
    }

    /// Stable label used in logs and telemetry.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::ShapeMismatch(_) => "shape-mismatch",
            SyncError::Rejected(_) => "rejected",
            SyncError::Transport { .. } => "transport",
            SyncError::Unauthorized => "unauthorized",
            SyncError::NotFound(_) => "not-found",
            SyncError::Decode(_) => "decode",
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Decode(err.to_string())
    }
}

pub type SyncResult<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(SyncError::Rejected("list is locked".into()).to_string(), "list is locked");
        assert_eq!(SyncError::status(502, "bad gateway").to_string(), "bad gateway");
        assert_eq!(
            SyncError::not_found("task group", 9).to_string(),
            "task group 9 is not loaded"
        );
        assert_eq!(SyncError::Unauthorized.kind(), "unauthorized");
    }
}
