// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Publishing errors

use kronika_content::ContentError;
use kronika_store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for publishing operations
pub type PublishResult<T> = Result<T, PublishError>;

/// Stable error classes callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad or missing input; never worth retrying unchanged
    Validation,
    /// The event does not exist
    NotFound,
    /// Someone else changed the event or branch first; retry the operation
    Conflict,
    /// Any other store failure
    Remote,
}

impl ErrorKind {
    /// Machine-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Remote => "remote",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by every [`EventPublisher`](crate::EventPublisher) operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Input failed validation or content extraction
    #[error("invalid event: {0}")]
    Validation(#[from] ContentError),

    /// No event document at the given path
    #[error("event not found: {0}")]
    NotFound(String),

    /// A revision tag or branch tip was stale
    #[error("conflicting change: {0}")]
    Conflict(String),

    /// The stored document exists but cannot be read as an event
    #[error("stored event at {path} is unreadable: {reason}")]
    CorruptDocument {
        /// Document path
        path: String,
        /// Decoder message
        reason: String,
    },

    /// Other store failure
    #[error("remote store failed: {0}")]
    Remote(StoreError),
}

impl PublishError {
    /// Create a CorruptDocument error
    pub fn corrupt<S: Into<String>>(path: S, reason: impl std::fmt::Display) -> Self {
        PublishError::CorruptDocument {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Stable class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PublishError::Validation(_) => ErrorKind::Validation,
            PublishError::NotFound(_) => ErrorKind::NotFound,
            PublishError::Conflict(_) => ErrorKind::Conflict,
            PublishError::CorruptDocument { .. } | PublishError::Remote(_) => ErrorKind::Remote,
        }
    }

    /// HTTP status reported by the remote, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            PublishError::Remote(StoreError::Remote { status, .. }) => *status,
            _ => None,
        }
    }

    /// Whether retrying later without changes may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, PublishError::Remote(err) if err.is_transient())
    }
}

impl From<StoreError> for PublishError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => PublishError::NotFound(what),
            StoreError::Conflict(msg) => PublishError::Conflict(msg),
            other => PublishError::Remote(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_kinds() {
        assert_eq!(
            PublishError::from(StoreError::not_found("a.json")).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            PublishError::from(StoreError::conflict("stale")).kind(),
            ErrorKind::Conflict
        );
        let remote = PublishError::from(StoreError::remote(Some(503), "down"));
        assert_eq!(remote.kind(), ErrorKind::Remote);
        assert_eq!(remote.status(), Some(503));
        assert!(remote.is_transient());
    }

    #[test]
    fn test_validation_kind() {
        let err = PublishError::from(ContentError::MissingField("title"));
        assert_eq!(err.kind().as_str(), "validation");
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "invalid event: missing required field: title");
    }

    #[test]
    fn test_corrupt_document_is_permanent_remote() {
        let err = PublishError::corrupt("content/a.json", "expected value");
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert!(!err.is_transient());
        assert_eq!(err.status(), None);
    }
}
