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
//! Store error types and utilities

use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while talking to the remote store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Path, ref or object does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Revision tag mismatch or non-fast-forward ref update
    #[error("conflict: {0}")]
    Conflict(String),

    /// The request was rejected before reaching the remote
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other failure reported by the remote or the transport.
    ///
    /// `status` is `None` when no HTTP response was received.
    #[error("remote error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Remote {
        /// HTTP status, if a response arrived
        status: Option<u16>,
        /// Remote message or transport error text
        message: String,
    },
}

impl StoreError {
    /// Create a NotFound error for a path or object
    pub fn not_found<S: Into<String>>(what: S) -> Self {
        StoreError::NotFound(what.into())
    }

    /// Create a Conflict error with context
    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        StoreError::Conflict(msg.into())
    }

    /// Create an InvalidRequest error with context
    pub fn invalid_request<S: Into<String>>(msg: S) -> Self {
        StoreError::InvalidRequest(msg.into())
    }

    /// Create a Remote error
    pub fn remote<S: Into<String>>(status: Option<u16>, msg: S) -> Self {
        StoreError::Remote {
            status,
            message: msg.into(),
        }
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// Check if this is a Conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }

    /// Whether retrying the same request later may succeed.
    ///
    /// True for transport failures, rate limiting (429) and server errors
    /// (5xx). Auth failures and other 4xx responses are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Remote { status: None, .. } => true,
            StoreError::Remote {
                status: Some(code), ..
            } => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Remote {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = StoreError::not_found("content/a.json");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: content/a.json");
    }

    #[test]
    fn test_remote_display() {
        let err = StoreError::remote(Some(503), "unavailable");
        assert_eq!(err.to_string(), "remote error (HTTP 503): unavailable");
        let err = StoreError::remote(None, "connection reset");
        assert_eq!(err.to_string(), "remote error: connection reset");
    }

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::remote(Some(429), "slow down").is_transient());
        assert!(StoreError::remote(Some(502), "bad gateway").is_transient());
        assert!(StoreError::remote(None, "timeout").is_transient());
        assert!(!StoreError::remote(Some(401), "bad credentials").is_transient());
        assert!(!StoreError::conflict("stale sha").is_transient());
    }
}
