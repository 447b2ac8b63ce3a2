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
//! Content error types

use thiserror::Error;

/// Result type alias for content operations
pub type ContentResult<T> = Result<T, ContentError>;

/// Errors raised while validating or extracting event content.
///
/// Every variant describes bad caller input; none of them is worth retrying
/// without changing the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// A required field was absent or blank
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A date field did not parse as `YYYY-MM-DD`
    #[error("invalid date in field '{field}': {value}")]
    InvalidDate {
        /// Field name as seen by the caller
        field: &'static str,
        /// Raw value that failed to parse
        value: String,
    },

    /// The title produced an empty storage slug
    #[error("title '{0}' does not produce a usable slug")]
    UnusableTitle(String),

    /// An inline image carried a payload that could not be decoded
    #[error("invalid inline image: {0}")]
    InvalidImage(String),

    /// The rich-text body could not be tokenized
    #[error("malformed body: {0}")]
    MalformedBody(String),

    /// A stored path did not follow the expected layout
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl ContentError {
    /// Create an InvalidDate error
    pub fn invalid_date(field: &'static str, value: impl Into<String>) -> Self {
        ContentError::InvalidDate {
            field,
            value: value.into(),
        }
    }

    /// Create an InvalidImage error with context
    pub fn invalid_image<S: Into<String>>(msg: S) -> Self {
        ContentError::InvalidImage(msg.into())
    }

    /// Create an InvalidPath error with context
    pub fn invalid_path<S: Into<String>>(msg: S) -> Self {
        ContentError::InvalidPath(msg.into())
    }

    /// Check if this is a MissingField error
    pub fn is_missing_field(&self) -> bool {
        matches!(self, ContentError::MissingField(_))
    }
}
