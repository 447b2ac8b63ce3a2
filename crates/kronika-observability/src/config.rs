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
//! Logging configuration.
//!
//! Output format, filter and decoration options for the process-wide
//! tracing subscriber.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default filter when neither the config nor `RUST_LOG` sets one
pub const DEFAULT_LEVEL: &str = "info";

/// Errors that can occur while setting up logging
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    /// Unknown output format name
    #[error("unknown log format '{0}', expected one of: pretty, compact, json")]
    InvalidFormat(String),

    /// Filter directive that `EnvFilter` rejects
    #[error("invalid log filter '{filter}': {reason}")]
    InvalidFilter {
        /// Directive as given
        filter: String,
        /// Parser message
        reason: String,
    },

    /// A global subscriber was already installed
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Output format for logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, human-oriented output
    #[default]
    Pretty,

    /// Single-line output
    Compact,

    /// One JSON object per event, for log shippers
    Json,
}

impl LogFormat {
    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        }
    }
}

impl FromStr for LogFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(LogError::InvalidFormat(s.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output destination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogOutput {
    /// Standard error; keeps stdout free for command output
    #[default]
    Stderr,

    /// Standard output
    Stdout,
}

/// Configuration for logging
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output format
    pub format: LogFormat,

    /// Filter directive (e.g. `info`, `kronika_store=debug`).
    /// `None` defers to `RUST_LOG`, then [`DEFAULT_LEVEL`].
    pub level: Option<String>,

    /// ANSI colors (ignored by JSON)
    pub use_color: bool,

    /// Timestamps on every line
    pub use_timestamps: bool,

    /// Module path of each event
    pub include_targets: bool,

    /// Emit an event when a span closes, with its duration
    pub span_timings: bool,

    /// Destination
    pub output: LogOutput,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Pretty,
            level: None,
            use_color: true,
            use_timestamps: true,
            include_targets: true,
            span_timings: false,
            output: LogOutput::Stderr,
        }
    }
}

impl LogConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the filter directive
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Enable or disable color output
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Enable or disable timestamps
    pub fn with_timestamps(mut self, use_timestamps: bool) -> Self {
        self.use_timestamps = use_timestamps;
        self
    }

    /// Enable or disable target module names
    pub fn with_targets(mut self, include_targets: bool) -> Self {
        self.include_targets = include_targets;
        self
    }

    /// Enable or disable span close events
    pub fn with_span_timings(mut self, span_timings: bool) -> Self {
        self.span_timings = span_timings;
        self
    }

    /// Set the output destination
    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Filter from config, else `RUST_LOG`, else [`DEFAULT_LEVEL`]
    pub fn effective_level(&self) -> String {
        self.level
            .clone()
            .filter(|l| !l.trim().is_empty())
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
    }
}
