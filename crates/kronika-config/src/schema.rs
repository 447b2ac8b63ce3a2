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
//! Configuration schema.
//!
//! Every section has defaults, so an empty file (or no file at all) is a
//! valid starting point; credentials usually come from the environment.

use kronika_observability::LogFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote repository settings
    pub remote: RemoteConfig,

    /// Repository layout for documents and images
    pub content: ContentConfig,

    /// Logging settings
    pub observability: ObservabilityConfig,
}

/// GitHub repository the events are published to
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Repository owner (user or organisation)
    pub owner: String,

    /// Repository name
    pub repo: String,

    /// Branch events are committed to
    pub branch: String,

    /// API token; prefer the environment over files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// REST API root
    pub api_base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// User-Agent header value
    pub user_agent: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            owner: String::new(),
            repo: String::new(),
            branch: "main".to_string(),
            token: None,
            api_base_url: "https://api.github.com".to_string(),
            timeout_secs: 30,
            user_agent: format!("kronika/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl RemoteConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `owner/repo`
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Where documents and images live in the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Root directory for event documents
    pub content_root: String,

    /// Category directory under the content root
    pub category: String,

    /// Root directory for stored images
    pub images_root: String,

    /// URL prefix images are served under
    pub public_prefix: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        ContentConfig {
            content_root: "content".to_string(),
            category: "aktualnosci".to_string(),
            images_root: "public/images".to_string(),
            public_prefix: "/images".to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Filter directive; empty defers to `RUST_LOG`
    pub log_level: String,

    /// Output format
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        ObservabilityConfig {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
