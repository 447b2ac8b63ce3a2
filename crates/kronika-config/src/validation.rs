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
//! Configuration validation

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{Config, ContentConfig, ObservabilityConfig, RemoteConfig};

const MAX_TIMEOUT_SECS: u64 = 600;
const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Trait for validating configuration sections
pub trait Validator {
    /// Validate the configuration
    fn validate(&self) -> ConfigResult<()>;
}

impl Validator for Config {
    fn validate(&self) -> ConfigResult<()> {
        self.remote.validate()?;
        self.content.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}

impl Validator for RemoteConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.branch.trim().is_empty() {
            return Err(ConfigError::missing("remote.branch"));
        }
        if !(self.api_base_url.starts_with("https://") || self.api_base_url.starts_with("http://"))
        {
            return Err(ConfigError::invalid_value(
                "remote.api_base_url",
                format!("must be an http(s) URL, got '{}'", self.api_base_url),
            ));
        }
        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::invalid_value(
                "remote.timeout_secs",
                format!(
                    "must be between 1 and {MAX_TIMEOUT_SECS}, got {}",
                    self.timeout_secs
                ),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::missing("remote.user_agent"));
        }
        for (field, value) in [("remote.owner", &self.owner), ("remote.repo", &self.repo)] {
            if value.contains('/') || value.chars().any(char::is_whitespace) {
                return Err(ConfigError::invalid_value(
                    field,
                    format!("must be a single path segment, got '{value}'"),
                ));
            }
        }
        Ok(())
    }
}

impl RemoteConfig {
    /// Check the fields needed to talk to the remote are present.
    ///
    /// Separate from [`Validator::validate`] so offline commands work without
    /// credentials.
    pub fn require_credentials(&self) -> ConfigResult<()> {
        if self.owner.trim().is_empty() {
            return Err(ConfigError::missing("remote.owner"));
        }
        if self.repo.trim().is_empty() {
            return Err(ConfigError::missing("remote.repo"));
        }
        match &self.token {
            Some(token) if !token.trim().is_empty() => Ok(()),
            _ => Err(ConfigError::missing("remote.token")),
        }
    }
}

impl Validator for ContentConfig {
    fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("content.content_root", &self.content_root),
            ("content.category", &self.category),
            ("content.images_root", &self.images_root),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::missing(field));
            }
            if value.starts_with('/') || value.ends_with('/') || value.split('/').any(|s| s == "..")
            {
                return Err(ConfigError::invalid_value(
                    field,
                    format!("must be a relative path without '..' or edge slashes, got '{value}'"),
                ));
            }
        }
        if !self.public_prefix.starts_with('/') || self.public_prefix.ends_with('/') {
            return Err(ConfigError::invalid_value(
                "content.public_prefix",
                format!(
                    "must start with '/' and not end with one, got '{}'",
                    self.public_prefix
                ),
            ));
        }
        Ok(())
    }
}

impl Validator for ObservabilityConfig {
    fn validate(&self) -> ConfigResult<()> {
        let level = self.log_level.trim();
        // Directives like `kronika_store=debug` are left to the filter parser.
        if !level.is_empty() && !level.contains('=') && !LOG_LEVELS.contains(&level) {
            return Err(ConfigError::invalid_value(
                "observability.log_level",
                format!("must be one of: {}", LOG_LEVELS.join(", ")),
            ));
        }
        Ok(())
    }
}
