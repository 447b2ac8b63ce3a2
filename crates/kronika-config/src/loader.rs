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
use crate::error::{ConfigError, ConfigResult};
use crate::schema::Config;
use crate::validation::Validator;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.yaml` / `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::InvalidPath(path.to_path_buf())),
        }
    }

    /// Get format name as string
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Json => "JSON",
        }
    }
}

/// Environment variables read by [`ConfigLoader::apply_env_overrides`].
///
/// `KRONIKA_*` names win over the bare `GITHUB_*` names, which remain for
/// deployments that already export them.
pub mod env {
    /// Repository owner
    pub const OWNER: &str = "KRONIKA_GITHUB_OWNER";
    /// Repository name
    pub const REPO: &str = "KRONIKA_GITHUB_REPO";
    /// API token
    pub const TOKEN: &str = "KRONIKA_GITHUB_TOKEN";
    /// Branch
    pub const BRANCH: &str = "KRONIKA_GITHUB_BRANCH";
    /// API root
    pub const API_BASE_URL: &str = "KRONIKA_API_BASE_URL";
    /// Request timeout in seconds
    pub const TIMEOUT_SECS: &str = "KRONIKA_TIMEOUT_SECS";
    /// User-Agent
    pub const USER_AGENT: &str = "KRONIKA_USER_AGENT";
    /// Content root directory
    pub const CONTENT_ROOT: &str = "KRONIKA_CONTENT_ROOT";
    /// Category directory
    pub const CATEGORY: &str = "KRONIKA_CATEGORY";
    /// Image root directory
    pub const IMAGES_ROOT: &str = "KRONIKA_IMAGES_ROOT";
    /// Public image prefix
    pub const PUBLIC_PREFIX: &str = "KRONIKA_PUBLIC_PREFIX";
    /// Log filter
    pub const LOG_LEVEL: &str = "KRONIKA_LOG_LEVEL";
    /// Log format
    pub const LOG_FORMAT: &str = "KRONIKA_LOG_FORMAT";

    /// Fallback owner
    pub const LEGACY_OWNER: &str = "GITHUB_OWNER";
    /// Fallback repository
    pub const LEGACY_REPO: &str = "GITHUB_REPO";
    /// Fallback token
    pub const LEGACY_TOKEN: &str = "GITHUB_TOKEN";
}

/// Configuration loader
#[derive(Debug, Clone, Copy)]
pub struct ConfigLoader {
    validate: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        ConfigLoader { validate: true }
    }

    /// Create a loader without validation
    pub fn without_validation() -> Self {
        ConfigLoader { validate: false }
    }

    /// Full pipeline: optional file, then environment, then validation.
    ///
    /// With `path` of `None` the defaults are the starting point, so the
    /// environment alone can configure everything.
    pub async fn load(&self, path: Option<&Path>) -> ConfigResult<Config> {
        let mut config = match path {
            Some(path) => self.parse_file(path).await?,
            None => {
                debug!("No configuration file given, starting from defaults");
                Config::default()
            }
        };
        self.apply_env_overrides(&mut config)?;
        self.check(&config)?;
        Ok(config)
    }

    /// Load configuration from a file, without environment overrides
    pub async fn load_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let config = self.parse_file(path.as_ref()).await?;
        self.check(&config)?;
        Ok(config)
    }

    /// Load configuration from a string
    pub fn load_from_string(&self, content: &str, format: ConfigFormat) -> ConfigResult<Config> {
        let config = parse(content, format)?;
        self.check(&config)?;
        Ok(config)
    }

    async fn parse_file(&self, path: &Path) -> ConfigResult<Config> {
        debug!("Loading configuration from: {}", path.display());
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path).await?;
        let config = parse(&content, format)?;
        info!(
            "Loaded {} configuration file: {}",
            format.name(),
            path.display()
        );
        Ok(config)
    }

    fn check(&self, config: &Config) -> ConfigResult<()> {
        if self.validate {
            config.validate()?;
            debug!("Configuration validated successfully");
        }
        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&self, config: &mut Config) -> ConfigResult<()> {
        self.apply_overrides_from(config, |name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable lookup
    pub fn apply_overrides_from<F>(&self, config: &mut Config, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |primary: &str, fallback: Option<&str>| {
            lookup(primary)
                .or_else(|| fallback.and_then(&lookup))
                .filter(|v| !v.is_empty())
        };

        // Remote settings
        if let Some(value) = var(env::OWNER, Some(env::LEGACY_OWNER)) {
            config.remote.owner = value;
        }
        if let Some(value) = var(env::REPO, Some(env::LEGACY_REPO)) {
            config.remote.repo = value;
        }
        if let Some(value) = var(env::TOKEN, Some(env::LEGACY_TOKEN)) {
            config.remote.token = Some(value);
        }
        if let Some(value) = var(env::BRANCH, None) {
            config.remote.branch = value;
        }
        if let Some(value) = var(env::API_BASE_URL, None) {
            config.remote.api_base_url = value;
        }
        if let Some(value) = var(env::TIMEOUT_SECS, None) {
            config.remote.timeout_secs = value.parse().map_err(|_| {
                ConfigError::env_var_parsing_error(
                    env::TIMEOUT_SECS,
                    &value,
                    "expected a whole number of seconds",
                )
            })?;
        }
        if let Some(value) = var(env::USER_AGENT, None) {
            config.remote.user_agent = value;
        }

        // Content layout
        if let Some(value) = var(env::CONTENT_ROOT, None) {
            config.content.content_root = value;
        }
        if let Some(value) = var(env::CATEGORY, None) {
            config.content.category = value;
        }
        if let Some(value) = var(env::IMAGES_ROOT, None) {
            config.content.images_root = value;
        }
        if let Some(value) = var(env::PUBLIC_PREFIX, None) {
            config.content.public_prefix = value;
        }

        // Observability settings
        if let Some(value) = var(env::LOG_LEVEL, None) {
            config.observability.log_level = value;
        }
        if let Some(value) = var(env::LOG_FORMAT, None) {
            config.observability.log_format = value.parse().map_err(|_| {
                ConfigError::env_var_parsing_error(
                    env::LOG_FORMAT,
                    &value,
                    "expected 'pretty', 'compact' or 'json'",
                )
            })?;
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse(content: &str, format: ConfigFormat) -> ConfigResult<Config> {
    let config = match format {
        ConfigFormat::Toml => toml::from_str(content)?,
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Json => serde_json::from_str(content)?,
    };
    debug!("Configuration parsed from {}", format.name());
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use kronika_observability::LogFormat;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ConfigFormat::from_path("kronika.toml").unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path("kronika.yaml").unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path("kronika.yml").unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path("kronika.json").unwrap(), ConfigFormat::Json);
    }

    #[test]
    fn test_format_detection_error() {
        assert!(matches!(
            ConfigFormat::from_path("kronika.ini"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            ConfigFormat::from_path("kronika"),
            Err(ConfigError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
        [remote]
        owner = "szkola"
        repo = "strona"

        [content]
        category = "wydarzenia"
        "#;
        let config = ConfigLoader::new()
            .load_from_string(toml, ConfigFormat::Toml)
            .unwrap();
        assert_eq!(config.remote.slug(), "szkola/strona");
        assert_eq!(config.remote.branch, "main");
        assert_eq!(config.content.category, "wydarzenia");
        assert_eq!(config.content.images_root, "public/images");
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = "remote:\n  owner: szkola\n  timeout_secs: 5\nobservability:\n  log_format: json\n";
        let config = ConfigLoader::new()
            .load_from_string(yaml, ConfigFormat::Yaml)
            .unwrap();
        assert_eq!(config.remote.timeout_secs, 5);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"remote": {"repo": "strona", "branch": "gh-pages"}}"#;
        let config = ConfigLoader::new()
            .load_from_string(json, ConfigFormat::Json)
            .unwrap();
        assert_eq!(config.remote.branch, "gh-pages");
    }

    #[test]
    fn test_validation_can_be_skipped() {
        let json = r#"{"remote": {"timeout_secs": 0}}"#;
        assert!(ConfigLoader::new()
            .load_from_string(json, ConfigFormat::Json)
            .is_err());
        assert!(ConfigLoader::without_validation()
            .load_from_string(json, ConfigFormat::Json)
            .is_ok());
    }

    #[test]
    fn test_kronika_names_win_over_legacy() {
        let mut config = Config::default();
        ConfigLoader::new()
            .apply_overrides_from(
                &mut config,
                lookup(&[
                    ("GITHUB_OWNER", "legacy"),
                    ("KRONIKA_GITHUB_OWNER", "szkola"),
                    ("GITHUB_REPO", "strona"),
                    ("GITHUB_TOKEN", "ghp_legacy"),
                ]),
            )
            .unwrap();
        assert_eq!(config.remote.owner, "szkola");
        assert_eq!(config.remote.repo, "strona");
        assert_eq!(config.remote.token.as_deref(), Some("ghp_legacy"));
        assert!(config.remote.require_credentials().is_ok());
    }

    #[test]
    fn test_empty_variables_are_ignored() {
        let mut config = Config::default();
        ConfigLoader::new()
            .apply_overrides_from(&mut config, lookup(&[("KRONIKA_GITHUB_BRANCH", "")]))
            .unwrap();
        assert_eq!(config.remote.branch, "main");
    }

    #[test]
    fn test_bad_numeric_override() {
        let mut config = Config::default();
        let err = ConfigLoader::new()
            .apply_overrides_from(&mut config, lookup(&[("KRONIKA_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarParsingError { .. }));
    }

    #[test]
    fn test_log_format_override() {
        let mut config = Config::default();
        ConfigLoader::new()
            .apply_overrides_from(&mut config, lookup(&[("KRONIKA_LOG_FORMAT", "JSON")]))
            .unwrap();
        assert_eq!(config.observability.log_format, LogFormat::Json);

        let err = ConfigLoader::new()
            .apply_overrides_from(&mut config, lookup(&[("KRONIKA_LOG_FORMAT", "xml")]))
            .unwrap_err();
        assert!(err.to_string().contains("KRONIKA_LOG_FORMAT"));
    }
}
