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
//! Configuration discovery and publisher construction shared by commands.

use anyhow::{Context as _, Result};
use kronika_config::{Config, ConfigLoader, ContentConfig, RemoteConfig};
use kronika_content::AssetNamer;
use kronika_publisher::EventPublisher;
use kronika_store::{GitHubConfig, GitHubStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// File names looked up in the working directory when `--config` is absent.
pub const CONFIG_CANDIDATES: [&str; 4] =
    ["kronika.toml", "kronika.yaml", "kronika.yml", "kronika.json"];

/// Find a configuration file in `dir`, if one exists.
pub fn discover_config(dir: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Load configuration from an explicit path, a discovered file or the
/// environment alone.
pub async fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let discovered = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => std::env::current_dir()
            .ok()
            .and_then(|dir| discover_config(&dir)),
    };
    if let Some(path) = &discovered {
        debug!("Using configuration file {}", path.display());
    }
    ConfigLoader::new()
        .load(discovered.as_deref())
        .await
        .context("Failed to load configuration")
}

/// Repository layout from the content settings
pub fn namer(content: &ContentConfig) -> AssetNamer {
    AssetNamer::new(
        &content.content_root,
        &content.category,
        &content.images_root,
        &content.public_prefix,
    )
}

/// Build a publisher talking to the configured GitHub repository.
pub fn publisher(config: &Config) -> Result<EventPublisher> {
    config
        .remote
        .require_credentials()
        .context("GitHub repository is not configured")?;
    let store = GitHubStore::new(github_config(&config.remote))
        .context("Failed to create GitHub client")?;
    debug!(
        repository = %config.remote.slug(),
        branch = %config.remote.branch,
        "GitHub client ready"
    );
    Ok(EventPublisher::new(Arc::new(store)).with_namer(namer(&config.content)))
}

fn github_config(remote: &RemoteConfig) -> GitHubConfig {
    let token = remote.token.clone().unwrap_or_default();
    let mut github = GitHubConfig::new(&remote.owner, &remote.repo, token)
        .with_api_base_url(&remote.api_base_url)
        .with_branch(&remote.branch)
        .with_timeout(remote.timeout());
    github.user_agent = remote.user_agent.clone();
    github
}
