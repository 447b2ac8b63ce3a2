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
//! GitHub REST implementation of [`RemoteObjectStore`]
//!
//! Single-file operations use the contents API; batch commits use the Git
//! database API (blobs, trees, commits, refs). Every request carries the
//! bearer token, the GitHub media type and a user agent.

use crate::error::{StoreError, StoreResult};
use crate::types::{FileSnapshot, TreeEntry, TreeEntryTarget};
use crate::RemoteObjectStore;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const FILE_MODE: &str = "100644";

/// Connection settings for [`GitHubStore`]
#[derive(Clone)]
pub struct GitHubConfig {
    /// API root, e.g. `https://api.github.com`
    pub api_base_url: String,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Branch to publish to
    pub branch: String,
    /// Personal access or app token
    pub token: String,
    /// User-Agent header value
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl GitHubConfig {
    /// Settings for `owner/repo` on `api.github.com`, branch `main`
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            owner: owner.into(),
            repo: repo.into(),
            branch: "main".to_string(),
            token: token.into(),
            user_agent: concat!("kronika/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Override the API root (GitHub Enterprise or a test server)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Override the branch
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_base_url", &self.api_base_url)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Which request produced an error status; decides how 422 is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Read,
    ConditionalWrite,
    RefUpdate,
    Create,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
    #[serde(default)]
    size: u64,
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ShaResponse {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: ShaResponse,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    tree: ShaResponse,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    content: ShaResponse,
}

#[derive(Debug, Serialize)]
struct WriteRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    message: &'a str,
    sha: &'a str,
    branch: &'a str,
}

#[derive(Debug, Serialize)]
struct CommitRequest<'a> {
    message: &'a str,
    tree: &'a str,
    parents: &'a [String],
}

#[derive(Debug, Serialize)]
struct RefUpdateRequest<'a> {
    sha: &'a str,
    force: bool,
}

/// GitHub-backed store
#[derive(Clone)]
pub struct GitHubStore {
    base: Url,
    owner: String,
    repo: String,
    branch: String,
    client: reqwest::Client,
}

impl GitHubStore {
    /// Build a client for the configured repository
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidRequest`] for an unusable base URL or token.
    pub fn new(config: GitHubConfig) -> StoreResult<Self> {
        let base = Url::parse(&config.api_base_url).map_err(|e| {
            StoreError::invalid_request(format!("invalid API base URL: {e}"))
        })?;
        if base.cannot_be_a_base() {
            return Err(StoreError::invalid_request(format!(
                "API base URL cannot be a base: {base}"
            )));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| StoreError::invalid_request("token contains invalid characters"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            base,
            owner: config.owner,
            repo: config.repo,
            branch: config.branch,
            client,
        })
    }

    /// `{base}/repos/{owner}/{repo}/` followed by each `/`-separated part
    fn url(&self, parts: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(["repos", self.owner.as_str(), self.repo.as_str()]);
            for part in parts {
                segments.extend(part.split('/').filter(|s| !s.is_empty()));
            }
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        call: Call,
        what: &str,
    ) -> StoreResult<T> {
        let response = check(builder.send().await?, call, what).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::remote(None, format!("unexpected response for {what}: {e}")))
    }

    async fn blob_content(&self, sha: &str) -> StoreResult<Vec<u8>> {
        let url = self.url(&["git/blobs", sha]);
        let blob: BlobResponse = self
            .send(self.request(Method::GET, url), Call::Read, sha)
            .await?;
        decode_base64(&blob.content)
    }
}

impl fmt::Debug for GitHubStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubStore")
            .field("base", &self.base.as_str())
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .finish()
    }
}

/// Map a non-success status onto [`StoreError`]
async fn check(response: Response, call: Call, what: &str) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);

    Err(match status {
        StatusCode::NOT_FOUND => StoreError::not_found(what),
        StatusCode::CONFLICT => StoreError::conflict(format!("{what}: {message}")),
        StatusCode::UNPROCESSABLE_ENTITY
            if matches!(call, Call::ConditionalWrite | Call::RefUpdate) =>
        {
            StoreError::conflict(format!("{what}: {message}"))
        }
        _ => StoreError::remote(Some(status.as_u16()), format!("{what}: {message}")),
    })
}

fn decode_base64(encoded: &str) -> StoreResult<Vec<u8>> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| StoreError::remote(None, format!("invalid base64 from remote: {e}")))
}

fn tree_item(entry: &TreeEntry) -> Value {
    match &entry.target {
        TreeEntryTarget::Blob(sha) => json!({
            "path": entry.path, "mode": FILE_MODE, "type": "blob", "sha": sha
        }),
        TreeEntryTarget::Text(content) => json!({
            "path": entry.path, "mode": FILE_MODE, "type": "blob", "content": content
        }),
        TreeEntryTarget::Delete => json!({
            "path": entry.path, "mode": FILE_MODE, "type": "blob", "sha": Value::Null
        }),
    }
}

#[async_trait]
impl RemoteObjectStore for GitHubStore {
    fn branch(&self) -> &str {
        &self.branch
    }

    #[instrument(skip(self))]
    async fn read_file(&self, path: &str) -> StoreResult<FileSnapshot> {
        let mut url = self.url(&["contents", path]);
        url.query_pairs_mut().append_pair("ref", &self.branch);
        let file: ContentsResponse = self
            .send(self.request(Method::GET, url), Call::Read, path)
            .await?;

        // Files over 1 MB come back without inline content.
        let content = if file.encoding == "base64" || (file.content.is_empty() && file.size == 0) {
            decode_base64(&file.content)?
        } else {
            self.blob_content(&file.sha).await?
        };
        Ok(FileSnapshot {
            revision: file.sha,
            content,
        })
    }

    async fn file_revision(&self, path: &str) -> StoreResult<String> {
        let mut url = self.url(&["contents", path]);
        url.query_pairs_mut().append_pair("ref", &self.branch);
        let file: ContentsResponse = self
            .send(self.request(Method::GET, url), Call::Read, path)
            .await?;
        Ok(file.sha)
    }

    #[instrument(skip(self, content), fields(size = content.len()))]
    async fn write_file(
        &self,
        path: &str,
        content: &[u8],
        prior_revision: Option<&str>,
        message: &str,
    ) -> StoreResult<String> {
        let body = WriteRequest {
            message,
            content: STANDARD.encode(content),
            branch: &self.branch,
            sha: prior_revision,
        };
        let url = self.url(&["contents", path]);
        let written: WriteResponse = self
            .send(
                self.request(Method::PUT, url).json(&body),
                Call::ConditionalWrite,
                path,
            )
            .await?;
        Ok(written.content.sha)
    }

    #[instrument(skip(self))]
    async fn delete_file(&self, path: &str, revision: &str, message: &str) -> StoreResult<()> {
        let body = DeleteRequest {
            message,
            sha: revision,
            branch: &self.branch,
        };
        let url = self.url(&["contents", path]);
        let builder = self.request(Method::DELETE, url).json(&body);
        check(builder.send().await?, Call::ConditionalWrite, path).await?;
        Ok(())
    }

    async fn branch_tip(&self, branch: &str) -> StoreResult<String> {
        let url = self.url(&["git/ref/heads", branch]);
        let what = format!("ref heads/{branch}");
        let reference: RefResponse = self
            .send(self.request(Method::GET, url), Call::Read, &what)
            .await?;
        Ok(reference.object.sha)
    }

    async fn commit_tree(&self, commit: &str) -> StoreResult<String> {
        let url = self.url(&["git/commits", commit]);
        let what = format!("commit {commit}");
        let info: CommitResponse = self
            .send(self.request(Method::GET, url), Call::Read, &what)
            .await?;
        Ok(info.tree.sha)
    }

    async fn create_blob(&self, content: &[u8]) -> StoreResult<String> {
        let body = json!({ "content": STANDARD.encode(content), "encoding": "base64" });
        let url = self.url(&["git/blobs"]);
        let blob: ShaResponse = self
            .send(self.request(Method::POST, url).json(&body), Call::Create, "blob")
            .await?;
        Ok(blob.sha)
    }

    async fn create_tree(&self, base_tree: &str, entries: &[TreeEntry]) -> StoreResult<String> {
        let body = json!({
            "base_tree": base_tree,
            "tree": entries.iter().map(tree_item).collect::<Vec<_>>()
        });
        let url = self.url(&["git/trees"]);
        let tree: ShaResponse = self
            .send(self.request(Method::POST, url).json(&body), Call::Create, "tree")
            .await?;
        Ok(tree.sha)
    }

    async fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> StoreResult<String> {
        let body = CommitRequest {
            message,
            tree,
            parents,
        };
        let url = self.url(&["git/commits"]);
        let commit: ShaResponse = self
            .send(self.request(Method::POST, url).json(&body), Call::Create, "commit")
            .await?;
        Ok(commit.sha)
    }

    async fn update_ref(&self, branch: &str, commit: &str, force: bool) -> StoreResult<()> {
        let body = RefUpdateRequest { sha: commit, force };
        let url = self.url(&["git/refs/heads", branch]);
        let what = format!("ref heads/{branch}");
        let builder = self.request(Method::PATCH, url).json(&body);
        check(builder.send().await?, Call::RefUpdate, &what).await?;
        Ok(())
    }
}
