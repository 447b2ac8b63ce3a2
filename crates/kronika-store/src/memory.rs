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
//! In-memory Git object store
//!
//! A small content-addressed object database: blobs, flat trees, commits and
//! branch refs, all keyed by sha256-derived ids. It enforces the same rules as
//! the real remote (revision tags, fast-forward-only refs) so publishing logic
//! can be tested without a network.
//!
//! Failure injection hooks let tests reproduce the awkward cases:
//!
//! - [`MemoryStore::fail_next_ref_update`]: the next `update_ref` fails with a
//!   server error, after all objects were created
//! - [`MemoryStore::advance_branch_concurrently`]: another writer moves the
//!   branch right before the next `update_ref`
//! - [`MemoryStore::fail_deletes_for`]: single-file deletes of a path fail
//!
//! ```rust,no_run
//! use kronika_store::{MemoryStore, RemoteObjectStore};
//!
//! #[tokio::main]
//! async fn main() -> kronika_store::StoreResult<()> {
//!     let store = MemoryStore::new();
//!     let tag = store.write_file("a.txt", b"one", None, "create").await?;
//!     store.write_file("a.txt", b"two", Some(&tag), "update").await?;
//!     assert_eq!(store.read_file("a.txt").await?.content, b"two");
//!     Ok(())
//! }
//! ```

use crate::error::{StoreError, StoreResult};
use crate::types::{FileSnapshot, TreeEntry, TreeEntryTarget};
use crate::RemoteObjectStore;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Clone)]
struct StoredCommit {
    tree: String,
    parents: Vec<String>,
    message: String,
}

#[derive(Default)]
struct Repository {
    blobs: HashMap<String, Vec<u8>>,
    trees: HashMap<String, BTreeMap<String, String>>,
    commits: HashMap<String, StoredCommit>,
    refs: HashMap<String, String>,
    sequence: u64,
    fail_next_ref_update: bool,
    race_branch: Option<String>,
    failing_deletes: HashSet<String>,
}

impl Repository {
    fn put_blob(&mut self, content: &[u8]) -> String {
        let sha = object_id("blob", content);
        self.blobs
            .entry(sha.clone())
            .or_insert_with(|| content.to_vec());
        sha
    }

    fn put_tree(&mut self, tree: BTreeMap<String, String>) -> String {
        let mut encoded = Vec::new();
        for (path, blob) in &tree {
            encoded.extend_from_slice(path.as_bytes());
            encoded.push(0);
            encoded.extend_from_slice(blob.as_bytes());
            encoded.push(b'\n');
        }
        let sha = object_id("tree", &encoded);
        self.trees.entry(sha.clone()).or_insert(tree);
        sha
    }

    fn put_commit(&mut self, message: &str, tree: &str, parents: &[String]) -> String {
        self.sequence += 1;
        let encoded = format!(
            "tree {tree}\nparents {}\nseq {}\n\n{message}",
            parents.join(" "),
            self.sequence
        );
        let sha = object_id("commit", encoded.as_bytes());
        self.commits.insert(
            sha.clone(),
            StoredCommit {
                tree: tree.to_string(),
                parents: parents.to_vec(),
                message: message.to_string(),
            },
        );
        sha
    }

    fn tip(&self, branch: &str) -> StoreResult<&String> {
        self.refs
            .get(branch)
            .ok_or_else(|| StoreError::not_found(format!("ref heads/{branch}")))
    }

    fn tree_of(&self, commit: &str) -> StoreResult<&BTreeMap<String, String>> {
        let stored = self
            .commits
            .get(commit)
            .ok_or_else(|| StoreError::not_found(format!("commit {commit}")))?;
        self.trees
            .get(&stored.tree)
            .ok_or_else(|| StoreError::not_found(format!("tree {}", stored.tree)))
    }

    fn branch_files(&self, branch: &str) -> StoreResult<BTreeMap<String, String>> {
        let tip = self.tip(branch)?.clone();
        Ok(self.tree_of(&tip)?.clone())
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        let mut queue = vec![descendant.to_string()];
        let mut seen = HashSet::new();
        while let Some(sha) = queue.pop() {
            if sha == ancestor {
                return true;
            }
            if !seen.insert(sha.clone()) {
                continue;
            }
            if let Some(commit) = self.commits.get(&sha) {
                queue.extend(commit.parents.iter().cloned());
            }
        }
        false
    }

    fn move_ref(&mut self, branch: &str, commit: &str, force: bool) -> StoreResult<()> {
        if !self.commits.contains_key(commit) {
            return Err(StoreError::invalid_request(format!(
                "unknown commit {commit}"
            )));
        }
        let current = self.tip(branch)?.clone();
        if !force && !self.is_ancestor(&current, commit) {
            return Err(StoreError::conflict(format!(
                "update of heads/{branch} is not a fast forward"
            )));
        }
        self.refs.insert(branch.to_string(), commit.to_string());
        Ok(())
    }

    /// Commit `files` as the new state of `branch` on top of its tip
    fn commit_files(
        &mut self,
        branch: &str,
        files: BTreeMap<String, String>,
        message: &str,
    ) -> StoreResult<()> {
        let parent = self.tip(branch)?.clone();
        let tree = self.put_tree(files);
        let commit = self.put_commit(message, &tree, &[parent]);
        self.move_ref(branch, &commit, false)
    }
}

fn object_id(kind: &str, content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{kind} {}\0", content.len()).as_bytes());
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// In-memory [`RemoteObjectStore`] for tests
///
/// Cheap to clone; clones share the same repository.
#[derive(Clone)]
pub struct MemoryStore {
    branch: String,
    repo: Arc<RwLock<Repository>>,
}

impl MemoryStore {
    /// Repository with an empty initial commit on `main`
    pub fn new() -> Self {
        Self::with_branch(DEFAULT_BRANCH)
    }

    /// Repository with an empty initial commit on `branch`
    pub fn with_branch(branch: impl Into<String>) -> Self {
        let branch = branch.into();
        let mut repo = Repository::default();
        let tree = repo.put_tree(BTreeMap::new());
        let root = repo.put_commit("Initial commit", &tree, &[]);
        repo.refs.insert(branch.clone(), root);
        Self {
            branch,
            repo: Arc::new(RwLock::new(repo)),
        }
    }

    /// Make the next `update_ref` fail with a server error
    pub async fn fail_next_ref_update(&self) {
        self.repo.write().await.fail_next_ref_update = true;
    }

    /// Move `branch` with an unrelated commit right before the next
    /// `update_ref` on it, as if another writer won the race.
    ///
    /// The racing commit adds `concurrent.txt`.
    pub async fn advance_branch_concurrently(&self, branch: &str) {
        self.repo.write().await.race_branch = Some(branch.to_string());
    }

    /// Make every single-file delete of `path` fail with a server error
    pub async fn fail_deletes_for(&self, path: &str) {
        self.repo
            .write()
            .await
            .failing_deletes
            .insert(path.to_string());
    }

    /// Current tip of `branch`
    pub async fn tip(&self, branch: &str) -> StoreResult<String> {
        self.repo.read().await.tip(branch).cloned()
    }

    /// Number of commit objects, reachable or not
    pub async fn commit_count(&self) -> usize {
        self.repo.read().await.commits.len()
    }

    /// Number of commits reachable from `branch` by first parents
    pub async fn history_len(&self, branch: &str) -> StoreResult<usize> {
        let repo = self.repo.read().await;
        let mut next = Some(repo.tip(branch)?.clone());
        let mut len = 0;
        while let Some(sha) = next {
            len += 1;
            next = repo
                .commits
                .get(&sha)
                .and_then(|c| c.parents.first().cloned());
        }
        Ok(len)
    }

    /// Message of the tip commit of `branch`
    pub async fn tip_message(&self, branch: &str) -> StoreResult<String> {
        let repo = self.repo.read().await;
        let tip = repo.tip(branch)?;
        Ok(repo
            .commits
            .get(tip)
            .map(|c| c.message.clone())
            .unwrap_or_default())
    }

    /// Sorted paths present on the configured branch
    pub async fn paths(&self) -> StoreResult<Vec<String>> {
        let repo = self.repo.read().await;
        Ok(repo.branch_files(&self.branch)?.into_keys().collect())
    }

    /// Raw blob content by sha
    pub async fn blob(&self, sha: &str) -> StoreResult<Vec<u8>> {
        self.repo
            .read()
            .await
            .blobs
            .get(sha)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("blob {sha}")))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("branch", &self.branch)
            .field("repo", &"<in-memory>")
            .finish()
    }
}

#[async_trait]
impl RemoteObjectStore for MemoryStore {
    fn branch(&self) -> &str {
        &self.branch
    }

    async fn read_file(&self, path: &str) -> StoreResult<FileSnapshot> {
        let repo = self.repo.read().await;
        let files = repo.tree_of(repo.tip(&self.branch)?)?;
        let revision = files
            .get(path)
            .ok_or_else(|| StoreError::not_found(path))?
            .clone();
        let content = repo
            .blobs
            .get(&revision)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("blob {revision}")))?;
        Ok(FileSnapshot { revision, content })
    }

    async fn write_file(
        &self,
        path: &str,
        content: &[u8],
        prior_revision: Option<&str>,
        message: &str,
    ) -> StoreResult<String> {
        if path.is_empty() {
            return Err(StoreError::invalid_request("path cannot be empty"));
        }
        let mut repo = self.repo.write().await;
        let mut files = repo.branch_files(&self.branch)?;
        match (files.get(path), prior_revision) {
            (Some(_), None) => {
                return Err(StoreError::conflict(format!(
                    "{path} exists; a revision tag is required"
                )))
            }
            (Some(current), Some(prior)) if current != prior => {
                return Err(StoreError::conflict(format!(
                    "{path} is at {current}, not {prior}"
                )))
            }
            (None, Some(prior)) => {
                return Err(StoreError::conflict(format!(
                    "{path} no longer exists at {prior}"
                )))
            }
            _ => {}
        }
        let blob = repo.put_blob(content);
        files.insert(path.to_string(), blob.clone());
        let branch = self.branch.clone();
        repo.commit_files(&branch, files, message)?;
        Ok(blob)
    }

    async fn delete_file(&self, path: &str, revision: &str, message: &str) -> StoreResult<()> {
        let mut repo = self.repo.write().await;
        if repo.failing_deletes.contains(path) {
            return Err(StoreError::remote(Some(500), "injected delete failure"));
        }
        let mut files = repo.branch_files(&self.branch)?;
        match files.remove(path) {
            None => return Err(StoreError::not_found(path)),
            Some(current) if current != revision => {
                return Err(StoreError::conflict(format!(
                    "{path} is at {current}, not {revision}"
                )))
            }
            Some(_) => {}
        }
        let branch = self.branch.clone();
        repo.commit_files(&branch, files, message)
    }

    async fn branch_tip(&self, branch: &str) -> StoreResult<String> {
        self.tip(branch).await
    }

    async fn commit_tree(&self, commit: &str) -> StoreResult<String> {
        self.repo
            .read()
            .await
            .commits
            .get(commit)
            .map(|c| c.tree.clone())
            .ok_or_else(|| StoreError::not_found(format!("commit {commit}")))
    }

    async fn create_blob(&self, content: &[u8]) -> StoreResult<String> {
        Ok(self.repo.write().await.put_blob(content))
    }

    async fn create_tree(&self, base_tree: &str, entries: &[TreeEntry]) -> StoreResult<String> {
        let mut repo = self.repo.write().await;
        let mut files = repo
            .trees
            .get(base_tree)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("tree {base_tree}")))?;
        for entry in entries {
            match &entry.target {
                TreeEntryTarget::Blob(sha) => {
                    if !repo.blobs.contains_key(sha) {
                        return Err(StoreError::invalid_request(format!("unknown blob {sha}")));
                    }
                    files.insert(entry.path.clone(), sha.clone());
                }
                TreeEntryTarget::Text(text) => {
                    let sha = repo.put_blob(text.as_bytes());
                    files.insert(entry.path.clone(), sha);
                }
                TreeEntryTarget::Delete => {
                    files.remove(&entry.path);
                }
            }
        }
        Ok(repo.put_tree(files))
    }

    async fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> StoreResult<String> {
        let mut repo = self.repo.write().await;
        if !repo.trees.contains_key(tree) {
            return Err(StoreError::invalid_request(format!("unknown tree {tree}")));
        }
        if let Some(missing) = parents.iter().find(|p| !repo.commits.contains_key(*p)) {
            return Err(StoreError::invalid_request(format!(
                "unknown parent {missing}"
            )));
        }
        Ok(repo.put_commit(message, tree, parents))
    }

    async fn update_ref(&self, branch: &str, commit: &str, force: bool) -> StoreResult<()> {
        let mut repo = self.repo.write().await;
        if std::mem::take(&mut repo.fail_next_ref_update) {
            return Err(StoreError::remote(Some(500), "injected ref update failure"));
        }
        if repo.race_branch.as_deref() == Some(branch) {
            repo.race_branch = None;
            let mut files = repo.branch_files(branch)?;
            let blob = repo.put_blob(b"written by another client\n");
            files.insert("concurrent.txt".to_string(), blob);
            repo.commit_files(branch, files, "Concurrent change")?;
        }
        repo.move_ref(branch, commit, force)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_missing_file() {
        let store = MemoryStore::new();
        let err = store.read_file("nope.json").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_write_requires_matching_tag() {
        let store = MemoryStore::new();
        let first = store.write_file("a.txt", b"1", None, "c").await.unwrap();

        assert!(store
            .write_file("a.txt", b"2", None, "u")
            .await
            .unwrap_err()
            .is_conflict());
        assert!(store
            .write_file("a.txt", b"2", Some("deadbeef"), "u")
            .await
            .unwrap_err()
            .is_conflict());

        let second = store
            .write_file("a.txt", b"2", Some(&first), "u")
            .await
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(store.read_file("a.txt").await.unwrap().revision, second);
    }

    #[tokio::test]
    async fn test_delete_checks_tag_and_presence() {
        let store = MemoryStore::new();
        let tag = store.write_file("a.txt", b"1", None, "c").await.unwrap();

        assert!(store
            .delete_file("a.txt", "stale", "d")
            .await
            .unwrap_err()
            .is_conflict());
        store.delete_file("a.txt", &tag, "d").await.unwrap();
        assert!(store
            .delete_file("a.txt", &tag, "d")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_identical_content_shares_blob() {
        let store = MemoryStore::new();
        let a = store.create_blob(b"same").await.unwrap();
        let b = store.create_blob(b"same").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn test_non_fast_forward_rejected() {
        let store = MemoryStore::new();
        let root = store.tip("main").await.unwrap();
        store.write_file("a.txt", b"1", None, "c").await.unwrap();

        let tree = store.commit_tree(&root).await.unwrap();
        let sibling = store
            .create_commit("sibling", &tree, &[root])
            .await
            .unwrap();
        assert!(store
            .update_ref("main", &sibling, false)
            .await
            .unwrap_err()
            .is_conflict());
        store.update_ref("main", &sibling, true).await.unwrap();
        assert_eq!(store.tip("main").await.unwrap(), sibling);
    }

    #[tokio::test]
    async fn test_injected_delete_failure() {
        let store = MemoryStore::new();
        let tag = store.write_file("a.png", b"x", None, "c").await.unwrap();
        store.fail_deletes_for("a.png").await;
        let err = store.delete_file("a.png", &tag, "d").await.unwrap_err();
        assert!(err.is_transient());
        assert!(store.read_file("a.png").await.is_ok());
    }

    #[tokio::test]
    async fn test_file_revision_matches_read() {
        let store = MemoryStore::new();
        let tag = store.write_file("a.png", b"x", None, "c").await.unwrap();
        assert_eq!(store.file_revision("a.png").await.unwrap(), tag);
        assert!(store.file_revision("b.png").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_history_counts_single_file_commits() {
        let store = MemoryStore::new();
        store.write_file("a", b"1", None, "one").await.unwrap();
        store.write_file("b", b"2", None, "two").await.unwrap();
        assert_eq!(store.history_len("main").await.unwrap(), 3);
        assert_eq!(store.tip_message("main").await.unwrap(), "two");
        assert_eq!(store.paths().await.unwrap(), vec!["a", "b"]);
    }
}
