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
//! Remote object store access for Kronika
//!
//! Events live as JSON documents and image files in a Git repository. This
//! crate talks to that repository through the [`RemoteObjectStore`] trait,
//! which exposes two levels of API:
//!
//! - A **single-file API** (`read_file`, `write_file`, `delete_file`) guarded
//!   by revision tags. Used for reads, document deletion and best-effort
//!   cleanup.
//! - **Git primitives** (`branch_tip`, `commit_tree`, `create_blob`,
//!   `create_tree`, `create_commit`, `update_ref`) from which
//!   [`commit_batch`](RemoteObjectStore::commit_batch) builds one atomic
//!   commit out of any number of file changes.
//!
//! # Implementations
//!
//! - [`GitHubStore`]: the GitHub REST API over `reqwest`
//! - [`MemoryStore`]: an in-process object database with failure injection,
//!   used by tests across the workspace
//!
//! # Consistency
//!
//! Branch updates are fast-forward only. If the branch moved between reading
//! its tip and updating the ref, the batch fails with
//! [`StoreError::Conflict`] and the branch keeps whatever landed first.
//! Objects created by a failed batch are unreachable and harmless.
//!
//! # Examples
//!
//! ```rust,no_run
//! use kronika_store::{BatchOptions, MemoryStore, PendingCommit, RemoteObjectStore};
//!
//! #[tokio::main]
//! async fn main() -> kronika_store::StoreResult<()> {
//!     let store = MemoryStore::new();
//!
//!     let mut batch = PendingCommit::new("Add event");
//!     batch.upsert("content/a.json", b"{}".to_vec());
//!     batch.upsert("public/images/a.png", vec![0x89, 0x50]);
//!     let commit = store.commit_batch("main", batch, BatchOptions::default()).await?;
//!
//!     let file = store.read_file("content/a.json").await?;
//!     assert_eq!(file.content, b"{}");
//!     println!("committed {commit}");
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod error;
pub mod github;
pub mod memory;
pub mod types;

use async_trait::async_trait;
use std::fmt::Debug;

pub use error::{StoreError, StoreResult};
pub use github::{GitHubConfig, GitHubStore};
pub use memory::MemoryStore;
pub use types::{
    BatchOptions, CommitInfo, FileChange, FileSnapshot, PendingCommit, TreeEntry,
    TreeEntryTarget,
};

/// Access to a Git-backed object store
///
/// # Safety Requirements
///
/// All implementations must:
/// - Be `Send + Sync` so one client can serve concurrent requests
/// - Implement `Debug` for observability
/// - Never log or expose credentials through `Debug`
///
/// # Error Handling
///
/// - Absent paths, refs and objects: [`StoreError::NotFound`]
/// - Stale revision tags and rejected ref updates: [`StoreError::Conflict`]
/// - Everything else the remote reports: [`StoreError::Remote`]
///
/// The single-file methods operate on the store's configured
/// [`branch`](RemoteObjectStore::branch).
#[async_trait]
pub trait RemoteObjectStore: Send + Sync + Debug {
    /// Branch the single-file API reads from and writes to
    fn branch(&self) -> &str;

    /// Read a file and the revision tag required to change it
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the path does not exist on the branch.
    async fn read_file(&self, path: &str) -> StoreResult<FileSnapshot>;

    /// Revision tag of a file, without necessarily fetching its content
    ///
    /// Backends that can answer from metadata alone should override this.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the path does not exist on the branch.
    async fn file_revision(&self, path: &str) -> StoreResult<String> {
        Ok(self.read_file(path).await?.revision)
    }

    /// Create or update a single file in its own commit
    ///
    /// # Arguments
    ///
    /// * `prior_revision` - `None` to create; the current tag to update
    ///
    /// # Returns
    ///
    /// The revision tag of the new content.
    ///
    /// # Errors
    ///
    /// [`StoreError::Conflict`] if the tag is stale, or missing while the
    /// file exists.
    async fn write_file(
        &self,
        path: &str,
        content: &[u8],
        prior_revision: Option<&str>,
        message: &str,
    ) -> StoreResult<String>;

    /// Delete a single file in its own commit
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if the path does not exist
    /// - [`StoreError::Conflict`] if `revision` is stale
    async fn delete_file(&self, path: &str, revision: &str, message: &str) -> StoreResult<()>;

    /// Commit sha the branch currently points at
    async fn branch_tip(&self, branch: &str) -> StoreResult<String>;

    /// Root tree sha of a commit
    async fn commit_tree(&self, commit: &str) -> StoreResult<String>;

    /// Store raw bytes as a blob, returning its sha
    async fn create_blob(&self, content: &[u8]) -> StoreResult<String>;

    /// Create a tree by layering `entries` on top of `base_tree`
    async fn create_tree(&self, base_tree: &str, entries: &[TreeEntry]) -> StoreResult<String>;

    /// Create a commit object, returning its sha
    async fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> StoreResult<String>;

    /// Point `branch` at `commit`
    ///
    /// Without `force` the update must be a fast-forward; otherwise
    /// [`StoreError::Conflict`].
    async fn update_ref(&self, branch: &str, commit: &str, force: bool) -> StoreResult<()>;

    /// Apply every change in `pending` as exactly one commit on `branch`.
    ///
    /// Either all changes become visible together or none do. Returns the new
    /// commit sha. See [`batch::commit_batch`] for the protocol.
    async fn commit_batch(
        &self,
        branch: &str,
        pending: PendingCommit,
        options: BatchOptions,
    ) -> StoreResult<String> {
        batch::commit_batch(self, branch, pending, options).await
    }
}
