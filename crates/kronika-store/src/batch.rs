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
//! Atomic multi-file commits over the Git primitives
//!
//! The protocol:
//!
//! 1. Resolve the branch tip commit
//! 2. Read the tip's root tree
//! 3. Create blobs for binary content (text goes inline into the tree)
//! 4. Create one tree layering every change on the tip tree
//! 5. Create one commit whose parent is the tip
//! 6. Move the branch ref, fast-forward only unless forced
//!
//! Nothing is visible on the branch until step 6 succeeds.

use crate::error::{StoreError, StoreResult};
use crate::types::{BatchOptions, FileChange, PendingCommit, TreeEntry, TreeEntryTarget};
use crate::RemoteObjectStore;
use tracing::{debug, info, instrument, warn};

/// Run the batch protocol against any store.
///
/// # Errors
///
/// - [`StoreError::InvalidRequest`] for an empty batch
/// - [`StoreError::Conflict`] if the branch moved and `options.force` is off
/// - Any error from the underlying primitives
#[instrument(skip(store, pending), fields(changes = pending.len()))]
pub async fn commit_batch<S>(
    store: &S,
    branch: &str,
    pending: PendingCommit,
    options: BatchOptions,
) -> StoreResult<String>
where
    S: RemoteObjectStore + ?Sized,
{
    if pending.is_empty() {
        return Err(StoreError::invalid_request("batch has no changes"));
    }
    let (message, changes) = pending.into_parts();

    let tip = store.branch_tip(branch).await?;
    let base_tree = store.commit_tree(&tip).await?;
    debug!(tip = %tip, tree = %base_tree, "resolved branch tip");

    let mut entries = Vec::with_capacity(changes.len());
    for change in changes {
        entries.push(tree_entry(store, change).await?);
    }

    let tree = store.create_tree(&base_tree, &entries).await?;
    let commit = store.create_commit(&message, &tree, &[tip.clone()]).await?;
    debug!(tree = %tree, commit = %commit, "created commit");

    if options.force {
        warn!(branch, "forcing ref update; concurrent commits will be discarded");
    }
    store.update_ref(branch, &commit, options.force).await?;

    info!(branch, commit = %commit, entries = entries.len(), "batch committed");
    Ok(commit)
}

async fn tree_entry<S>(store: &S, change: FileChange) -> StoreResult<TreeEntry>
where
    S: RemoteObjectStore + ?Sized,
{
    let target = match change.content {
        None => TreeEntryTarget::Delete,
        Some(bytes) => match String::from_utf8(bytes) {
            Ok(text) => TreeEntryTarget::Text(text),
            Err(err) => {
                let bytes = err.into_bytes();
                let sha = store.create_blob(&bytes).await?;
                debug!(path = %change.path, sha = %sha, size = bytes.len(), "created blob");
                TreeEntryTarget::Blob(sha)
            }
        },
    };
    Ok(TreeEntry {
        path: change.path,
        target,
    })
}
