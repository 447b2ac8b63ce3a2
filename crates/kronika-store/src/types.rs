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
//! Value types exchanged with a [`RemoteObjectStore`](crate::RemoteObjectStore)

/// Current content of a file and the revision tag guarding it
#[derive(Clone, PartialEq, Eq)]
pub struct FileSnapshot {
    /// Opaque revision tag (blob sha) required for conditional writes
    pub revision: String,
    /// Decoded file content
    pub content: Vec<u8>,
}

impl FileSnapshot {
    /// Content as UTF-8 text, if valid
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}

impl std::fmt::Debug for FileSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSnapshot")
            .field("revision", &self.revision)
            .field("len", &self.content.len())
            .finish()
    }
}

/// One path change inside a batch
#[derive(Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Repository-relative path
    pub path: String,
    /// New content, `None` to delete the path
    pub content: Option<Vec<u8>>,
}

impl FileChange {
    /// Create or replace `path`
    pub fn upsert(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: Some(content.into()),
        }
    }

    /// Remove `path`
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: None,
        }
    }

    /// Whether this change removes its path
    pub fn is_delete(&self) -> bool {
        self.content.is_none()
    }
}

impl std::fmt::Debug for FileChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.content {
            Some(bytes) => write!(f, "upsert {} ({} bytes)", self.path, bytes.len()),
            None => write!(f, "delete {}", self.path),
        }
    }
}

/// A set of file changes destined for exactly one commit.
///
/// Later changes to the same path replace earlier ones, so the batch never
/// asks the remote to write a path twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingCommit {
    message: String,
    changes: Vec<FileChange>,
}

impl PendingCommit {
    /// Empty batch with a commit message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            changes: Vec::new(),
        }
    }

    /// Add a change, replacing any earlier change to the same path
    pub fn push(&mut self, change: FileChange) {
        match self.changes.iter_mut().find(|c| c.path == change.path) {
            Some(existing) => *existing = change,
            None => self.changes.push(change),
        }
    }

    /// Queue a create/update
    pub fn upsert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.push(FileChange::upsert(path, content));
    }

    /// Queue a deletion
    pub fn delete(&mut self, path: impl Into<String>) {
        self.push(FileChange::delete(path));
    }

    /// Commit message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Queued changes in insertion order
    pub fn changes(&self) -> &[FileChange] {
        &self.changes
    }

    /// Consume into message and changes
    pub fn into_parts(self) -> (String, Vec<FileChange>) {
        (self.message, self.changes)
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of queued changes
    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

/// What a tree entry should point at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntryTarget {
    /// Existing blob by sha
    Blob(String),
    /// Inline UTF-8 content; the remote creates the blob
    Text(String),
    /// Remove the path from the base tree
    Delete,
}

/// One entry of a tree to create on top of a base tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Repository-relative path
    pub path: String,
    /// Entry target
    pub target: TreeEntryTarget,
}

/// Commit object as seen by the batch protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Commit sha
    pub sha: String,
    /// Root tree sha
    pub tree: String,
}

/// Options for [`commit_batch`](crate::RemoteObjectStore::commit_batch)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Overwrite the branch even if it moved since it was read.
    ///
    /// Discards whatever landed concurrently. Off by default; never enable it
    /// for routine publishing.
    pub force: bool,
}

impl BatchOptions {
    /// Fast-forward-only update
    pub fn fast_forward() -> Self {
        Self { force: false }
    }

    /// Unsafe forced ref update
    pub fn forced() -> Self {
        Self { force: true }
    }
}
