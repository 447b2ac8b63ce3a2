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
//! The add / update / delete workflows

use crate::error::{PublishError, PublishResult};
use crate::phase::{Phase, Progress};
use kronika_content::{
    compose_event, parse_date, stored_images, validate, AssetNamer, ClockSeed, ComposedEvent,
    ContentError, EventDocument, EventInput, ImageDiffer, SeedSource,
};
use kronika_store::{BatchOptions, PendingCommit, RemoteObjectStore};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Message returned by a successful add or update
pub const PUBLISHED_MESSAGE: &str = "Event processed and pushed successfully!";
/// Message returned by a successful delete
pub const DELETED_MESSAGE: &str = "Event deleted successfully!";

/// What a successful operation did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishSummary {
    /// Human-readable outcome
    pub message: String,
    /// Canonical document path
    pub path: String,
    /// Commit that carried the change, when the store reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    /// Image files written by this operation
    pub images_written: Vec<String>,
    /// Image files removed by cleanup
    pub images_removed: Vec<String>,
    /// Previous document path, when an update moved the event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relocated_from: Option<String>,
}

/// Publishes events to a [`RemoteObjectStore`].
///
/// Holds no mutable state; concurrent operations are safe and are ordered
/// only by the store's optimistic concurrency.
#[derive(Clone)]
pub struct EventPublisher {
    store: Arc<dyn RemoteObjectStore>,
    namer: AssetNamer,
    seeds: Arc<dyn SeedSource>,
}

impl EventPublisher {
    /// Publisher with the default layout and clock-based asset seeds
    pub fn new(store: Arc<dyn RemoteObjectStore>) -> Self {
        Self {
            store,
            namer: AssetNamer::default(),
            seeds: Arc::new(ClockSeed),
        }
    }

    /// Use a different repository layout
    pub fn with_namer(mut self, namer: AssetNamer) -> Self {
        self.namer = namer;
        self
    }

    /// Use a different seed source (fixed seeds make names reproducible)
    pub fn with_seed_source(mut self, seeds: Arc<dyn SeedSource>) -> Self {
        self.seeds = seeds;
        self
    }

    /// Repository layout in use
    pub fn namer(&self) -> &AssetNamer {
        &self.namer
    }

    /// Create an event in one commit.
    ///
    /// An existing document at the same path is overwritten.
    #[instrument(skip(self, input), fields(title = input.title.as_deref().unwrap_or_default()))]
    pub async fn add(&self, input: &EventInput) -> PublishResult<PublishSummary> {
        let mut progress = Progress::start("add");
        let result = self.run_add(input, &mut progress).await;
        progress.finish(&result);
        if let Ok(summary) = &result {
            info!(path = %summary.path, images = summary.images_written.len(), "event added");
        }
        result
    }

    /// Replace an existing event, moving it if its title or date changed.
    ///
    /// `existing_path` is the canonical document path or the short form
    /// `aktualnosci/2024/marzec/slug`.
    #[instrument(skip(self, input), fields(title = input.title.as_deref().unwrap_or_default()))]
    pub async fn update(
        &self,
        input: &EventInput,
        existing_path: &str,
    ) -> PublishResult<PublishSummary> {
        let mut progress = Progress::start("update");
        let result = self.run_update(input, existing_path, &mut progress).await;
        progress.finish(&result);
        if let Ok(summary) = &result {
            info!(
                path = %summary.path,
                written = summary.images_written.len(),
                removed = summary.images_removed.len(),
                "event updated"
            );
        }
        result
    }

    /// Delete the event stored for `title` under the month of `date`,
    /// then remove its images.
    #[instrument(skip(self))]
    pub async fn delete(&self, title: &str, date: &str) -> PublishResult<PublishSummary> {
        let mut progress = Progress::start("delete");
        let result = self.run_delete(title, date, &mut progress).await;
        progress.finish(&result);
        if let Ok(summary) = &result {
            info!(path = %summary.path, removed = summary.images_removed.len(), "event deleted");
        }
        result
    }

    /// Fetch a stored event by canonical or short path
    #[instrument(skip(self))]
    pub async fn load(&self, reference: &str) -> PublishResult<(String, EventDocument)> {
        let path = self.namer.normalize_document_path(reference)?;
        let document = self.read_document(&path).await?;
        Ok((path, document))
    }

    async fn run_add(
        &self,
        input: &EventInput,
        progress: &mut Progress,
    ) -> PublishResult<PublishSummary> {
        validate(input)?;

        progress.enter(Phase::Parsing);
        let composed = compose_event(&self.namer, input, self.seeds.next_seed(), None)?;

        progress.enter(Phase::Committing);
        let message = format!("Add event: {}", composed.document.title);
        let pending = pending_commit(&composed, message)?;
        let commit = self
            .store
            .commit_batch(self.store.branch(), pending, BatchOptions::default())
            .await?;

        Ok(PublishSummary {
            message: PUBLISHED_MESSAGE.to_string(),
            images_written: written_paths(&composed),
            path: composed.path,
            commit: Some(commit),
            images_removed: Vec::new(),
            relocated_from: None,
        })
    }

    async fn run_update(
        &self,
        input: &EventInput,
        existing_path: &str,
        progress: &mut Progress,
    ) -> PublishResult<PublishSummary> {
        validate(input)?;
        let old_path = self.namer.normalize_document_path(existing_path)?;

        progress.enter(Phase::ReadExisting);
        let previous = self.read_document(&old_path).await?;

        progress.enter(Phase::Parsing);
        let composed = compose_event(
            &self.namer,
            input,
            self.seeds.next_seed(),
            Some(&previous.thumbnail),
        )?;

        progress.enter(Phase::Diffing);
        let stale = ImageDiffer::diff(
            &stored_images(&previous, &self.namer),
            &stored_images(&composed.document, &self.namer),
        );
        debug!(stale = stale.len(), "computed stale images");

        progress.enter(Phase::Committing);
        let message = format!("Update event: {}", composed.document.title);
        let mut pending = pending_commit(&composed, message.clone())?;
        let relocated_from = (composed.path != old_path).then(|| old_path.clone());
        if let Some(old) = &relocated_from {
            debug!(from = %old, to = %composed.path, "relocating event");
            pending.delete(old.as_str());
        }
        let commit = self
            .store
            .commit_batch(self.store.branch(), pending, BatchOptions::default())
            .await?;

        progress.enter(Phase::CleaningUp);
        let images_removed = self.remove_images(&stale, &message).await;

        Ok(PublishSummary {
            message: PUBLISHED_MESSAGE.to_string(),
            images_written: written_paths(&composed),
            path: composed.path,
            commit: Some(commit),
            images_removed,
            relocated_from,
        })
    }

    async fn run_delete(
        &self,
        title: &str,
        date: &str,
        progress: &mut Progress,
    ) -> PublishResult<PublishSummary> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ContentError::MissingField("title").into());
        }
        if date.trim().is_empty() {
            return Err(ContentError::MissingField("publishDate").into());
        }
        let date = parse_date("publishDate", date)?;
        let path = self.namer.document_path(date, title)?;

        progress.enter(Phase::ReadExisting);
        let snapshot = self.store.read_file(&path).await?;
        let images = match EventDocument::from_json_slice(&snapshot.content) {
            Ok(document) => stored_images(&document, &self.namer),
            Err(err) => {
                warn!(path = %path, error = %err, "stored event unreadable; its images are left in place");
                BTreeSet::new()
            }
        };

        progress.enter(Phase::Committing);
        let message = format!("Delete event: {title}");
        self.store
            .delete_file(&path, &snapshot.revision, &message)
            .await?;

        progress.enter(Phase::CleaningUp);
        let images_removed = self.remove_images(&images, &message).await;

        Ok(PublishSummary {
            message: DELETED_MESSAGE.to_string(),
            path,
            commit: None,
            images_written: Vec::new(),
            images_removed,
            relocated_from: None,
        })
    }

    async fn read_document(&self, path: &str) -> PublishResult<EventDocument> {
        let snapshot = self.store.read_file(path).await?;
        EventDocument::from_json_slice(&snapshot.content)
            .map_err(|err| PublishError::corrupt(path, err))
    }

    /// Best-effort removal, one path at a time; returns the paths actually removed
    ///
    /// Every single-file delete commits to the branch, so they must run serially.
    async fn remove_images(&self, paths: &BTreeSet<String>, message: &str) -> Vec<String> {
        let mut removed = Vec::with_capacity(paths.len());
        for path in paths {
            if let Some(path) = self.remove_image(path, message).await {
                removed.push(path);
            }
        }
        removed
    }

    async fn remove_image(&self, path: &str, message: &str) -> Option<String> {
        let revision = match self.store.file_revision(path).await {
            Ok(revision) => revision,
            Err(err) if err.is_not_found() => {
                debug!(path, "image already gone");
                return None;
            }
            Err(err) => {
                warn!(path, error = %err, "failed to look up image for cleanup");
                return None;
            }
        };
        match self.store.delete_file(path, &revision, message).await {
            Ok(()) => {
                debug!(path, "removed image");
                Some(path.to_string())
            }
            Err(err) if err.is_not_found() => None,
            Err(err) => {
                warn!(path, error = %err, "failed to remove image");
                None
            }
        }
    }
}

impl fmt::Debug for EventPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventPublisher")
            .field("store", &self.store)
            .field("namer", &self.namer)
            .finish()
    }
}

fn pending_commit(composed: &ComposedEvent, message: String) -> PublishResult<PendingCommit> {
    let mut pending = PendingCommit::new(message);
    pending.upsert(composed.path.as_str(), composed.document.to_json_pretty()?);
    for asset in &composed.assets {
        pending.upsert(asset.storage_path.as_str(), asset.bytes.clone());
    }
    Ok(pending)
}

fn written_paths(composed: &ComposedEvent) -> Vec<String> {
    composed
        .assets
        .iter()
        .map(|asset| asset.storage_path.clone())
        .collect()
}
