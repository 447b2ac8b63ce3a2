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
//! Stale image detection between two revisions of an event.

use crate::model::EventDocument;
use crate::naming::AssetNamer;
use std::collections::BTreeSet;

/// Computes which stored images an edit stopped referencing
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDiffer;

impl ImageDiffer {
    /// `old - new`: images to delete after an update
    pub fn diff(old: &BTreeSet<String>, new: &BTreeSet<String>) -> BTreeSet<String> {
        old.difference(new).cloned().collect()
    }
}

/// Storage paths of every managed image a document references.
///
/// Covers image blocks and the thumbnail. External URLs are not ours to
/// delete and are left out.
pub fn stored_images(document: &EventDocument, namer: &AssetNamer) -> BTreeSet<String> {
    document
        .image_sources()
        .chain(std::iter::once(document.thumbnail.as_str()))
        .filter_map(|src| namer.storage_path_for(src))
        .collect()
}
