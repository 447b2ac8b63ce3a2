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
//! Event publishing workflows for Kronika
//!
//! [`EventPublisher`] ties the content crate (validation, block extraction,
//! asset naming, image diffing) to a [`RemoteObjectStore`]:
//!
//! - **add**: one commit with the event document and every new image
//! - **update**: read the stored revision, one commit with the new document,
//!   new images and (when the title or date moved it) removal of the old
//!   document, then best-effort removal of images nothing references anymore
//! - **delete**: remove the document, then best-effort removal of its images
//!
//! Errors before the commit leave the store untouched. Cleanup failures are
//! logged and never turn a successful operation into an error.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kronika_content::EventInput;
//! use kronika_publisher::EventPublisher;
//! use kronika_store::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), kronika_publisher::PublishError> {
//!     let publisher = EventPublisher::new(Arc::new(MemoryStore::new()));
//!     let input = EventInput::new("Spotkanie", "2024-03-05", "2024-03-01", "<p>Witamy</p>");
//!     let summary = publisher.add(&input).await?;
//!     println!("{} -> {}", summary.message, summary.path);
//!     Ok(())
//! }
//! ```
//!
//! [`RemoteObjectStore`]: kronika_store::RemoteObjectStore

pub mod error;
pub mod phase;
pub mod publisher;

pub use error::{ErrorKind, PublishError, PublishResult};
pub use phase::Phase;
pub use publisher::{EventPublisher, PublishSummary, DELETED_MESSAGE, PUBLISHED_MESSAGE};
