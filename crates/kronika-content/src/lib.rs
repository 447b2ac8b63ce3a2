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
//! Event content model and extraction for Kronika
//!
//! This crate holds everything about an event that does not involve the
//! network:
//!
//! - [`model`]: the persisted [`EventDocument`] and the caller's [`EventInput`]
//! - [`document`] / [`html`]: an abstract rich-text tree and its HTML front end
//! - [`parser`]: [`BlockParser`], rich text to ordered [`ContentBlock`]s
//! - [`naming`]: slugs, month partitions and [`AssetNamer`]
//! - [`diff`]: [`ImageDiffer`] for stale-image cleanup
//! - [`compose`]: validation plus all of the above in one step
//!
//! # Example
//!
//! ```
//! use kronika_content::{compose_event, AssetNamer, EventInput};
//!
//! let input = EventInput::new("Spotkanie", "2024-03-05", "2024-03-01", "<p>Witamy</p>");
//! let event = compose_event(&AssetNamer::default(), &input, 1, None).unwrap();
//! assert_eq!(event.path, "content/aktualnosci/2024/marzec/spotkanie.json");
//! ```

pub mod compose;
pub mod diff;
pub mod document;
pub mod error;
pub mod html;
pub mod model;
pub mod naming;
pub mod parser;

pub use compose::{compose_event, validate, ComposedEvent, EventFields, ImageAsset};
pub use diff::{stored_images, ImageDiffer};
pub use document::{NodeKind, RichNode, RichTree};
pub use error::{ContentError, ContentResult};
pub use model::{parse_date, ContentBlock, EventDocument, EventInput, UploadedImage};
pub use naming::{
    month_name, slugify, AssetLocation, AssetNamer, ClockSeed, FixedSeed, SeedSource, MONTHS,
};
pub use parser::{render_html, BlockParser, ExtractedImage, ParsedBody};
