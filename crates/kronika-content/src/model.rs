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
//! Event data model
//!
//! [`EventDocument`] is the JSON file persisted at an event's canonical path.
//! [`EventInput`] is what callers hand to the publisher: a fixed set of named
//! fields where absence is explicit (`None`) rather than implied by an empty
//! string.

use crate::error::{ContentError, ContentResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Alt text used when an image carries none
pub const DEFAULT_IMAGE_ALT: &str = "Inline image";

/// One typed unit of an event's body, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    /// Heading of level 1, 2 or 3
    Heading {
        /// Heading level (1..=3)
        level: u8,
        /// Heading text
        text: String,
    },
    /// Plain paragraph text
    Paragraph {
        /// Trimmed paragraph text
        text: String,
    },
    /// Image reference, either a stored asset or an external URL
    Image {
        /// Public path or URL
        src: String,
        /// Alternative text
        alt: String,
    },
}

impl ContentBlock {
    /// Build a heading block
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        ContentBlock::Heading {
            level,
            text: text.into(),
        }
    }

    /// Build a paragraph block
    pub fn paragraph(text: impl Into<String>) -> Self {
        ContentBlock::Paragraph { text: text.into() }
    }

    /// Build an image block
    pub fn image(src: impl Into<String>, alt: impl Into<String>) -> Self {
        ContentBlock::Image {
            src: src.into(),
            alt: alt.into(),
        }
    }

    /// Image source, if this is an image block
    pub fn image_src(&self) -> Option<&str> {
        match self {
            ContentBlock::Image { src, .. } => Some(src),
            _ => None,
        }
    }
}

/// Persisted event document.
///
/// ```json
/// {
///   "title": "Spotkanie",
///   "eventDate": "2024-03-05",
///   "publishDate": "2024-03-01",
///   "thumbnail": "",
///   "content": [{"type": "paragraph", "text": "Witamy"}]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDocument {
    /// Event title
    pub title: String,
    /// Date the event takes place; selects the storage partition
    #[serde(with = "iso_date")]
    pub event_date: NaiveDate,
    /// Publication date, metadata only
    #[serde(with = "iso_date")]
    pub publish_date: NaiveDate,
    /// Selected image path, possibly empty
    #[serde(default)]
    pub thumbnail: String,
    /// Ordered body blocks
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

impl EventDocument {
    /// Serialize as the pretty-printed JSON stored remotely
    pub fn to_json_pretty(&self) -> ContentResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ContentError::MalformedBody(format!("failed to serialize document: {e}")))
    }

    /// Parse a stored document
    pub fn from_json_slice(bytes: &[u8]) -> ContentResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| ContentError::MalformedBody(format!("stored document is not valid: {e}")))
    }

    /// Sources of all image blocks, in order
    pub fn image_sources(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(ContentBlock::image_src)
    }
}

/// An image file supplied next to the form fields rather than inside the body.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Original file name as sent by the client
    pub file_name: String,
    /// Raw file bytes
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    /// Create an upload from its name and bytes
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

impl std::fmt::Debug for UploadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedImage")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Caller-supplied event fields for add and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    /// Event title
    pub title: Option<String>,
    /// Event date, `YYYY-MM-DD`
    pub event_date: Option<String>,
    /// Publication date, `YYYY-MM-DD`
    pub publish_date: Option<String>,
    /// Rich-text (HTML) body
    #[serde(alias = "description")]
    pub body: Option<String>,
    /// Optional level-1 heading
    pub main_heading: Option<String>,
    /// Optional level-2 heading
    pub sub_heading: Option<String>,
    /// Optional level-3 heading
    pub section_heading: Option<String>,
    /// Zero-based index into the event's image blocks selecting the thumbnail
    pub main_image_order: Option<usize>,
    /// Image files sent alongside the fields
    #[serde(skip)]
    pub uploads: Vec<UploadedImage>,
}

impl EventInput {
    /// Input with the four required fields set
    pub fn new(
        title: impl Into<String>,
        event_date: impl Into<String>,
        publish_date: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            event_date: Some(event_date.into()),
            publish_date: Some(publish_date.into()),
            body: Some(body.into()),
            ..Self::default()
        }
    }

    /// Set the level-1 heading
    pub fn with_main_heading(mut self, text: impl Into<String>) -> Self {
        self.main_heading = Some(text.into());
        self
    }

    /// Set the level-2 heading
    pub fn with_sub_heading(mut self, text: impl Into<String>) -> Self {
        self.sub_heading = Some(text.into());
        self
    }

    /// Set the level-3 heading
    pub fn with_section_heading(mut self, text: impl Into<String>) -> Self {
        self.section_heading = Some(text.into());
        self
    }

    /// Select the thumbnail by image index
    pub fn with_main_image_order(mut self, index: usize) -> Self {
        self.main_image_order = Some(index);
        self
    }

    /// Attach an uploaded image file
    pub fn with_upload(mut self, upload: UploadedImage) -> Self {
        self.uploads.push(upload);
        self
    }
}

/// Parse a caller date. Accepts `YYYY-MM-DD` optionally followed by a time
/// component (`T...` or a space), which is ignored.
pub fn parse_date(field: &'static str, raw: &str) -> ContentResult<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed
        .split(|c| c == 'T' || c == ' ')
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| ContentError::invalid_date(field, raw))
}

mod iso_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date("date", &raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_block_serialization_shape() {
        let blocks = vec![
            ContentBlock::heading(1, "Title"),
            ContentBlock::paragraph("Witamy"),
            ContentBlock::image("/images/2024/marzec/a.png", "x"),
        ];
        let json = serde_json::to_value(&blocks).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"type": "heading", "level": 1, "text": "Title"},
                {"type": "paragraph", "text": "Witamy"},
                {"type": "image", "src": "/images/2024/marzec/a.png", "alt": "x"}
            ])
        );
    }

    #[test]
    fn test_document_field_names() {
        let doc = EventDocument {
            title: "Spotkanie".to_string(),
            event_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            publish_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            thumbnail: String::new(),
            content: vec![],
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["eventDate"], "2024-03-05");
        assert_eq!(json["publishDate"], "2024-03-01");
        assert_eq!(json["thumbnail"], "");
    }

    #[test]
    fn test_document_accepts_timestamped_dates() {
        let raw = br#"{"title":"A","eventDate":"2024-03-05T10:00:00.000Z","publishDate":"2024-03-01","content":[]}"#;
        let doc = EventDocument::from_json_slice(raw).unwrap();
        assert_eq!(doc.event_date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert!(doc.thumbnail.is_empty());
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("eventDate", "05.03.2024").is_err());
        assert!(parse_date("eventDate", "").is_err());
        assert!(parse_date("eventDate", " 2024-03-05 ").is_ok());
    }

    #[test]
    fn test_input_accepts_description_alias() {
        let input: EventInput = serde_json::from_str(
            r#"{"title":"A","eventDate":"2024-01-01","publishDate":"2024-01-01","description":"<p>x</p>","mainImageOrder":0}"#,
        )
        .unwrap();
        assert_eq!(input.body.as_deref(), Some("<p>x</p>"));
        assert_eq!(input.main_image_order, Some(0));
    }
}
