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
//! Turns caller input into a ready-to-store event.
//!
//! Composition is pure: validation, block extraction, asset naming and
//! thumbnail selection all happen here, and the result lists every file the
//! publisher must write.

use crate::error::{ContentError, ContentResult};
use crate::model::{parse_date, ContentBlock, EventDocument, EventInput};
use crate::naming::{resolve_thumbnail, AssetNamer};
use crate::parser::BlockParser;
use chrono::NaiveDate;

/// Required event fields after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
    /// Trimmed title
    pub title: String,
    /// Parsed event date
    pub event_date: NaiveDate,
    /// Parsed publish date
    pub publish_date: NaiveDate,
    /// Rich-text body
    pub body: String,
}

/// Check that every required field is present and well-formed.
///
/// Runs before the body is parsed, so a missing field is reported even when
/// the body is also broken.
pub fn validate(input: &EventInput) -> ContentResult<EventFields> {
    let title = required(&input.title, "title")?;
    let event_date_raw = required(&input.event_date, "eventDate")?;
    let publish_date_raw = required(&input.publish_date, "publishDate")?;
    let body = required(&input.body, "body")?;

    Ok(EventFields {
        title: title.to_string(),
        event_date: parse_date("eventDate", event_date_raw)?,
        publish_date: parse_date("publishDate", publish_date_raw)?,
        body: body.to_string(),
    })
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> ContentResult<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ContentError::MissingField(field))
}

/// A binary file the event stores
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Repository path (`public/images/...`)
    pub storage_path: String,
    /// Path documents reference (`/images/...`)
    pub public_path: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAsset")
            .field("storage_path", &self.storage_path)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Fully prepared event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedEvent {
    /// Canonical document path
    pub path: String,
    /// Document to serialize at `path`
    pub document: EventDocument,
    /// Assets the document newly references
    pub assets: Vec<ImageAsset>,
}

/// Build the stored representation of an event.
///
/// `seed` distinguishes asset names between operations. On update,
/// `previous_thumbnail` is the thumbnail of the stored revision; it is kept
/// when no explicit image index is given and the new content still uses it.
pub fn compose_event(
    namer: &AssetNamer,
    input: &EventInput,
    seed: u64,
    previous_thumbnail: Option<&str>,
) -> ContentResult<ComposedEvent> {
    let fields = validate(input)?;
    let path = namer.document_path(fields.event_date, &fields.title)?;

    let mut parsed = BlockParser::parse_html(&fields.body)?;
    let mut assets = Vec::with_capacity(parsed.images.len() + input.uploads.len());

    let extracted = std::mem::take(&mut parsed.images);
    for (sequence, image) in extracted.into_iter().enumerate() {
        let location = namer.inline_image(
            fields.event_date,
            &fields.title,
            seed,
            sequence,
            &image.mime_subtype,
        );
        parsed.resolve_placeholder(image.placeholder_index, &location.public_path);
        assets.push(ImageAsset {
            storage_path: location.storage_path,
            public_path: location.public_path,
            bytes: image.bytes,
        });
    }

    for (sequence, upload) in input.uploads.iter().enumerate() {
        let location = namer.uploaded_image(fields.event_date, seed, sequence, &upload.file_name);
        parsed
            .blocks
            .push(ContentBlock::image(location.public_path.clone(), upload.file_name.clone()));
        assets.push(ImageAsset {
            storage_path: location.storage_path,
            public_path: location.public_path,
            bytes: upload.bytes.clone(),
        });
    }

    let mut content = headings(input);
    content.extend(parsed.blocks);

    let thumbnail = resolve_thumbnail(&content, input.main_image_order, previous_thumbnail);

    Ok(ComposedEvent {
        path,
        document: EventDocument {
            title: fields.title,
            event_date: fields.event_date,
            publish_date: fields.publish_date,
            thumbnail,
            content,
        },
        assets,
    })
}

fn headings(input: &EventInput) -> Vec<ContentBlock> {
    [
        (1, &input.main_heading),
        (2, &input.sub_heading),
        (3, &input.section_heading),
    ]
    .into_iter()
    .filter_map(|(level, text)| {
        text.as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| ContentBlock::heading(level, t))
    })
    .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::UploadedImage;

    fn spotkanie() -> EventInput {
        EventInput::new(
            "Spotkanie",
            "2024-03-05",
            "2024-03-01",
            "<p>Witamy <img src='data:image/png;base64,AAA=' alt='x'></p>",
        )
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let mut input = spotkanie();
        input.title = Some("   ".to_string());
        assert_eq!(validate(&input).unwrap_err(), ContentError::MissingField("title"));

        let mut input = spotkanie();
        input.publish_date = None;
        assert_eq!(validate(&input).unwrap_err(), ContentError::MissingField("publishDate"));
    }

    #[test]
    fn test_validation_precedes_body_parsing() {
        let mut input = spotkanie();
        input.body = Some("<img src='data:image/png;base64,@@'>".to_string());
        input.event_date = None;
        assert_eq!(validate(&input).unwrap_err(), ContentError::MissingField("eventDate"));
        assert!(compose_event(&AssetNamer::default(), &input, 1, None)
            .unwrap_err()
            .is_missing_field());
    }

    #[test]
    fn test_compose_spotkanie() {
        let composed = compose_event(&AssetNamer::default(), &spotkanie(), 1700, None).unwrap();
        assert_eq!(composed.path, "content/aktualnosci/2024/marzec/spotkanie.json");
        assert_eq!(
            composed.document.content,
            vec![
                ContentBlock::paragraph("Witamy"),
                ContentBlock::image("/images/2024/marzec/spotkanie-1700-0.png", "x"),
            ]
        );
        assert_eq!(composed.assets.len(), 1);
        assert_eq!(
            composed.assets[0].storage_path,
            "public/images/2024/marzec/spotkanie-1700-0.png"
        );
        assert_eq!(composed.document.thumbnail, "");
    }

    #[test]
    fn test_headings_lead_in_level_order() {
        let input = spotkanie()
            .with_section_heading("Trzeci")
            .with_main_heading("Pierwszy")
            .with_sub_heading("  ");
        let composed = compose_event(&AssetNamer::default(), &input, 1, None).unwrap();
        assert_eq!(composed.document.content[0], ContentBlock::heading(1, "Pierwszy"));
        assert_eq!(composed.document.content[1], ContentBlock::heading(3, "Trzeci"));
        assert_eq!(composed.document.content[2], ContentBlock::paragraph("Witamy"));
    }

    #[test]
    fn test_uploads_append_and_select_thumbnail() {
        let input = spotkanie()
            .with_upload(UploadedImage::new("plakat.jpg", vec![1, 2, 3]))
            .with_main_image_order(1);
        let composed = compose_event(&AssetNamer::default(), &input, 9, None).unwrap();
        assert_eq!(composed.assets.len(), 2);
        assert_eq!(composed.document.thumbnail, "/images/2024/marzec/9-0-plakat.jpg");
        assert_eq!(
            composed.document.content.last(),
            Some(&ContentBlock::image("/images/2024/marzec/9-0-plakat.jpg", "plakat.jpg"))
        );
    }

    #[test]
    fn test_same_seed_same_output() {
        let namer = AssetNamer::default();
        let a = compose_event(&namer, &spotkanie(), 5, None).unwrap();
        let b = compose_event(&namer, &spotkanie(), 5, None).unwrap();
        assert_eq!(a, b);
        let c = compose_event(&namer, &spotkanie(), 6, None).unwrap();
        assert_ne!(a.assets[0].storage_path, c.assets[0].storage_path);
    }
}
