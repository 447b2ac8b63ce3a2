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
//! Block extraction from a rich-text tree.
//!
//! Walks the top-level nodes in order:
//! - a paragraph yields a [`ContentBlock::Paragraph`] from its trimmed text
//!   (nothing for whitespace-only text), followed by one image block per image
//!   descendant;
//! - a top-level image yields an image block in place;
//! - everything else is skipped.
//!
//! Images whose `src` is a `data:image/...;base64,` payload are pulled out as
//! [`ExtractedImage`]s. Their block is left with an empty `src` that the caller
//! fills in once the asset has a name. No clock or randomness is involved, so
//! equal input yields equal output.

use crate::document::{NodeKind, RichNode, RichTree};
use crate::error::{ContentError, ContentResult};
use crate::html;
use crate::model::{ContentBlock, DEFAULT_IMAGE_ALT};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// An inline image removed from the body
#[derive(Clone, PartialEq, Eq)]
pub struct ExtractedImage {
    /// Index of the image block waiting for this asset's public path
    pub placeholder_index: usize,
    /// Declared MIME subtype (`png`, `jpeg`, ...)
    pub mime_subtype: String,
    /// Decoded image bytes
    pub bytes: Vec<u8>,
    /// Alt text of the image
    pub alt: String,
}

impl std::fmt::Debug for ExtractedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractedImage")
            .field("placeholder_index", &self.placeholder_index)
            .field("mime_subtype", &self.mime_subtype)
            .field("len", &self.bytes.len())
            .field("alt", &self.alt)
            .finish()
    }
}

/// Output of [`BlockParser::parse`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBody {
    /// Blocks in document order
    pub blocks: Vec<ContentBlock>,
    /// Inline images in extraction order
    pub images: Vec<ExtractedImage>,
}

impl ParsedBody {
    /// Fill the placeholder block of an extracted image
    pub fn resolve_placeholder(&mut self, placeholder_index: usize, public_path: &str) {
        if let Some(ContentBlock::Image { src, .. }) = self.blocks.get_mut(placeholder_index) {
            *src = public_path.to_string();
        }
    }
}

/// Converts rich text into content blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockParser;

impl BlockParser {
    /// Parse an HTML fragment
    pub fn parse_html(body: &str) -> ContentResult<ParsedBody> {
        let tree = html::parse_html(body)?;
        Self::parse(&tree)
    }

    /// Parse an abstract rich-text tree
    pub fn parse(tree: &RichTree) -> ContentResult<ParsedBody> {
        let mut parsed = ParsedBody::default();

        for node in &tree.nodes {
            match node.kind() {
                NodeKind::Paragraph => {
                    let text = node.text_content();
                    let text = text.trim();
                    if !text.is_empty() {
                        parsed.blocks.push(ContentBlock::paragraph(text));
                    }
                    for image in node.image_descendants() {
                        push_image(image, &mut parsed)?;
                    }
                }
                NodeKind::Image => push_image(node, &mut parsed)?,
                NodeKind::Other => {}
            }
        }

        tracing::trace!(
            blocks = parsed.blocks.len(),
            inline_images = parsed.images.len(),
            "parsed rich-text body"
        );
        Ok(parsed)
    }
}

fn push_image(node: &RichNode, parsed: &mut ParsedBody) -> ContentResult<()> {
    let Some(src) = node.attribute("src").map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(());
    };
    let alt = node
        .attribute("alt")
        .filter(|alt| !alt.trim().is_empty())
        .unwrap_or(DEFAULT_IMAGE_ALT)
        .to_string();

    match decode_data_uri(src)? {
        Some((mime_subtype, bytes)) => {
            parsed.images.push(ExtractedImage {
                placeholder_index: parsed.blocks.len(),
                mime_subtype,
                bytes,
                alt: alt.clone(),
            });
            parsed.blocks.push(ContentBlock::image(String::new(), alt));
        }
        None => parsed.blocks.push(ContentBlock::image(src, alt)),
    }
    Ok(())
}

/// Decode a `data:image/<subtype>;base64,<payload>` source.
///
/// Returns `None` for ordinary URLs and paths.
pub fn decode_data_uri(src: &str) -> ContentResult<Option<(String, Vec<u8>)>> {
    let Some(rest) = src.strip_prefix("data:image") else {
        return Ok(None);
    };
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ContentError::invalid_image("data URI has no payload"))?;
    let header = header
        .strip_prefix('/')
        .ok_or_else(|| ContentError::invalid_image("data URI has no MIME subtype"))?;
    let mut params = header.split(';');
    let subtype = params.next().unwrap_or_default().trim().to_string();
    if subtype.is_empty() {
        return Err(ContentError::invalid_image("data URI has no MIME subtype"));
    }
    if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(ContentError::invalid_image(format!(
            "inline image/{subtype} is not base64 encoded"
        )));
    }

    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ContentError::invalid_image(format!("bad base64 payload: {e}")))?;
    Ok(Some((subtype, bytes)))
}

/// Render blocks back to HTML: headings as `<h1>`..`<h3>`, paragraphs as
/// `<p>`, images as top-level `<img>`.
pub fn render_html(blocks: &[ContentBlock]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            ContentBlock::Heading { level, text } => {
                out.push_str(&format!("<h{level}>{}</h{level}>", escape_text(text)));
            }
            ContentBlock::Paragraph { text } => {
                out.push_str(&format!("<p>{}</p>", escape_text(text)));
            }
            ContentBlock::Image { src, alt } => {
                out.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\">",
                    escape_attribute(src),
                    escape_attribute(alt)
                ));
            }
        }
    }
    out
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_image_follows_paragraph() {
        let parsed =
            BlockParser::parse_html("<p>Witamy <img src='data:image/png;base64,AAA=' alt='x'></p>").unwrap();
        assert_eq!(
            parsed.blocks,
            vec![ContentBlock::paragraph("Witamy"), ContentBlock::image("", "x")]
        );
        assert_eq!(parsed.images.len(), 1);
        assert_eq!(parsed.images[0].placeholder_index, 1);
        assert_eq!(parsed.images[0].mime_subtype, "png");
        assert_eq!(parsed.images[0].bytes, vec![0, 0]);
    }

    #[test]
    fn test_images_stay_with_their_paragraph() {
        let html = "<p>First <img src='/a.png'></p><p>Second <img src='/b.png'><img src='/c.png'></p>";
        let parsed = BlockParser::parse_html(html).unwrap();
        assert_eq!(
            parsed.blocks,
            vec![
                ContentBlock::paragraph("First"),
                ContentBlock::image("/a.png", DEFAULT_IMAGE_ALT),
                ContentBlock::paragraph("Second"),
                ContentBlock::image("/b.png", DEFAULT_IMAGE_ALT),
                ContentBlock::image("/c.png", DEFAULT_IMAGE_ALT),
            ]
        );
        assert!(parsed.images.is_empty());
    }

    #[test]
    fn test_whitespace_paragraph_still_emits_images() {
        let parsed = BlockParser::parse_html("<p>   <img src='/only.png' alt='only'>  </p>").unwrap();
        assert_eq!(parsed.blocks, vec![ContentBlock::image("/only.png", "only")]);
    }

    #[test]
    fn test_top_level_image_keeps_position() {
        let parsed = BlockParser::parse_html("<p>a</p><img src='/x.png' alt='x'><p>b</p>").unwrap();
        assert_eq!(parsed.blocks[1], ContentBlock::image("/x.png", "x"));
        assert_eq!(parsed.blocks[2], ContentBlock::paragraph("b"));
    }

    #[test]
    fn test_unclosed_paragraphs_stay_separate() {
        let parsed = BlockParser::parse_html("<p>a<p>b <img src='/b.png' alt='b'></p>").unwrap();
        assert_eq!(
            parsed.blocks,
            vec![
                ContentBlock::paragraph("a"),
                ContentBlock::paragraph("b"),
                ContentBlock::image("/b.png", "b"),
            ]
        );
    }

    #[test]
    fn test_other_nodes_are_ignored() {
        let parsed = BlockParser::parse_html("<div><p>inside</p><img src='/d.png'></div><ul><li>x</li></ul>").unwrap();
        assert!(parsed.blocks.is_empty());
    }

    #[test]
    fn test_image_without_src_is_skipped() {
        let parsed = BlockParser::parse_html("<p>t<img alt='nothing'></p>").unwrap();
        assert_eq!(parsed.blocks, vec![ContentBlock::paragraph("t")]);
    }

    #[test]
    fn test_bad_inline_payload() {
        let err = BlockParser::parse_html("<img src='data:image/png;base64,@@@'>").unwrap_err();
        assert!(matches!(err, ContentError::InvalidImage(_)));
        let err = BlockParser::parse_html("<img src='data:image/svg+xml;utf8,<svg/>'>").unwrap_err();
        assert!(matches!(err, ContentError::InvalidImage(_)));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let html = "<p>a<img src='data:image/jpeg;base64,/9j/'></p><img src='data:image/png;base64,AAA='>";
        let first = BlockParser::parse_html(html).unwrap();
        let second = BlockParser::parse_html(html).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.images[0].placeholder_index, 1);
        assert_eq!(first.images[1].placeholder_index, 2);
    }

    #[test]
    fn test_render_then_parse_round_trip() {
        let html = "<p>Ala &amp; kot</p><img src=\"https://example.com/a.jpg\" alt=\"A\"><p>Koniec <img src=\"/images/b.png\" alt=\"B\"></p>";
        let parsed = BlockParser::parse_html(html).unwrap();
        let rendered = render_html(&parsed.blocks);
        let reparsed = BlockParser::parse_html(&rendered).unwrap();
        assert_eq!(parsed.blocks, reparsed.blocks);
        assert_eq!(parsed.blocks[0], ContentBlock::paragraph("Ala & kot"));
    }

    #[test]
    fn test_resolve_placeholder() {
        let mut parsed = BlockParser::parse_html("<img src='data:image/png;base64,AAA=' alt='x'>").unwrap();
        parsed.resolve_placeholder(0, "/images/2024/marzec/x.png");
        assert_eq!(parsed.blocks[0], ContentBlock::image("/images/2024/marzec/x.png", "x"));
    }
}
