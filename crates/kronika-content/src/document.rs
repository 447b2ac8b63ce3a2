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
//! Abstract rich-text tree.
//!
//! The block parser never touches an HTML library directly. Front ends (see
//! [`crate::html`]) build a [`RichTree`]: an ordered list of top-level nodes,
//! each an element with attributes and children or a run of text.

/// Role a node plays during block extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Paragraph-like container (`<p>`)
    Paragraph,
    /// Image (`<img>`)
    Image,
    /// Anything else; skipped at the top level
    Other,
}

/// A node of the rich-text tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RichNode {
    /// Element with a tag name, attributes and children
    Element {
        /// Lower-cased tag name
        name: String,
        /// Attributes in source order
        attributes: Vec<(String, String)>,
        /// Child nodes in source order
        children: Vec<RichNode>,
    },
    /// Decoded text
    Text(String),
}

impl RichNode {
    /// Element node without children
    pub fn element(name: impl Into<String>, attributes: Vec<(String, String)>) -> Self {
        RichNode::Element {
            name: name.into().to_ascii_lowercase(),
            attributes,
            children: Vec::new(),
        }
    }

    /// Paragraph containing the given children
    pub fn paragraph(children: Vec<RichNode>) -> Self {
        RichNode::Element {
            name: "p".to_string(),
            attributes: Vec::new(),
            children,
        }
    }

    /// Image with the given source and optional alt text
    pub fn image(src: impl Into<String>, alt: Option<&str>) -> Self {
        let mut attributes = vec![("src".to_string(), src.into())];
        if let Some(alt) = alt {
            attributes.push(("alt".to_string(), alt.to_string()));
        }
        RichNode::element("img", attributes)
    }

    /// Text node
    pub fn text(text: impl Into<String>) -> Self {
        RichNode::Text(text.into())
    }

    /// Extraction role of this node
    pub fn kind(&self) -> NodeKind {
        match self {
            RichNode::Element { name, .. } if name == "p" => NodeKind::Paragraph,
            RichNode::Element { name, .. } if name == "img" => NodeKind::Image,
            _ => NodeKind::Other,
        }
    }

    /// Attribute value by name (case-insensitive)
    pub fn attribute(&self, key: &str) -> Option<&str> {
        match self {
            RichNode::Element { attributes, .. } => attributes
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(key))
                .map(|(_, value)| value.as_str()),
            RichNode::Text(_) => None,
        }
    }

    /// Concatenated text of this node and all its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            RichNode::Text(text) => out.push_str(text),
            RichNode::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Image elements below this node, in document order
    pub fn image_descendants(&self) -> Vec<&RichNode> {
        let mut out = Vec::new();
        if let RichNode::Element { children, .. } = self {
            for child in children {
                child.collect_images(&mut out);
            }
        }
        out
    }

    fn collect_images<'a>(&'a self, out: &mut Vec<&'a RichNode>) {
        if self.kind() == NodeKind::Image {
            out.push(self);
        }
        if let RichNode::Element { children, .. } = self {
            for child in children {
                child.collect_images(out);
            }
        }
    }

    /// Mutable access to an element's children
    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<RichNode>> {
        match self {
            RichNode::Element { children, .. } => Some(children),
            RichNode::Text(_) => None,
        }
    }
}

/// Ordered top-level nodes of a rich-text body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichTree {
    /// Top-level nodes in source order
    pub nodes: Vec<RichNode>,
}

impl RichTree {
    /// Tree from top-level nodes
    pub fn new(nodes: Vec<RichNode>) -> Self {
        Self { nodes }
    }
}
