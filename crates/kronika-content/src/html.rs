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
//! HTML front end for the block parser.
//!
//! Builds a [`RichTree`] from an HTML fragment using `lol_html`'s streaming
//! handlers: every start tag opens an element, its end-tag handler closes it,
//! and void elements (`<img>`, `<br>`) attach immediately. A block-level start
//! tag ends an open `<p>` the way browsers do. Text is collected
//! raw and entity-decoded once the stream is done, so entities split across
//! chunks still decode.

use crate::document::{RichNode, RichTree};
use crate::error::{ContentError, ContentResult};
use lol_html::html_content::EndTag;
use lol_html::{doc_text, element, rewrite_str, RewriteStrSettings};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct TreeBuilder {
    roots: Vec<RichNode>,
    open: Vec<RichNode>,
}

/// Start tags that end an open `<p>`, as in the HTML parsing algorithm
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hgroup", "hr", "main", "menu", "nav", "ol", "p", "pre", "section", "table", "ul",
];

fn is_named(node: &RichNode, tag: &str) -> bool {
    matches!(node, RichNode::Element { name, .. } if name.eq_ignore_ascii_case(tag))
}

impl TreeBuilder {
    fn current_children(&mut self) -> &mut Vec<RichNode> {
        match self.open.last_mut().and_then(RichNode::children_mut) {
            Some(children) => children,
            None => &mut self.roots,
        }
    }

    fn attach(&mut self, node: RichNode) {
        self.close_paragraph_before(&node);
        self.current_children().push(node);
    }

    fn open(&mut self, node: RichNode) {
        self.close_paragraph_before(&node);
        self.open.push(node);
    }

    fn close_paragraph_before(&mut self, node: &RichNode) {
        if CLOSES_PARAGRAPH.iter().any(|tag| is_named(node, tag)) {
            self.close("p");
        }
    }

    /// Close the innermost open `tag` and everything opened inside it.
    /// End tags with nothing to match are ignored.
    fn close(&mut self, tag: &str) {
        let Some(depth) = self.open.iter().rposition(|node| is_named(node, tag)) else {
            return;
        };
        while self.open.len() > depth {
            self.close_innermost();
        }
    }

    fn close_innermost(&mut self) {
        if let Some(node) = self.open.pop() {
            let parent = match self.open.last_mut().and_then(RichNode::children_mut) {
                Some(children) => children,
                None => &mut self.roots,
            };
            parent.push(node);
        }
    }

    fn push_text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let children = self.current_children();
        if let Some(RichNode::Text(existing)) = children.last_mut() {
            existing.push_str(raw);
        } else {
            children.push(RichNode::Text(raw.to_string()));
        }
    }

    fn finish(&mut self) -> RichTree {
        // Unclosed elements are closed at end of input.
        while !self.open.is_empty() {
            self.close_innermost();
        }
        let mut nodes = std::mem::take(&mut self.roots);
        for node in &mut nodes {
            decode_text_nodes(node);
        }
        RichTree::new(nodes)
    }
}

fn decode_text_nodes(node: &mut RichNode) {
    match node {
        RichNode::Text(text) => *text = decode_entities(text),
        RichNode::Element { children, .. } => children.iter_mut().for_each(decode_text_nodes),
    }
}

/// Parse an HTML fragment into a rich-text tree
pub fn parse_html(html: &str) -> ContentResult<RichTree> {
    let builder = Rc::new(RefCell::new(TreeBuilder::default()));
    let on_element = Rc::clone(&builder);
    let on_text = Rc::clone(&builder);

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("*", move |el| {
                let attributes = el
                    .attributes()
                    .iter()
                    .map(|attr| (attr.name(), decode_entities(&attr.value())))
                    .collect();
                let node = RichNode::element(el.tag_name(), attributes);

                match el.end_tag_handlers() {
                    Some(handlers) => {
                        on_element.borrow_mut().open(node);
                        let closer = Rc::clone(&on_element);
                        handlers.push(Box::new(move |end: &mut EndTag<'_>| {
                            closer.borrow_mut().close(&end.name());
                            Ok(())
                        }));
                    }
                    None => on_element.borrow_mut().attach(node),
                }
                Ok(())
            })],
            document_content_handlers: vec![doc_text!(move |chunk| {
                on_text.borrow_mut().push_text(chunk.as_str());
                Ok(())
            })],
            strict: false,
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| ContentError::MalformedBody(e.to_string()))?;

    let tree = builder.borrow_mut().finish();
    Ok(tree)
}

/// Decode the HTML character references that show up in editor output
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&end| end <= 12)
            .and_then(|end| decode_reference(&tail[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        "laquo" => '«',
        "raquo" => '»',
        "bdquo" => '„',
        "rdquo" => '”',
        "oacute" => 'ó',
        "Oacute" => 'Ó',
        _ => return None,
    };
    Some(c)
}
