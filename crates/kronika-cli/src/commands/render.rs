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
use super::event::read_body;
use crate::{context, output};
use anyhow::Result;
use clap::Parser;
use kronika_config::Config;
use kronika_content::{compose_event, BlockParser, ContentBlock, EventInput};
use serde_json::{json, Value};
use std::path::PathBuf;

/// Preview the document an HTML body would produce, without publishing
///
/// With `--title` and `--event-date` the full event is composed, including
/// its storage path and asset names. Otherwise only the content blocks are
/// shown and inline images appear as `inline:<n>`.
#[derive(Parser, Debug)]
pub struct RenderCmd {
    /// HTML file; `-` reads stdin
    #[arg(value_name = "HTML_FILE")]
    pub file: PathBuf,

    /// Event title
    #[arg(short, long, requires = "event_date")]
    pub title: Option<String>,

    /// Event date (YYYY-MM-DD)
    #[arg(short = 'd', long, value_name = "DATE", requires = "title")]
    pub event_date: Option<String>,

    /// Publication date (YYYY-MM-DD), defaults to the event date
    #[arg(short, long, value_name = "DATE")]
    pub publish_date: Option<String>,

    /// Seed used in asset names, for reproducible output
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

impl RenderCmd {
    pub async fn execute(self, config: &Config) -> Result<()> {
        let body = read_body(Some(&self.file)).await?;
        let preview = match (self.title, self.event_date) {
            (Some(title), Some(event_date)) => {
                let publish_date = self.publish_date.unwrap_or_else(|| event_date.clone());
                let input = EventInput::new(title, event_date, publish_date, body);
                compose_preview(config, &input, self.seed)?
            }
            _ => blocks_preview(&body)?,
        };
        output::json(&preview)
    }
}

fn compose_preview(config: &Config, input: &EventInput, seed: u64) -> Result<Value> {
    let namer = context::namer(&config.content);
    let event = compose_event(&namer, input, seed, None)?;
    let assets: Vec<Value> = event
        .assets
        .iter()
        .map(|asset| {
            json!({
                "storagePath": asset.storage_path,
                "publicPath": asset.public_path,
                "bytes": asset.bytes.len()
            })
        })
        .collect();
    Ok(json!({
        "path": event.path,
        "document": event.document,
        "assets": assets
    }))
}

fn blocks_preview(body: &str) -> Result<Value> {
    let mut parsed = BlockParser::parse_html(body)?;
    let placeholders: Vec<usize> = parsed.images.iter().map(|i| i.placeholder_index).collect();
    for (n, index) in placeholders.into_iter().enumerate() {
        parsed.resolve_placeholder(index, &format!("inline:{n}"));
    }
    let content: &[ContentBlock] = &parsed.blocks;
    Ok(json!({ "content": content }))
}
