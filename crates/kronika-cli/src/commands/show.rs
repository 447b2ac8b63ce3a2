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
use crate::{context, output};
use anyhow::Result;
use clap::Parser;
use console::style;
use kronika_config::Config;
use kronika_content::{ContentBlock, EventDocument};

/// Show a published event
#[derive(Parser, Debug)]
pub struct ShowCmd {
    /// Stored document, canonical or short form
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Print the stored JSON document
    #[arg(long)]
    pub json: bool,
}

impl ShowCmd {
    pub async fn execute(self, config: &Config) -> Result<()> {
        let publisher = context::publisher(config)?;
        let (path, document) = publisher.load(&self.path).await?;

        if self.json {
            return output::json(&document);
        }
        print_document(&path, &document);
        Ok(())
    }
}

fn print_document(path: &str, document: &EventDocument) {
    output::header(&document.title);
    output::detail("Path", path);
    output::detail("Event date", &document.event_date.to_string());
    output::detail("Published", &document.publish_date.to_string());
    if !document.thumbnail.is_empty() {
        output::detail("Thumbnail", &document.thumbnail);
    }
    println!();
    for block in &document.content {
        match block {
            ContentBlock::Heading { level, text } => {
                println!("{} {}", style("#".repeat(usize::from(*level))).dim(), style(text).bold());
            }
            ContentBlock::Paragraph { text } => println!("{text}"),
            ContentBlock::Image { src, alt } => {
                println!("{} {} ({})", style("[image]").magenta(), src, alt);
            }
        }
        println!();
    }
}
