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
use super::event::EventArgs;
use crate::{context, output};
use anyhow::Result;
use clap::Parser;
use kronika_config::Config;

/// Replace a published event
///
/// Changing the title or event date moves the document; images the new
/// version no longer references are removed afterwards.
#[derive(Parser, Debug)]
pub struct UpdateCmd {
    /// Stored document, as `content/.../slug.json` or `aktualnosci/2024/marzec/slug`
    #[arg(value_name = "PATH")]
    pub path: String,

    #[command(flatten)]
    pub event: EventArgs,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl UpdateCmd {
    pub async fn execute(self, config: &Config) -> Result<()> {
        let publisher = context::publisher(config)?;
        let input = self.event.into_input().await?;
        let summary = publisher.update(&input, &self.path).await?;

        if self.json {
            output::json(&summary)
        } else {
            output::summary(&summary);
            Ok(())
        }
    }
}
