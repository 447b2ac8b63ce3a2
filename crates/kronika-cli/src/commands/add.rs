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

/// Publish a new event
#[derive(Parser, Debug)]
pub struct AddCmd {
    #[command(flatten)]
    pub event: EventArgs,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl AddCmd {
    pub async fn execute(self, config: &Config) -> Result<()> {
        let publisher = context::publisher(config)?;
        let input = self.event.into_input().await?;
        let summary = publisher.add(&input).await?;

        if self.json {
            output::json(&summary)
        } else {
            output::summary(&summary);
            Ok(())
        }
    }
}
