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
use kronika_config::Config;

/// Delete a published event and its images
#[derive(Parser, Debug)]
pub struct DeleteCmd {
    /// Event title
    #[arg(short, long)]
    pub title: String,

    /// Date whose year/month directory holds the event (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE")]
    pub date: String,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl DeleteCmd {
    pub async fn execute(self, config: &Config) -> Result<()> {
        let publisher = context::publisher(config)?;
        let summary = publisher.delete(&self.title, &self.date).await?;

        if self.json {
            output::json(&summary)
        } else {
            output::summary(&summary);
            Ok(())
        }
    }
}
