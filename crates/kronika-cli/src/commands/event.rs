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
use anyhow::{Context, Result};
use clap::Args;
use kronika_content::{EventInput, UploadedImage};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Event fields shared by `add` and `update`
#[derive(Args, Debug, Clone)]
pub struct EventArgs {
    /// Event title
    #[arg(short, long)]
    pub title: String,

    /// Event date (YYYY-MM-DD); picks the year/month directory
    #[arg(short = 'd', long, value_name = "DATE")]
    pub event_date: String,

    /// Publication date (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE")]
    pub publish_date: String,

    /// HTML body file; `-` or omitted reads stdin
    #[arg(short, long, value_name = "FILE")]
    pub body: Option<PathBuf>,

    /// Level-1 heading placed before the body
    #[arg(long, value_name = "TEXT")]
    pub main_heading: Option<String>,

    /// Level-2 heading placed before the body
    #[arg(long, value_name = "TEXT")]
    pub sub_heading: Option<String>,

    /// Level-3 heading placed before the body
    #[arg(long, value_name = "TEXT")]
    pub section_heading: Option<String>,

    /// Zero-based index of the image used as thumbnail
    #[arg(long, value_name = "INDEX")]
    pub main_image: Option<usize>,

    /// Image file appended after the body (repeatable)
    #[arg(short, long = "upload", value_name = "FILE")]
    pub uploads: Vec<PathBuf>,
}

impl EventArgs {
    /// Read the body and uploads and assemble the publisher input
    pub async fn into_input(self) -> Result<EventInput> {
        let body = read_body(self.body.as_deref()).await?;
        let mut input = EventInput::new(self.title, self.event_date, self.publish_date, body);
        input.main_heading = self.main_heading;
        input.sub_heading = self.sub_heading;
        input.section_heading = self.section_heading;
        input.main_image_order = self.main_image;
        for path in &self.uploads {
            input.uploads.push(read_upload(path).await?);
        }
        Ok(input)
    }
}

/// Read an HTML body from a file, or from stdin for `None` and `-`
pub async fn read_body(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read body from {}", path.display())),
        _ => {
            let mut body = String::new();
            tokio::io::stdin()
                .read_to_string(&mut body)
                .await
                .context("Failed to read body from stdin")?;
            Ok(body)
        }
    }
}

/// Load an image file as an upload named after the file
pub async fn read_upload(path: &Path) -> Result<UploadedImage> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Upload path has no usable file name: {}", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read upload {}", path.display()))?;
    Ok(UploadedImage::new(file_name, bytes))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(dir: &TempDir) -> EventArgs {
        let body = dir.path().join("body.html");
        std::fs::write(&body, "<p>Witamy</p>").unwrap();
        let photo = dir.path().join("zdjecie.jpg");
        std::fs::write(&photo, [0xFF, 0xD8, 0xFF]).unwrap();
        EventArgs {
            title: "Spotkanie".to_string(),
            event_date: "2024-03-05".to_string(),
            publish_date: "2024-03-01".to_string(),
            body: Some(body),
            main_heading: Some("Zaproszenie".to_string()),
            sub_heading: None,
            section_heading: None,
            main_image: Some(0),
            uploads: vec![photo],
        }
    }

    #[tokio::test]
    async fn test_into_input_reads_files() {
        let dir = TempDir::new().unwrap();
        let input = args(&dir).into_input().await.unwrap();

        assert_eq!(input.body.as_deref(), Some("<p>Witamy</p>"));
        assert_eq!(input.main_heading.as_deref(), Some("Zaproszenie"));
        assert_eq!(input.main_image_order, Some(0));
        assert_eq!(input.uploads.len(), 1);
        assert_eq!(input.uploads[0].file_name, "zdjecie.jpg");
        assert_eq!(input.uploads[0].bytes, vec![0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn test_missing_upload_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut args = args(&dir);
        args.uploads.push(dir.path().join("brak.png"));
        let err = args.into_input().await.unwrap_err();
        assert!(err.to_string().contains("brak.png"));
    }

    #[tokio::test]
    async fn test_missing_body_file_is_reported() {
        let err = read_body(Some(Path::new("/nonexistent/body.html")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("body.html"));
    }
}
