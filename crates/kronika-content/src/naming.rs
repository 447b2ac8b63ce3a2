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
//! Storage addressing for event documents and image assets.
//!
//! Everything an event writes is partitioned by the year and the Polish
//! month name of its event date:
//!
//! - `content/aktualnosci/2024/marzec/spotkanie.json` (document)
//! - `public/images/2024/marzec/spotkanie-1709251200000-0.png` (asset)
//! - `/images/2024/marzec/spotkanie-1709251200000-0.png` (how documents reference it)
//!
//! Asset names fold in a per-operation seed so that re-editing an event never
//! reuses the name of an asset an earlier revision stored.

use crate::error::{ContentError, ContentResult};
use crate::model::ContentBlock;
use chrono::{Datelike, NaiveDate, Utc};

/// Month partition names, indexed by zero-based month
pub const MONTHS: [&str; 12] = [
    "styczen",
    "luty",
    "marzec",
    "kwiecien",
    "maj",
    "czerwiec",
    "lipiec",
    "sierpien",
    "wrzesien",
    "pazdziernik",
    "listopad",
    "grudzien",
];

/// Month partition name for a date
pub fn month_name(date: NaiveDate) -> &'static str {
    MONTHS[date.month0() as usize]
}

/// Turn a title into a storage slug.
///
/// Lower-cases, trims, replaces whitespace runs with `-` and drops anything
/// outside `[a-z0-9-]`. Polish diacritics are folded to ASCII first so they
/// survive as letters instead of being dropped.
///
/// ```
/// use kronika_content::naming::slugify;
///
/// assert_eq!(slugify("Zebrania Rady Rodziców!"), "zebrania-rady-rodzicow");
/// assert_eq!(slugify("  Dzień   Otwarty "), "dzien-otwarty");
/// ```
pub fn slugify(title: &str) -> String {
    let lowered: String = title.trim().chars().map(fold_char).collect::<String>().to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut in_whitespace = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
        }
    }
    slug
}

fn fold_char(c: char) -> char {
    match c {
        'ą' | 'á' | 'à' | 'ä' | 'â' => 'a',
        'Ą' | 'Á' | 'À' | 'Ä' | 'Â' => 'A',
        'ć' | 'č' => 'c',
        'Ć' | 'Č' => 'C',
        'ę' | 'é' | 'è' | 'ë' | 'ê' | 'ě' => 'e',
        'Ę' | 'É' | 'È' | 'Ë' | 'Ê' | 'Ě' => 'E',
        'í' | 'ï' => 'i',
        'Í' | 'Ï' => 'I',
        'ł' => 'l',
        'Ł' => 'L',
        'ń' | 'ň' => 'n',
        'Ń' | 'Ň' => 'N',
        'ó' | 'ö' | 'ô' => 'o',
        'Ó' | 'Ö' | 'Ô' => 'O',
        'ś' | 'š' => 's',
        'Ś' | 'Š' => 'S',
        'ú' | 'ü' | 'ů' => 'u',
        'Ú' | 'Ü' | 'Ů' => 'U',
        'ź' | 'ż' | 'ž' => 'z',
        'Ź' | 'Ż' | 'Ž' => 'Z',
        other => other,
    }
}

/// Map a declared MIME subtype (`png`, `jpeg`, `svg+xml`) to a file extension
pub fn extension_for_subtype(subtype: &str) -> String {
    let subtype = subtype.trim().to_ascii_lowercase();
    match subtype.as_str() {
        "jpeg" | "pjpeg" => "jpg".to_string(),
        "svg+xml" => "svg".to_string(),
        "x-icon" | "vnd.microsoft.icon" => "ico".to_string(),
        other => {
            let cleaned: String = other.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
            if cleaned.is_empty() {
                "bin".to_string()
            } else {
                cleaned
            }
        }
    }
}

/// Make an uploaded file name safe to use as a path component
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let folded: String = base.trim().chars().map(fold_char).collect::<String>().to_lowercase();
    let cleaned: String = folded
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'))
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "upload.bin".to_string()
    } else {
        cleaned
    }
}

/// Source of the per-operation naming seed.
///
/// Production code uses wall-clock milliseconds; tests inject a fixed value
/// so parsing and naming are reproducible.
pub trait SeedSource: Send + Sync {
    /// Seed for the next publish operation
    fn next_seed(&self) -> u64;
}

/// Seeds from the current UTC time in milliseconds
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockSeed;

impl SeedSource for ClockSeed {
    fn next_seed(&self) -> u64 {
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
    }
}

/// Always returns the same seed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSeed(pub u64);

impl SeedSource for FixedSeed {
    fn next_seed(&self) -> u64 {
        self.0
    }
}

/// Storage and public locations of one asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLocation {
    /// Path inside the repository (`public/images/...`)
    pub storage_path: String,
    /// Path referenced from documents (`/images/...`)
    pub public_path: String,
}

/// Derives document and asset paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetNamer {
    content_root: String,
    category: String,
    images_root: String,
    public_prefix: String,
}

impl Default for AssetNamer {
    fn default() -> Self {
        Self::new("content", "aktualnosci", "public/images", "/images")
    }
}

impl AssetNamer {
    /// Create a namer with explicit roots
    pub fn new(
        content_root: impl Into<String>,
        category: impl Into<String>,
        images_root: impl Into<String>,
        public_prefix: impl Into<String>,
    ) -> Self {
        Self {
            content_root: content_root.into().trim_matches('/').to_string(),
            category: category.into().trim_matches('/').to_string(),
            images_root: images_root.into().trim_matches('/').to_string(),
            public_prefix: format!("/{}", public_prefix.into().trim_matches('/')),
        }
    }

    /// Namer for a different category under the same roots
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into().trim_matches('/').to_string();
        self
    }

    /// Category documents are filed under
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Canonical document path for an event
    pub fn document_path(&self, event_date: NaiveDate, title: &str) -> ContentResult<String> {
        let slug = slugify(title);
        if slug.is_empty() {
            return Err(ContentError::UnusableTitle(title.to_string()));
        }
        Ok(format!(
            "{}/{}/{}/{}/{}.json",
            self.content_root,
            self.category,
            event_date.year(),
            month_name(event_date),
            slug
        ))
    }

    /// Location for an inline image extracted from the body.
    ///
    /// `sequence` is the image's position in extraction order, which keeps
    /// names unique within one parse.
    pub fn inline_image(
        &self,
        event_date: NaiveDate,
        title: &str,
        seed: u64,
        sequence: usize,
        mime_subtype: &str,
    ) -> AssetLocation {
        let file_name = format!(
            "{}-{}-{}.{}",
            slugify(title),
            seed,
            sequence,
            extension_for_subtype(mime_subtype)
        );
        self.locate(event_date, &file_name)
    }

    /// Location for an uploaded image file
    pub fn uploaded_image(
        &self,
        event_date: NaiveDate,
        seed: u64,
        sequence: usize,
        original_name: &str,
    ) -> AssetLocation {
        let file_name = format!("{}-{}-{}", seed, sequence, sanitize_file_name(original_name));
        self.locate(event_date, &file_name)
    }

    fn locate(&self, event_date: NaiveDate, file_name: &str) -> AssetLocation {
        let partition = format!("{}/{}/{}", event_date.year(), month_name(event_date), file_name);
        AssetLocation {
            storage_path: format!("{}/{}", self.images_root, partition),
            public_path: format!("{}/{}", self.public_prefix, partition),
        }
    }

    /// Storage path for a public image reference, `None` for external URLs
    /// and paths outside the managed image tree.
    pub fn storage_path_for(&self, public_path: &str) -> Option<String> {
        let rest = public_path.strip_prefix(&self.public_prefix)?;
        let rest = rest.strip_prefix('/')?;
        if rest.is_empty() || rest.split('/').any(|seg| seg.is_empty() || seg == "..") {
            return None;
        }
        Some(format!("{}/{}", self.images_root, rest))
    }

    /// Public reference for a stored asset path
    pub fn public_path_for(&self, storage_path: &str) -> Option<String> {
        let rest = storage_path.strip_prefix(&self.images_root)?.strip_prefix('/')?;
        Some(format!("{}/{}", self.public_prefix, rest))
    }

    /// Normalize an existing-event reference to a canonical document path.
    ///
    /// Accepts the canonical form (`content/aktualnosci/2024/marzec/a.json`)
    /// as well as the short form the admin UI sends
    /// (`aktualnosci/2024/marzec/a`).
    pub fn normalize_document_path(&self, reference: &str) -> ContentResult<String> {
        let trimmed = reference.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(ContentError::MissingField("path"));
        }
        if trimmed.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
            return Err(ContentError::invalid_path(reference));
        }
        let rooted = if trimmed.starts_with(&format!("{}/", self.content_root)) {
            trimmed.to_string()
        } else {
            format!("{}/{}", self.content_root, trimmed)
        };
        if rooted.ends_with(".json") {
            Ok(rooted)
        } else {
            Ok(format!("{rooted}.json"))
        }
    }
}

/// Pick the event thumbnail.
///
/// An explicit `main_image_order` that hits an image block wins. Otherwise a
/// previously stored thumbnail is carried forward only while the new content
/// still references it.
pub fn resolve_thumbnail(
    blocks: &[ContentBlock],
    main_image_order: Option<usize>,
    previous: Option<&str>,
) -> String {
    if let Some(index) = main_image_order {
        if let Some(src) = blocks.iter().filter_map(ContentBlock::image_src).nth(index) {
            return src.to_string();
        }
    }
    match previous {
        Some(prev)
            if !prev.is_empty()
                && blocks.iter().filter_map(ContentBlock::image_src).any(|src| src == prev) =>
        {
            prev.to_string()
        }
        _ => String::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_slug_examples() {
        assert_eq!(slugify("Zebrania Rady Rodziców!"), "zebrania-rady-rodzicow");
        assert_eq!(slugify("Spotkanie"), "spotkanie");
        assert_eq!(slugify("Bal 2024\t\tw  szkole"), "bal-2024-w-szkole");
        assert_eq!(slugify("Żółć"), "zolc");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_name(date(2024, 1, 31)), "styczen");
        assert_eq!(month_name(date(2024, 3, 5)), "marzec");
        assert_eq!(month_name(date(2024, 12, 1)), "grudzien");
    }

    #[test]
    fn test_document_path() {
        let namer = AssetNamer::default();
        assert_eq!(
            namer.document_path(date(2024, 3, 5), "Spotkanie").unwrap(),
            "content/aktualnosci/2024/marzec/spotkanie.json"
        );
        assert!(matches!(
            namer.document_path(date(2024, 3, 5), "???"),
            Err(ContentError::UnusableTitle(_))
        ));
    }

    #[test]
    fn test_inline_image_location() {
        let namer = AssetNamer::default();
        let loc = namer.inline_image(date(2024, 3, 5), "Spotkanie", 42, 1, "jpeg");
        assert_eq!(loc.storage_path, "public/images/2024/marzec/spotkanie-42-1.jpg");
        assert_eq!(loc.public_path, "/images/2024/marzec/spotkanie-42-1.jpg");
    }

    #[test]
    fn test_uploaded_image_location() {
        let namer = AssetNamer::default();
        let loc = namer.uploaded_image(date(2024, 10, 2), 7, 0, "C:\\Zdjęcia\\Mój Plakat.PNG");
        assert_eq!(loc.public_path, "/images/2024/pazdziernik/7-0-moj-plakat.png");
    }

    #[test]
    fn test_path_conversion() {
        let namer = AssetNamer::default();
        assert_eq!(
            namer.storage_path_for("/images/2024/marzec/a.png").as_deref(),
            Some("public/images/2024/marzec/a.png")
        );
        assert_eq!(namer.storage_path_for("https://example.com/a.png"), None);
        assert_eq!(namer.storage_path_for("/images/../secret"), None);
        assert_eq!(
            namer.public_path_for("public/images/2024/marzec/a.png").as_deref(),
            Some("/images/2024/marzec/a.png")
        );
    }

    #[test]
    fn test_extension_mapping() {
        assert_eq!(extension_for_subtype("png"), "png");
        assert_eq!(extension_for_subtype("JPEG"), "jpg");
        assert_eq!(extension_for_subtype("svg+xml"), "svg");
        assert_eq!(extension_for_subtype("???"), "bin");
    }

    #[test]
    fn test_normalize_document_path() {
        let namer = AssetNamer::default();
        let canonical = "content/aktualnosci/2024/marzec/a.json";
        assert_eq!(namer.normalize_document_path(canonical).unwrap(), canonical);
        assert_eq!(namer.normalize_document_path("aktualnosci/2024/marzec/a").unwrap(), canonical);
        assert_eq!(namer.normalize_document_path("/aktualnosci/2024/marzec/a.json").unwrap(), canonical);
        assert!(namer.normalize_document_path("").is_err());
        assert!(namer.normalize_document_path("aktualnosci/../x").is_err());
    }

    #[test]
    fn test_thumbnail_by_index() {
        let blocks = vec![
            ContentBlock::paragraph("a"),
            ContentBlock::image("/images/1.png", "x"),
            ContentBlock::image("/images/2.png", "y"),
        ];
        assert_eq!(resolve_thumbnail(&blocks, Some(1), None), "/images/2.png");
        assert_eq!(resolve_thumbnail(&blocks, Some(5), None), "");
        assert_eq!(resolve_thumbnail(&blocks, None, None), "");
    }

    #[test]
    fn test_thumbnail_carry_forward() {
        let blocks = vec![ContentBlock::image("/images/1.png", "x")];
        assert_eq!(resolve_thumbnail(&blocks, None, Some("/images/1.png")), "/images/1.png");
        assert_eq!(resolve_thumbnail(&blocks, None, Some("/images/gone.png")), "");
        assert_eq!(resolve_thumbnail(&blocks, Some(0), Some("/images/gone.png")), "/images/1.png");
    }
}
