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
//! Consistent terminal output for every `kronika` command.
//!
//! Results go to stdout, problems to stderr; logs from `tracing` also go to
//! stderr, so stdout stays clean for `--json` output and pipes.

use console::style;
use kronika_publisher::PublishSummary;

/// Print a success message with a green check mark.
pub fn success(msg: &str) {
    println!("{} {}", style("✔").green().bold(), msg);
}

/// Print an error message to stderr with a red cross.
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✘").red().bold(), msg);
}

/// Print a hint to stderr below an error.
pub fn hint(msg: &str) {
    eprintln!("  {} {}", style("hint:").yellow(), msg);
}

/// Print a warning to stderr.
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), msg);
}

/// Print a key-value detail line with the value highlighted.
///
/// ```text
///   Path: content/aktualnosci/2024/marzec/spotkanie.json
/// ```
pub fn detail(key: &str, value: &str) {
    println!("  {}: {}", key, style(value).cyan());
}

/// Print a bold section header.
pub fn header(msg: &str) {
    println!("{}", style(msg).bold());
}

/// Print the outcome of a publish operation.
pub fn summary(summary: &PublishSummary) {
    success(&summary.message);
    detail("Path", &summary.path);
    if let Some(from) = &summary.relocated_from {
        detail("Moved from", from);
    }
    if let Some(commit) = &summary.commit {
        detail("Commit", commit);
    }
    for image in &summary.images_written {
        detail("Wrote", image);
    }
    for image in &summary.images_removed {
        detail("Removed", image);
    }
}

/// Print any serializable value as pretty JSON on stdout.
pub fn json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
