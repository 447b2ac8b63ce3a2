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
//! Configuration for Kronika.
//!
//! Settings come from an optional TOML, YAML or JSON file, then environment
//! overrides with the `KRONIKA_` prefix (the bare `GITHUB_OWNER`,
//! `GITHUB_REPO` and `GITHUB_TOKEN` are honoured as a fallback), then
//! validation.
//!
//! # Example
//!
//! ```no_run
//! use kronika_config::ConfigLoader;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new()
//!         .load(Some(Path::new("kronika.toml")))
//!         .await?;
//!     config.remote.require_credentials()?;
//!
//!     println!("Publishing to {} ({})", config.remote.slug(), config.remote.branch);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader};
pub use schema::*;
pub use validation::Validator;
