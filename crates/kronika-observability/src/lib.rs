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
//! Kronika observability
//!
//! Installs the process-wide `tracing` subscriber used by the CLI. Library
//! crates only emit events through `tracing` macros; this crate decides where
//! they go and how they look.
//!
//! - **Formats**: pretty, compact, JSON ([`LogFormat`])
//! - **Filtering**: `EnvFilter` directives from config or `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use kronika_observability::{init_tracing_with_config, LogConfig, LogFormat};
//!
//! let config = LogConfig::new()
//!     .with_format(LogFormat::Json)
//!     .with_level("kronika_publisher=debug,info");
//! init_tracing_with_config(config).unwrap();
//! tracing::info!("started");
//! ```

pub mod config;
pub mod initialization;

pub use config::{LogConfig, LogError, LogFormat, LogOutput, DEFAULT_LEVEL};
pub use initialization::{init_tracing, init_tracing_with_config};
