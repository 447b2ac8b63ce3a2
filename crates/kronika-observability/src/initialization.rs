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
//! Global subscriber installation.

use crate::config::{LogConfig, LogError, LogFormat, LogOutput};
use std::io;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Initialize tracing with a format and an optional filter.
///
/// `level` of `None` defers to `RUST_LOG`, then `info`.
///
/// # Example
///
/// ```no_run
/// use kronika_observability::{init_tracing, LogFormat};
///
/// init_tracing(LogFormat::Compact, Some("debug")).unwrap();
/// tracing::info!("publisher ready");
/// ```
pub fn init_tracing(format: LogFormat, level: Option<&str>) -> Result<(), LogError> {
    let mut config = LogConfig::new().with_format(format);
    if let Some(level) = level {
        config = config.with_level(level);
    }
    init_tracing_with_config(config)
}

/// Initialize tracing with a detailed configuration.
///
/// # Errors
///
/// - [`LogError::InvalidFilter`] if the filter does not parse
/// - [`LogError::AlreadyInitialized`] if a global subscriber exists
pub fn init_tracing_with_config(config: LogConfig) -> Result<(), LogError> {
    let filter = build_env_filter(&config)?;
    Registry::default()
        .with(build_layer(&config).with_filter(filter))
        .try_init()
        .map_err(|e| LogError::AlreadyInitialized(e.to_string()))
}

fn build_layer(config: &LogConfig) -> BoxedLayer {
    let spans = if config.span_timings {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let base = fmt::layer()
        .with_writer(get_writer(config.output))
        .with_target(config.include_targets)
        .with_span_events(spans);

    match (config.format, config.use_timestamps) {
        (LogFormat::Pretty, true) => base.pretty().with_ansi(config.use_color).boxed(),
        (LogFormat::Pretty, false) => base
            .pretty()
            .without_time()
            .with_ansi(config.use_color)
            .boxed(),
        (LogFormat::Compact, true) => base.compact().with_ansi(config.use_color).boxed(),
        (LogFormat::Compact, false) => base
            .compact()
            .without_time()
            .with_ansi(config.use_color)
            .boxed(),
        (LogFormat::Json, true) => base.json().with_ansi(false).boxed(),
        (LogFormat::Json, false) => base.json().without_time().with_ansi(false).boxed(),
    }
}

/// Get the writer for the specified output
fn get_writer(output: LogOutput) -> fn() -> Box<dyn io::Write + Send> {
    match output {
        LogOutput::Stderr => || Box::new(io::stderr()),
        LogOutput::Stdout => || Box::new(io::stdout()),
    }
}

/// Build an environment filter for the given configuration
fn build_env_filter(config: &LogConfig) -> Result<EnvFilter, LogError> {
    let level = config.effective_level();
    EnvFilter::try_new(&level).map_err(|e| LogError::InvalidFilter {
        filter: level.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Installing the global subscriber is covered once in tests/; it can only
    // happen once per process.

    #[test]
    fn test_env_filter_parsing() {
        assert!(build_env_filter(&LogConfig::new().with_level("debug")).is_ok());
        assert!(build_env_filter(&LogConfig::new().with_level("kronika_publisher=trace,warn")).is_ok());
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let err = build_env_filter(&LogConfig::new().with_level("kronika=notalevel")).unwrap_err();
        assert!(matches!(err, LogError::InvalidFilter { .. }));
    }

    #[test]
    fn test_every_format_builds_a_layer() {
        for format in [LogFormat::Pretty, LogFormat::Compact, LogFormat::Json] {
            for timestamps in [true, false] {
                let config = LogConfig::new()
                    .with_format(format)
                    .with_timestamps(timestamps);
                let _layer = build_layer(&config);
            }
        }
    }
}
