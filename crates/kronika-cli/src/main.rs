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
//! `kronika`: publish, update and delete events from the command line.

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use commands::*;
use kronika_config::Config;
use kronika_observability::{init_tracing_with_config, LogConfig, LogFormat};
use kronika_publisher::{ErrorKind, PublishError};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kronika")]
#[command(version, about = "Publish events to a GitHub-hosted site")]
#[command(
    long_about = "Kronika turns an HTML event description into a JSON document plus image files
and commits them to a GitHub repository in a single commit."
)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: kronika.toml, .yaml, .yml or .json in the current directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format (pretty|compact|json), overrides the configuration
    #[arg(long, global = true, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    /// Colored output (always|auto|never)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a new event
    Add(AddCmd),

    /// Replace a published event
    Update(UpdateCmd),

    /// Delete an event and its images
    Delete(DeleteCmd),

    /// Show a published event
    Show(ShowCmd),

    /// Preview the document for an HTML body without publishing
    Render(RenderCmd),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.color.as_str() {
        "never" => console::set_colors_enabled(false),
        "always" => console::set_colors_enabled(true),
        "auto" => {}
        _ => {
            output::error(&format!("Invalid color option: {}", cli.color));
            std::process::exit(2);
        }
    }

    if let Commands::Completions { shell } = cli.command {
        generate_completions(shell);
        return Ok(());
    }

    let config = match context::load_config(cli.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            output::error(&format!("Error: {e:#}"));
            std::process::exit(1);
        }
    };
    init_logging(&cli, &config);

    let result = match cli.command {
        Commands::Add(cmd) => cmd.execute(&config).await,
        Commands::Update(cmd) => cmd.execute(&config).await,
        Commands::Delete(cmd) => cmd.execute(&config).await,
        Commands::Show(cmd) => cmd.execute(&config).await,
        Commands::Render(cmd) => cmd.execute(&config).await,
        Commands::Completions { .. } => Ok(()),
    };

    if let Err(e) = result {
        report(&e);
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.observability.log_level.clone()
    };
    let log_config = LogConfig::new()
        .with_format(cli.log_format.unwrap_or(config.observability.log_format))
        .with_level(level)
        .with_color(console::colors_enabled_stderr())
        .with_targets(cli.verbose);

    if let Err(e) = init_tracing_with_config(log_config) {
        output::warning(&format!("Logging disabled: {e}"));
    }
}

fn report(error: &anyhow::Error) {
    output::error(&format!("Error: {error:#}"));
    let Some(publish) = error.downcast_ref::<PublishError>() else {
        return;
    };
    match publish.kind() {
        ErrorKind::Conflict => {
            output::hint("the branch or file changed meanwhile; run the command again")
        }
        ErrorKind::NotFound => output::hint("check the title, date or path with `kronika show`"),
        ErrorKind::Remote if publish.is_transient() => {
            output::hint("the remote did not respond; nothing was published, retry later")
        }
        ErrorKind::Validation | ErrorKind::Remote => {}
    }
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "kronika", &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let Ok(cli) = Cli::try_parse_from([
            "kronika",
            "delete",
            "--title",
            "Spotkanie",
            "--date",
            "2024-03-05",
            "--log-format",
            "json",
            "-q",
        ]) else {
            panic!("delete arguments should parse");
        };
        assert!(cli.quiet);
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert!(matches!(cli.command, Commands::Delete(_)));
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["kronika", "-v", "-q", "render", "body.html"]).is_err());
    }

    #[test]
    fn test_repeated_uploads() {
        let Ok(cli) = Cli::try_parse_from([
            "kronika", "add", "-t", "Spotkanie", "-d", "2024-03-05", "-p", "2024-03-01",
            "-u", "a.jpg", "--upload", "b.png",
        ]) else {
            panic!("add arguments should parse");
        };
        let Commands::Add(add) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(add.event.uploads.len(), 2);
        assert!(add.event.body.is_none());
    }
}
