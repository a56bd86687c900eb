use std::path::{Path, PathBuf};

mod map;
mod refs;
mod terminal;
mod validate;

use anyhow::Context;
use clap::ArgAction;
use map::Map;
use refs::Refs;
use topicmap::{Config, TopicId};
use tracing::instrument;
use validate::Validate;

/// Parse a topic ID from a command-line argument.
fn parse_topic_id(s: &str) -> Result<TopicId, String> {
    s.parse().map_err(|e| format!("{e}"))
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML configuration file (defaults are used if omitted)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?,
            None => Config::default(),
        };

        self.command.run(&config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        // Stdout carries command output.
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show the topic hierarchy of a document
    Map(Map),

    /// List the cross-references of a document
    Refs(Refs),

    /// Check documents for structural problems
    ///
    /// Exits with status 2 if any warning or error is found.
    Validate(Validate),

    /// Write a configuration file with the default settings
    Init(Init),
}

impl Command {
    fn run(self, config: &Config) -> anyhow::Result<()> {
        match self {
            Self::Map(command) => command.run(config)?,
            Self::Refs(command) => command.run(config)?,
            Self::Validate(command) => command.run(config)?,
            Self::Init(command) => command.run()?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Init {
    /// Where to write the configuration file
    #[arg(default_value = "topicmap.toml")]
    path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

impl Init {
    #[instrument(level = "debug")]
    fn run(&self) -> anyhow::Result<()> {
        write_default_config(&self.path, self.force)?;
        println!("Wrote default configuration to {}", self.path.display());
        Ok(())
    }
}

fn write_default_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    Config::default()
        .save(path)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn command_line_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "topicmap", "map", "doc.txt", "-vv", "--config", "custom.toml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Command::Map(_)));
    }

    #[test]
    fn validate_requires_a_path() {
        assert!(Cli::try_parse_from(["topicmap", "validate"]).is_err());
        assert!(Cli::try_parse_from(["topicmap", "validate", "a.txt", "docs"]).is_ok());
    }

    #[test]
    fn topic_argument_is_validated() {
        assert!(Cli::try_parse_from(["topicmap", "map", "doc.txt", "--topic", "2.1.a"]).is_ok());
        assert!(Cli::try_parse_from(["topicmap", "map", "doc.txt", "--topic", "2.a.1"]).is_err());
    }

    #[test]
    fn init_writes_loadable_defaults() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("topicmap.toml");

        write_default_config(&path, false).unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());

        let error = write_default_config(&path, false).unwrap_err();
        assert!(error.to_string().contains("already exists"));
        write_default_config(&path, true).unwrap();
    }
}
