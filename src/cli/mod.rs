//! CLI module for qotd.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// qotd - Quote of the Day AI
///
/// Serves inspiring quotes found by a local language model with web search.
#[derive(Parser, Debug)]
#[command(name = "qotd")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "QOTD_CONFIG")]
    pub config: Option<String>,

    /// Base URL of the OpenAI-compatible model API (overrides config)
    #[arg(long, global = true, env = "QOTD_LLM_URL")]
    pub llm_url: Option<String>,

    /// Model to use (overrides config)
    #[arg(short, long, global = true, env = "QOTD_MODEL")]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to config)
        #[arg(long, env = "QOTD_HOST")]
        host: Option<String>,

        /// Port to bind to (defaults to config)
        #[arg(short, long, env = "QOTD_PORT")]
        port: Option<u16>,
    },

    /// Get a quote in the terminal
    Quote {
        /// Topic the quote should be about
        #[arg(short, long)]
        topic: Option<String>,

        /// Audience grade level (e.g. "Pre-K", "University", "General")
        #[arg(short, long)]
        grade_level: Option<String>,

        /// Print the quote as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the model server, search provider and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_quote_command() {
        let cli = Cli::try_parse_from([
            "qotd",
            "-vv",
            "quote",
            "--topic",
            "courage",
            "--grade-level",
            "High School",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Quote {
                topic,
                grade_level,
                json,
            } => {
                assert_eq!(topic.as_deref(), Some("courage"));
                assert_eq!(grade_level.as_deref(), Some("High School"));
                assert!(!json);
            }
            other => panic!("Expected quote command, got {:?}", other),
        }
    }
}
