//! CLI command definitions and dispatch for the `avinci` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod history;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Caller identity used for CLI sessions when `--caller` is not given.
pub const DEFAULT_CLI_CALLER: &str = "cli";

/// Talk to persona agents and serve the chat API.
#[derive(Parser)]
#[command(name = "avinci", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Address to bind to; overrides `[server] bind` in config.toml.
        #[arg(long)]
        bind: Option<String>,

        /// Export spans through OpenTelemetry (stdout exporter).
        #[arg(long)]
        otel: bool,
    },

    /// Send one message to a persona agent.
    Chat {
        /// Agent identifier.
        agent_id: String,

        /// Message text.
        text: String,

        /// Attach an image (png, jpeg, gif, webp).
        #[arg(long)]
        image: Option<PathBuf>,

        /// Session caller identity.
        #[arg(long, default_value = DEFAULT_CLI_CALLER)]
        caller: String,
    },

    /// Show the stored conversation with an agent.
    ///
    /// Only meaningful with `[session] backend = "sqlite"`; the in-memory
    /// backend does not outlive a single command.
    History {
        /// Agent identifier.
        agent_id: String,

        /// Session caller identity.
        #[arg(long, default_value = DEFAULT_CLI_CALLER)]
        caller: String,
    },

    /// Clear the stored conversation with an agent.
    Clear {
        /// Agent identifier.
        agent_id: String,

        /// Session caller identity.
        #[arg(long, default_value = DEFAULT_CLI_CALLER)]
        caller: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_chat_defaults_caller() {
        let cli = Cli::try_parse_from(["avinci", "chat", "agent-1", "hello"]).unwrap();
        match cli.command {
            Commands::Chat { caller, image, .. } => {
                assert_eq!(caller, DEFAULT_CLI_CALLER);
                assert!(image.is_none());
            }
            _ => panic!("expected chat command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["avinci", "history", "agent-1", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }
}
