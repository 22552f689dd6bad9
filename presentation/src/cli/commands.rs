//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for hustings
#[derive(Parser, Debug)]
#[command(name = "hustings")]
#[command(author, version, about = "Ask every party one question, stream every answer")]
#[command(long_about = r#"
Hustings runs one question against every registered party's manifesto
assistant in parallel and streams the answers back as they arrive.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./hustings.toml     Project-level config
3. ~/.config/hustings/config.toml   Global config

Example:
  hustings serve
  hustings party upsert green --name "Green Party" --url https://green.example
  hustings party set-assistant green asst_abc123
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Manage the party registry
    Party {
        #[command(subcommand)]
        command: PartyCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum PartyCommand {
    /// Create a party or update its metadata
    Upsert {
        /// Party slug (stable identifier)
        slug: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Party website
        #[arg(long)]
        url: Option<String>,

        /// Logo image URL
        #[arg(long)]
        logo_image_url: Option<String>,

        /// Manifesto document URL
        #[arg(long)]
        manifesto_url: Option<String>,
    },

    /// Bind a party to its backend assistant
    SetAssistant {
        /// Party slug
        slug: String,

        /// Backend assistant id (e.g. asst_abc123)
        assistant_id: String,
    },

    /// List registered parties
    List,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_parses() {
        let cli = Cli::try_parse_from(["hustings", "serve", "-vv"]).unwrap();
        assert!(matches!(cli.command, Command::Serve));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn party_upsert_parses_optional_fields() {
        let cli = Cli::try_parse_from([
            "hustings",
            "party",
            "upsert",
            "green",
            "--name",
            "Green Party",
        ])
        .unwrap();
        match cli.command {
            Command::Party {
                command: PartyCommand::Upsert { slug, name, url, .. },
            } => {
                assert_eq!(slug, "green");
                assert_eq!(name.as_deref(), Some("Green Party"));
                assert_eq!(url, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn set_assistant_requires_both_args() {
        assert!(Cli::try_parse_from(["hustings", "party", "set-assistant", "green"]).is_err());
        let cli =
            Cli::try_parse_from(["hustings", "party", "set-assistant", "green", "asst_1"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Command::Party {
                command: PartyCommand::SetAssistant { .. }
            }
        ));
    }
}
