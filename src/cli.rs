//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::controller::Command;
use crate::models::Locale;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Mesto - command-line client for the Mesto photo-card gallery
///
/// Browse the card feed, edit your profile, add, delete and like cards,
/// and see who likes cards the most.
///
/// Examples:
///   mesto feed
///   mesto --token $TOKEN like 65f1c2d3e4
///   mesto add "Baikal" https://example.com/baikal.jpg
///   mesto --format json stats
///   mesto init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub action: Action,

    /// Backend root URL (overrides the config file)
    #[arg(long, value_name = "URL", env = "MESTO_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Cohort path segment (overrides the config file)
    #[arg(long, value_name = "COHORT", env = "MESTO_COHORT", global = true)]
    pub cohort: Option<String>,

    /// Authorization token
    #[arg(
        long,
        value_name = "TOKEN",
        env = "MESTO_TOKEN",
        hide_env_values = true,
        global = true
    )]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .mesto.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT", global = true)]
    pub format: OutputFormat,

    /// Language of labels (en, ru)
    #[arg(long, value_name = "LOCALE", global = true)]
    pub locale: Option<Locale>,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// What to do.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Show the card feed
    Feed,

    /// Show your profile
    Profile,

    /// Change your name and description
    EditProfile {
        /// New display name
        name: String,
        /// New description
        about: String,
    },

    /// Change your avatar
    Avatar {
        /// Image URL
        link: String,
    },

    /// Add a new card
    Add {
        /// Place name
        name: String,
        /// Image URL
        link: String,
    },

    /// Delete one of your cards
    Delete {
        /// Card id
        card_id: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Like a card, or remove your like if you already liked it
    Like {
        /// Card id
        card_id: String,
    },

    /// Show like statistics
    Stats,

    /// Generate a default .mesto.toml configuration file
    InitConfig,
}

impl Action {
    /// Commands to dispatch for this action, in order.
    ///
    /// Actions that inspect the feed or need to know the current user
    /// start with a `Load`.
    pub fn commands(&self) -> Vec<Command> {
        match self {
            Action::Feed | Action::Profile => vec![Command::Load],
            Action::EditProfile { name, about } => vec![Command::EditProfile {
                name: name.clone(),
                about: about.clone(),
            }],
            Action::Avatar { link } => vec![Command::UpdateAvatar { link: link.clone() }],
            Action::Add { name, link } => vec![Command::AddCard {
                name: name.clone(),
                link: link.clone(),
            }],
            Action::Delete { card_id, .. } => vec![
                Command::Load,
                Command::RequestDelete {
                    card_id: card_id.clone(),
                },
            ],
            Action::Like { card_id } => vec![
                Command::Load,
                Command::ToggleLike {
                    card_id: card_id.clone(),
                },
            ],
            Action::Stats => vec![Command::ShowStatistics],
            Action::InitConfig => Vec::new(),
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.action == Action::InitConfig {
            return Ok(());
        }

        if let Some(ref base_url) = self.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err("Base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the `[general] verbose` value from the config
    /// file. `--quiet` wins over both.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::parse_from(argv)
    }

    #[test]
    fn test_parse_subcommand_with_global_flags() {
        let args = parse(&["mesto", "like", "c1", "--format", "json", "--cohort", "x"]);
        assert_eq!(
            args.action,
            Action::Like {
                card_id: "c1".to_string()
            }
        );
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.cohort.as_deref(), Some("x"));
    }

    #[test]
    fn test_like_loads_first() {
        let args = parse(&["mesto", "like", "c1"]);
        assert_eq!(
            args.action.commands(),
            vec![
                Command::Load,
                Command::ToggleLike {
                    card_id: "c1".to_string()
                }
            ]
        );
    }

    #[test]
    fn test_delete_flag() {
        let args = parse(&["mesto", "delete", "c9", "--yes"]);
        assert_eq!(
            args.action,
            Action::Delete {
                card_id: "c9".to_string(),
                yes: true
            }
        );
        assert_eq!(args.action.commands().len(), 2);
    }

    #[test]
    fn test_stats_needs_no_load() {
        assert_eq!(
            parse(&["mesto", "stats"]).action.commands(),
            vec![Command::ShowStatistics]
        );
    }

    #[test]
    fn test_validation_invalid_base_url() {
        let args = parse(&["mesto", "--base-url", "localhost:3000", "feed"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let args = parse(&["mesto", "-v", "-q", "feed"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let args = parse(&["mesto", "--timeout", "0", "stats"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = parse(&["mesto", "feed"]);
        assert_eq!(args.log_level(false), tracing::Level::INFO);
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }
}
