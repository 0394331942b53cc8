//! Mesto - command-line client for the Mesto photo-card gallery.
//!
//! Talks to the gallery REST backend to browse cards, manage the
//! user's profile and cards, and summarize who likes cards the most.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, validation, etc.)

mod analysis;
mod api;
mod cli;
mod config;
mod controller;
mod models;
mod report;
mod validation;

use anyhow::{bail, Context, Result};
use api::ApiClient;
use chrono::Utc;
use cli::{Action, Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use controller::{Command, Controller, ControllerError, Outcome};
use indicatif::{ProgressBar, ProgressStyle};
use models::ReportMetadata;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if args.action == Action::InitConfig {
        return handle_init_config();
    }

    // The config file can turn on verbose logging, so it is read first
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    debug!("Mesto v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    source.log();

    if let Err(e) = run(args, config).await {
        // Command failures were already reported by the controller's sink
        if !reported_by_controller(&e) {
            eprintln!("\n❌ Error: {:#}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Returns true if the error came out of `Controller::dispatch`.
fn reported_by_controller(error: &anyhow::Error) -> bool {
    error.downcast_ref::<ControllerError>().is_some()
}

/// Handle init-config: generate a default .mesto.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Set your cohort there and export MESTO_TOKEN with your token.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` takes precedence over the flags when it is set.
fn init_logging(level: Level) {
    let filter = log_filter(level, std::env::var("RUST_LOG").ok().as_deref());

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Build the log filter from `RUST_LOG`-style directives, falling back to `level`.
fn log_filter(level: Level, directives: Option<&str>) -> EnvFilter {
    let builder = EnvFilter::builder().with_default_directive(LevelFilter::from_level(level).into());

    match directives {
        Some(spec) if !spec.trim().is_empty() => builder.parse_lossy(spec),
        _ => builder.parse_lossy(""),
    }
}

/// Run one action end to end and print or save its output.
async fn run(args: Args, config: Config) -> Result<()> {
    let start_time = Instant::now();

    if config.api.token.is_empty() {
        warn!("No token configured; the backend will most likely reject requests");
    }

    let client = ApiClient::new(&config.api_config()).context("Failed to create API client")?;
    let api_url = client.root().to_string();
    let locale = config.general.locale;
    let mut controller = Controller::new(client, locale);
    debug!("Using {} with locale {}", api_url, locale);

    let mut last = None;
    for command in args.action.commands() {
        let outcome = dispatch_with_spinner(&mut controller, command, args.quiet).await?;
        last = Some(outcome);
    }

    // Deleting needs an explicit confirmation step.
    let pending = match (&args.action, &last) {
        (Action::Delete { yes, .. }, Some(Outcome::DeletePending(card))) => {
            Some((*yes, format!("Delete card '{}' ({})?", card.name, card.id)))
        }
        _ => None,
    };
    if let Some((yes, question)) = pending {
        let confirmed = yes || confirm(&question)?;
        let command = if confirmed {
            Command::ConfirmDelete
        } else {
            Command::CancelDelete
        };
        last = Some(dispatch_with_spinner(&mut controller, command, args.quiet).await?);
    }

    let Some(outcome) = last else {
        bail!("Nothing to do");
    };

    let metadata = ReportMetadata {
        api_url,
        generated_at: Utc::now(),
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };

    let output = render(&args, &config, &metadata, &outcome)?;

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!("Output saved to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(output.as_bytes())?;
            if !output.ends_with('\n') {
                writeln!(stdout)?;
            }
        }
    }

    debug!(
        "Finished in {:.2}s with {} cards in session",
        metadata.duration_seconds,
        controller.session().cards.len()
    );
    Ok(())
}

/// Dispatch a command while showing a spinner on stderr.
async fn dispatch_with_spinner(
    controller: &mut Controller<ApiClient>,
    command: Command,
    quiet: bool,
) -> Result<Outcome> {
    let spinner = if quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(command.name());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    };

    let result = controller.dispatch(command).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    Ok(result?)
}

/// Ask a yes/no question on stdin. Anything but "y"/"yes" means no.
fn confirm(question: &str) -> Result<bool> {
    eprint!("{} [y/N] ", question);
    std::io::stderr().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Render the final outcome of an action.
fn render(
    args: &Args,
    config: &Config,
    metadata: &ReportMetadata,
    outcome: &Outcome,
) -> Result<String> {
    let locale = config.general.locale;
    let json = args.format == OutputFormat::Json;

    let text = match outcome {
        Outcome::Loaded { user, cards } => match (&args.action, json) {
            (Action::Profile, true) => report::generate_json(user)?,
            (Action::Profile, false) => report::generate_profile_markdown(user, locale),
            (_, true) => report::generate_json(&report::FeedReport {
                metadata,
                user,
                cards,
            })?,
            (_, false) => {
                report::generate_feed_markdown(user, cards, metadata, &config.report, locale)
            }
        },
        Outcome::ProfileUpdated(user) | Outcome::AvatarUpdated(user) => {
            if json {
                report::generate_json(user)?
            } else {
                format!("✅ Profile saved.\n\n{}", report::generate_profile_markdown(user, locale))
            }
        }
        Outcome::CardAdded(card) => {
            if json {
                report::generate_json(card)?
            } else {
                format!("✅ Added card '{}' ({}).", card.name, card.id)
            }
        }
        Outcome::CardDeleted { card_id } => format!("🗑  Deleted card {}.", card_id),
        Outcome::DeleteCancelled => "Deletion cancelled.".to_string(),
        Outcome::DeletePending(card) => format!("Card '{}' is waiting for deletion.", card.name),
        Outcome::LikeToggled { card, liked } => {
            if json {
                report::generate_json(card)?
            } else {
                let heart = if *liked { "♥" } else { "♡" };
                format!("{} {} ({} likes)", heart, card.name, card.like_count())
            }
        }
        Outcome::Statistics(stats) => {
            if json {
                report::generate_json(&report::StatisticsReport {
                    metadata,
                    statistics: stats,
                })?
            } else {
                report::generate_statistics_markdown(stats, locale)
            }
        }
    };

    Ok(text)
}

/// Where the configuration came from.
enum ConfigSource {
    File(PathBuf),
    Default,
    Builtin,
    Unreadable(anyhow::Error),
}

impl ConfigSource {
    /// Log the source once logging is up.
    fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::Default => debug!("Loaded default config from {}", CONFIG_FILE),
            ConfigSource::Builtin => debug!("No config file found, using defaults"),
            ConfigSource::Unreadable(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::File(config_path.clone())));
    }

    // Try default location
    Ok(match Config::load_default() {
        Ok(Some(config)) => (config, ConfigSource::Default),
        Ok(None) => (Config::default(), ConfigSource::Builtin),
        Err(e) => (Config::default(), ConfigSource::Unreadable(e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_errors_are_not_reported_twice() {
        let err = anyhow::Error::from(ControllerError::NotLoaded);
        assert!(reported_by_controller(&err));

        let err = anyhow::anyhow!("Failed to write output to out.md");
        assert!(!reported_by_controller(&err));
    }

    #[test]
    fn test_log_filter_defaults_to_level() {
        let filter = log_filter(Level::DEBUG, None);
        assert!(filter.to_string().contains("debug"));

        let filter = log_filter(Level::INFO, Some("  "));
        assert!(filter.to_string().contains("info"));
    }

    #[test]
    fn test_log_filter_uses_directives() {
        let filter = log_filter(Level::INFO, Some("mesto=trace"));
        assert!(filter.to_string().contains("mesto=trace"));
    }
}
