//! reelbox - terminal movie browser.

/// Application configuration (TOML).
mod config;
/// Terminal UI components.
mod tui;

use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use crate::config::{API_KEY_ENV, AppConfig, mask_secret, resolve_config_path, resolve_log_path};
use crate::tui::run_browser;
use reelbox_api::omdb::{
    DEFAULT_BASE_URL, DEFAULT_MIN_INTERVAL, IMDB_TITLE_BASE_URL, OmdbClient,
};
use reelbox_core::{RequestState, SessionCoordinator, SessionOptions};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog interactively and keep a watched list.
    Browse,
    /// Search the catalog once and print the results.
    Search(SearchArgs),
    /// Print the details of one title.
    Details(DetailsArgs),
    /// Show or edit the configuration.
    Config(ConfigCommand),
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Free-text query (at least 3 characters, e.g. "superman").
    #[arg(long, required = true)]
    query: String,
}

/// Arguments for the `details` subcommand.
#[derive(clap::Args)]
struct DetailsArgs {
    /// IMDb id (e.g. "tt0770828").
    #[arg(long, required = true)]
    id: String,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Print the effective configuration (API key masked).
    Show,
    /// Store the OMDb API key in the config file.
    SetKey(SetKeyArgs),
}

/// Arguments for the `config set-key` subcommand.
#[derive(clap::Args)]
struct SetKeyArgs {
    /// OMDb API key.
    key: String,
}

/// Loads the config file for `dir`.
fn load_config(dir: Option<&PathBuf>) -> Result<(PathBuf, AppConfig)> {
    let path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&path).context("failed to load config")?;
    Ok((path, config))
}

/// Builds an OMDb client from config and environment.
///
/// # Errors
///
/// Returns an error if no API key is configured, the base URL is invalid,
/// or the client fails to build.
#[instrument(skip_all)]
fn build_catalog_client(config: &AppConfig) -> Result<OmdbClient> {
    let api_key = config
        .effective_api_key(std::env::var(API_KEY_ENV).ok())
        .with_context(|| {
            format!("{API_KEY_ENV} environment variable or [catalog] api_key in config is required")
        })?;

    let mut builder = OmdbClient::builder().api_key(api_key).user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(base_url) = &config.catalog.base_url {
        let url = Url::parse(base_url)
            .with_context(|| format!("invalid catalog base_url: {base_url}"))?;
        builder = builder.base_url(url);
    }
    if let Some(ms) = config.catalog.min_interval_ms {
        builder = builder.min_interval(Duration::from_millis(ms));
    }

    builder.build().context("failed to build OMDb client")
}

/// Builds a coordinator for one-shot commands (no debounce).
fn one_shot_session(config: &AppConfig) -> Result<SessionCoordinator<OmdbClient>> {
    let client = build_catalog_client(config)?;
    Ok(SessionCoordinator::new(
        Arc::new(client),
        SessionOptions {
            debounce: Duration::ZERO,
        },
    ))
}

/// Runs the `browse` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the TUI fails.
#[instrument(skip_all)]
async fn run_browse(dir: Option<&PathBuf>) -> Result<()> {
    let (_, config) = load_config(dir)?;
    let client = build_catalog_client(&config)?;
    let session = SessionCoordinator::new(
        Arc::new(client),
        SessionOptions {
            debounce: config.debounce(),
        },
    );

    tracing::info!("Launching browser");
    run_browser(session).await.context("browser TUI failed")
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the query is rejected, nothing matches, or the
/// request fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dir: Option<&PathBuf>) -> Result<()> {
    let (_, config) = load_config(dir)?;
    let mut session = one_shot_session(&config)?;

    session.set_query(args.query.as_str());
    while matches!(
        session.snapshot().search,
        RequestState::Idle | RequestState::Loading
    ) {
        session.pump().await;
    }

    match session.snapshot().search {
        RequestState::Success(items) if items.is_empty() => bail!("No results found"),
        RequestState::Success(items) => {
            tracing::info!("Found {} results", items.len());
            tracing::info!("ID\t\tYear\tTitle");
            for item in items {
                tracing::info!("{}\t{}\t{}", item.id, item.year, item.title);
            }
            Ok(())
        }
        RequestState::Failure(message) => bail!("{message}"),
        RequestState::Idle | RequestState::Loading => bail!("search did not complete"),
    }
}

/// Runs the `details` subcommand.
///
/// # Errors
///
/// Returns an error if the id is unknown or the request fails.
#[instrument(skip_all)]
async fn run_details(args: &DetailsArgs, dir: Option<&PathBuf>) -> Result<()> {
    let (_, config) = load_config(dir)?;
    let mut session = one_shot_session(&config)?;

    session.select_id(&args.id);
    while session.snapshot().detail.is_loading() {
        session.pump().await;
    }

    match session.snapshot().detail {
        RequestState::Success(record) => {
            tracing::info!("{} ({})", record.title, record.year);
            tracing::info!("Released:    {}", record.release_date);
            tracing::info!("Runtime:     {}", record.runtime);
            tracing::info!("Genre:       {}", record.genre);
            tracing::info!("IMDb rating: {:.1}", record.rating);
            tracing::info!("Starring:    {}", record.cast);
            tracing::info!("Directed by: {}", record.director);
            tracing::info!("Plot:        {}", record.plot);
            tracing::info!("{IMDB_TITLE_BASE_URL}/{}/", record.id);
            Ok(())
        }
        RequestState::Failure(message) => bail!("{message}"),
        RequestState::Idle | RequestState::Loading => bail!("detail request did not complete"),
    }
}

/// Runs the `config show` subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded.
#[instrument(skip_all)]
fn run_config_show(dir: Option<&PathBuf>) -> Result<()> {
    let (path, config) = load_config(dir)?;
    let env_key = std::env::var(API_KEY_ENV).ok();
    let from_env = env_key.as_deref().is_some_and(|key| !key.trim().is_empty());
    let api_key = config.effective_api_key(env_key).map_or_else(
        || String::from("(not set)"),
        |key| {
            let source = if from_env { API_KEY_ENV } else { "config" };
            format!("{} (from {source})", mask_secret(&key))
        },
    );

    tracing::info!("Config file:     {}", path.display());
    tracing::info!("API key:         {api_key}");
    tracing::info!(
        "Base URL:        {}",
        config
            .catalog
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
    );
    tracing::info!(
        "Min interval:    {} ms",
        config
            .catalog
            .min_interval_ms
            .map_or(DEFAULT_MIN_INTERVAL, Duration::from_millis)
            .as_millis()
    );
    tracing::info!("Debounce:        {} ms", config.debounce().as_millis());
    Ok(())
}

/// Runs the `config set-key` subcommand.
///
/// # Errors
///
/// Returns an error if the key is blank or the config cannot be saved.
#[instrument(skip_all)]
fn run_config_set_key(args: &SetKeyArgs, dir: Option<&PathBuf>) -> Result<()> {
    let key = args.key.trim();
    if key.is_empty() {
        bail!("API key must not be empty");
    }

    let (path, mut config) = load_config(dir)?;
    config.catalog.api_key = Some(String::from(key));
    config.save(&path).context("failed to save config")?;
    tracing::info!("Saved API key to {}", path.display());
    Ok(())
}

/// Opens the browser's log file next to the config file.
fn open_log_file(dir: Option<&PathBuf>) -> Result<File> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let log_path = resolve_log_path(&config_path);
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))
}

/// Installs the global tracing subscriber.
///
/// Logs go to `log_file` when given (the TUI owns the terminal), otherwise
/// to stdout.
fn init_tracing(log_file: Option<File>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let ansi = log_file.is_none();
    let writer = log_file.map_or_else(
        || BoxMakeWriter::new(std::io::stdout),
        |file| BoxMakeWriter::new(Mutex::new(file)),
    );

    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(env_filter)
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = match cli.command {
        Commands::Browse => Some(open_log_file(cli.dir.as_ref())?),
        _ => None,
    };
    init_tracing(log_file);

    match cli.command {
        Commands::Browse => run_browse(cli.dir.as_ref()).await,
        Commands::Search(args) => run_search(&args, cli.dir.as_ref()).await,
        Commands::Details(args) => run_details(&args, cli.dir.as_ref()).await,
        Commands::Config(cmd) => match cmd.command {
            ConfigSubcommands::Show => run_config_show(cli.dir.as_ref()),
            ConfigSubcommands::SetKey(args) => run_config_set_key(&args, cli.dir.as_ref()),
        },
    }
}
