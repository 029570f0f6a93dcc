mod commands;
mod factory;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{reload, EnvFilter, Registry};

use inkdash_common::constants::DEFAULT_CHAIN_NAME;
use inkdash_common::error::InkError;
use inkdash_core::columns::{ColumnKey, TableView};
use inkdash_core::config::AppConfig;
use inkdash_core::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "inkdash",
    about = "inkdash: DeFi metrics for a single chain, sourced from DefiLlama.",
    version,
    propagate_version = true
)]
struct Cli {
    #[arg(long, short = 'o', global = true, default_value = "table")]
    output: CliOutputFormat,

    /// Replay upstream payloads from a JSON fixture instead of the network.
    #[arg(long, global = true, value_name = "FILE")]
    fixture: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat { Table, Json, JsonPretty }

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> OutputFormat {
        match f {
            CliOutputFormat::Table => OutputFormat::Table,
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  COMMANDS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Subcommand)]
enum Commands {
    /// Protocols on the chain ranked by TVL, with fees and spot volume.
    Rankings {
        /// Show the extended fee and volume columns.
        #[arg(long)]
        advanced: bool,
        /// Sort by a column key (e.g. fees_24h, tvl_7d_pct).
        #[arg(long, value_name = "COLUMN")]
        sort: Option<ColumnKey>,
        /// Sort descending.
        #[arg(long, requires = "sort")]
        desc: bool,
    },

    /// Chain TVL with its 24h change.
    Tvl,

    /// Key metrics panel.
    Metrics,

    /// Dump the raw fee and revenue payloads for one protocol.
    Debug {
        slug: String,
    },

    /// Show configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration.
    Show,
    /// Print the config file location.
    Path,
}

type LogHandle = reload::Handle<EnvFilter, Registry>;

/// Install the stderr subscriber. Without `RUST_LOG` the filter starts at
/// `warn` and is raised to `debug` once a verbose config is loaded.
fn init_logging() -> LogHandle {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
    handle
}

fn apply_verbose(handle: &LogHandle, config: &AppConfig) {
    if config.system.verbose && std::env::var_os("RUST_LOG").is_none() {
        if let Err(e) = handle.reload(EnvFilter::new("debug")) {
            tracing::warn!(error = %e, "could not raise log level");
        }
    }
}

/// JSON failure body and exit code for errors that carry an `InkError`.
fn failure_body(err: &anyhow::Error, chain: &str) -> Option<(String, i32)> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<InkError>())
        .map(|ink| (ink.to_json(chain).to_string(), ink.exit_code()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log = init_logging();
    let fmt: OutputFormat = cli.output.into();

    let mut chain = DEFAULT_CHAIN_NAME.to_string();
    let result = match load_workspace() {
        Ok(config) => {
            apply_verbose(&log, &config);
            chain = config.chain.name.clone();
            run(cli.command, config, cli.fixture, fmt).await
        }
        Err(e) => Err(e),
    };

    // Machine-readable failure body for JSON consumers.
    if let Err(e) = &result {
        if fmt != OutputFormat::Table {
            if let Some((body, code)) = failure_body(e, &chain) {
                println!("{body}");
                std::process::exit(code);
            }
        }
    }
    result
}

fn load_workspace() -> Result<AppConfig> {
    inkdash_core::init_workspace()?;
    inkdash_core::load_config()
}

async fn run(command: Commands, config: AppConfig, fixture: Option<PathBuf>, fmt: OutputFormat) -> Result<()> {
    let ctx = || factory::Context::new(config.clone(), fixture.as_deref());

    match command {
        Commands::Rankings { advanced, sort, desc } => {
            commands::rankings::run(&ctx()?, TableView { advanced, sort, desc }, fmt).await
        }
        Commands::Tvl => commands::tvl::run(&ctx()?, fmt).await,
        Commands::Metrics => commands::metrics::run(&ctx()?, fmt).await,
        Commands::Debug { slug } => commands::debug::run(&ctx()?, &slug, fmt).await,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::configure::show(&config, fmt),
            ConfigAction::Path => commands::configure::path(),
        },
    }
}
