mod chat_commands;
mod config_commands;
mod console;

use std::{path::PathBuf, sync::Arc};

use {
    clap::{Parser, Subcommand},
    palaver_config::{PalaverConfig, StoreBackend},
    palaver_routing::{Dispatcher, RandomPicker, spawn_sweeper},
    palaver_sessions::{ConversationStore, MemoryConversationStore, SqliteConversationStore},
    tokio::task::JoinHandle,
    tracing::{error, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "palaver", about = "Palaver: stateful conversation routing for chat bots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: discover palaver.{toml,yaml,yml,json}).
    #[arg(long, global = true, env = "PALAVER_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the bot on stdin as a direct message.
    Chat {
        #[arg(long)]
        team: Option<String>,
        #[arg(long, default_value = "D0LOCAL")]
        channel: String,
        #[arg(long, default_value = "U0LOCAL")]
        user: String,
    },
    /// Dispatch a JSON-lines file of Slack envelopes or inbound events.
    Replay { file: PathBuf },
    /// Validate the configuration file and report errors/warnings.
    CheckConfig {
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr; stdout carries the conversation.
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// A running bot: the dispatcher plus the background sweeper, if any.
pub(crate) struct Runtime {
    pub dispatcher: Dispatcher,
    pub config: PalaverConfig,
    sweeper: Option<JoinHandle<()>>,
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}

async fn open_store(config: &PalaverConfig) -> anyhow::Result<Arc<dyn ConversationStore>> {
    let store: Arc<dyn ConversationStore> = match config.store.backend {
        StoreBackend::Memory => Arc::new(MemoryConversationStore::new()),
        StoreBackend::Sqlite => {
            Arc::new(SqliteConversationStore::new(&config.store.database_url).await?)
        },
    };
    Ok(store)
}

async fn start(cli: &Cli) -> anyhow::Result<Runtime> {
    let report = palaver_config::validate::validate(cli.config.as_deref());
    if report.has_errors() {
        for diagnostic in &report.diagnostics {
            error!(%diagnostic, "invalid configuration");
        }
        anyhow::bail!("invalid configuration; run `palaver check-config` for details");
    }
    let config = palaver_config::load_or_discover(cli.config.as_deref())?;
    let store = open_store(&config).await?;
    let sweeper = config
        .store
        .sweep_interval()
        .map(|interval| spawn_sweeper(Arc::clone(&store), interval));

    let dispatcher = palaver_bot::dispatcher(
        &config,
        store,
        Arc::new(console::ConsoleSink),
        Arc::new(RandomPicker),
    )?;
    info!(
        backend = ?config.store.backend,
        triggers = dispatcher.triggers().len(),
        routes = dispatcher.routes().len(),
        "dispatcher ready"
    );

    Ok(Runtime {
        dispatcher,
        config,
        sweeper,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "palaver starting");

    match &cli.command {
        Commands::Chat {
            team,
            channel,
            user,
        } => {
            let runtime = start(&cli).await?;
            let team = team.clone().unwrap_or_else(|| runtime.config.bot.team_id.clone());
            chat_commands::chat(&runtime, &team, channel, user).await
        },
        Commands::Replay { file } => {
            let runtime = start(&cli).await?;
            chat_commands::replay(&runtime, file).await
        },
        Commands::CheckConfig { verbose } => {
            config_commands::check(cli.config.as_deref(), *verbose)
        },
    }
}
