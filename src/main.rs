mod commands;
mod gateway;
mod i18n;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use streak_channels::telegram::TelegramChannel;
use streak_core::{
    config::{self, shellexpand, Config},
    schedule::{DaySchedule, TickKind},
    title::TitleCodec,
    traits::Channel,
};
use streak_store::StateStore;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "streak",
    version,
    about = "Daily activity streaks rendered into Telegram group titles"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot: poll Telegram and run the daily ticks.
    Start,
    /// Print every tracked chat and the next scheduled tick.
    Status,
    /// Run a tick immediately. Do not use while `start` is running.
    Tick {
        /// `start` (open the day) or `end` (close the day).
        kind: TickKind,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;
    cfg.validate()?;

    let _log_guard = init_logging(&cfg);

    let schedule = DaySchedule::from_config(&cfg.schedule)?;

    match cli.command {
        Commands::Start => {
            let gw = build_gateway(&cfg, schedule).await?;
            println!("Streak — starting bot...");
            Arc::new(gw).run().await?;
        }
        Commands::Status => {
            let store = StateStore::open(cfg.streak.store_path()).await;
            let snapshot = store.load().await;
            let now = chrono::Utc::now();
            let (next_kind, next_at) = schedule.next_tick(now);

            println!("Streak — Status\n");
            println!("Config: {}", cli.config);
            println!("State:  {}", store.path().display());
            println!(
                "Today:  {} ({})",
                schedule.today(now),
                schedule.timezone()
            );
            println!(
                "Next tick: {next_kind} at {}",
                next_at.with_timezone(&schedule.timezone())
            );
            println!(
                "Service message cleanup: {}",
                if snapshot.delete_service_messages {
                    "on"
                } else {
                    "off"
                }
            );
            println!();

            if snapshot.chats.is_empty() {
                println!("  no chats tracked yet");
            }
            for (chat_id, record) in &snapshot.chats {
                println!(
                    "  {chat_id}: streak {} | {} | base '{}' | last cycle {} | lang {}",
                    record.streak,
                    record.status.as_str(),
                    record.base_title.as_deref().unwrap_or("-"),
                    record
                        .last_cycle_date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    record
                        .language
                        .as_deref()
                        .unwrap_or(cfg.streak.language.as_str()),
                );
            }
        }
        Commands::Tick { kind } => {
            let gw = build_gateway(&cfg, schedule).await?;
            let report = gw.force_tick(kind).await?;
            println!(
                "{kind} tick: {} chats, {} renamed, {} rename failures",
                report.processed, report.renamed, report.failed
            );
        }
    }

    Ok(())
}

/// Wire the Telegram channel, state store, and codec into a gateway.
async fn build_gateway(cfg: &Config, schedule: DaySchedule) -> anyhow::Result<gateway::Gateway> {
    if !cfg.telegram.enabled {
        anyhow::bail!("Telegram is disabled in config.toml; nothing to run.");
    }
    if cfg.telegram.bot_token.is_empty() {
        anyhow::bail!(
            "Telegram bot_token is empty. \
             Set it in config.toml or the {} env var.",
            config::BOT_TOKEN_ENV
        );
    }

    let channel: Arc<dyn Channel> = Arc::new(TelegramChannel::new(cfg.telegram.clone()));
    let store = StateStore::open(cfg.streak.store_path()).await;
    let codec = TitleCodec::new(&cfg.glyphs)?;

    Ok(gateway::Gateway::new(
        channel,
        store,
        codec,
        schedule,
        &cfg.sync,
        cfg.streak.language.clone(),
    ))
}

/// Log to stderr and, when `<data_dir>/logs` is writable, to a daily-rotated
/// file there. `RUST_LOG` overrides the configured level.
fn init_logging(cfg: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.streak.log_level.as_str()));

    let log_dir = PathBuf::from(shellexpand(&cfg.streak.data_dir)).join("logs");
    let (file_layer, guard) = match std::fs::create_dir_all(&log_dir) {
        Ok(()) => {
            let file_appender = tracing_appender::rolling::daily(&log_dir, "streak.log");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        Err(e) => {
            eprintln!(
                "warning: cannot create {}: {e}; logging to stderr only",
                log_dir.display()
            );
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}
