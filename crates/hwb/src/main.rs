use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use hwb_core::{config::Config, domain::Cursor, notifier::Notifier, poll::PollLoop};
use hwb_practicum::PracticumClient;
use hwb_telegram::TelegramMessenger;

/// Watch Practicum homework review statuses and forward changes to Telegram.
#[derive(Debug, Parser)]
#[command(name = "hwb", version, about)]
struct Cli {
    /// KEY=VALUE file loaded before reading the environment (skipped if absent).
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Log file, appended to. Logs are also written to stdout.
    #[arg(long, default_value = "homework.log")]
    log_file: PathBuf,

    /// Run a single poll cycle and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = hwb_core::logging::init("hwb", &cli.log_file) {
        eprintln!("hwb: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Load configuration, then hand it to `connect`. `connect` is never called
/// when a required variable is missing.
fn startup(
    load: impl FnOnce() -> hwb_core::Result<Config>,
    connect: impl FnOnce(&Config) -> hwb_core::Result<PollLoop>,
) -> anyhow::Result<PollLoop> {
    let cfg = load().context("required configuration is missing")?;
    Ok(connect(&cfg)?)
}

fn connect(cfg: &Config) -> hwb_core::Result<PollLoop> {
    let source = Arc::new(PracticumClient::from_config(cfg)?);
    let messenger = Arc::new(TelegramMessenger::from_config(cfg)?);
    Ok(PollLoop::new(
        cfg,
        source,
        Notifier::new(messenger),
        Cursor::now(),
    ))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut poll = startup(|| Config::load(&cli.env_file), connect)?;

    if cli.once {
        let outcome = poll.run_cycle().await;
        info!(?outcome, cursor = %poll.cursor(), "single cycle finished");
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping after the current cycle");
            on_signal.cancel();
        }
    });

    poll.run(cancel).await;
    Ok(())
}
