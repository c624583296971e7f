use std::{fs::OpenOptions, path::Path, sync::Mutex};

use tracing_subscriber::{
    fmt::{writer::MakeWriterExt, MakeWriter},
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::{errors::Error, Result};

/// Initialize tracing for the bot: every line goes to stdout and to `log_file`.
///
/// Lines carry timestamp, level, target, source location and the chain of
/// instrumented functions they were emitted from (e.g.
/// `handle_error: hwb_core::poll: crates/hwb-core/src/poll.rs:NN: cycle failed`).
/// The file is opened in append mode so restarts keep history.
pub fn init(service_name: &str, log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    // Default: info for our crates, warn for everything else.
    // Can be overridden with `RUST_LOG`.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,hwb=info,hwb_core=info,hwb_practicum=info,hwb_telegram=info,{service_name}=info"
        ))
    });

    subscriber(filter, std::io::stdout.and(Mutex::new(file)))
        .try_init()
        .map_err(|e| Error::Config(format!("failed to initialize logging: {e}")))
}

pub(crate) fn subscriber<W>(
    filter: EnvFilter,
    writer: W,
) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .finish()
}
