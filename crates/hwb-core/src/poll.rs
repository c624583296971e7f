//! The poll-check-notify loop.
//!
//! Each cycle: fetch statuses since the cursor, validate, report the newest
//! homework (if any), then sleep. Any failure is classified by
//! [`ErrorKind::operator_notifiable`] and either only logged or also sent to
//! the chat. Nothing escapes a cycle; the loop only stops on cancellation.

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    config::Config,
    domain::{ChatId, Cursor},
    errors::{Error, ErrorKind},
    formatting::{format_failure, format_status},
    notifier::Notifier,
    ports::StatusSource,
    retry::RetryPolicy,
    status, Result,
};

/// What a single cycle ended with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A status change was delivered; carries the text sent.
    Reported(String),
    /// The response had no homeworks.
    Skipped,
    /// The cycle failed; `operator_notified` tells whether the chat heard about it.
    Failed {
        kind: ErrorKind,
        operator_notified: bool,
    },
}

pub struct PollLoop {
    source: Arc<dyn StatusSource>,
    notifier: Notifier,
    chat_id: ChatId,
    retry: RetryPolicy,
    suppress_repeated_errors: bool,

    cursor: Cursor,
    consecutive_failures: u32,
    last_operator_error: Option<String>,
}

impl PollLoop {
    pub fn new(
        cfg: &Config,
        source: Arc<dyn StatusSource>,
        notifier: Notifier,
        start: Cursor,
    ) -> Self {
        Self {
            source,
            notifier,
            chat_id: cfg.telegram_chat_id,
            retry: cfg.retry,
            suppress_repeated_errors: cfg.suppress_repeated_errors,
            cursor: start,
            consecutive_failures: 0,
            last_operator_error: None,
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// How long to sleep after the most recent cycle.
    pub fn next_delay(&self) -> Duration {
        self.retry.next_delay(self.consecutive_failures)
    }

    /// Run cycles until `cancel` fires. Cancellation is observed between cycles.
    pub async fn run(&mut self, cancel: CancellationToken) {
        info!(cursor = %self.cursor, "poll loop started");
        loop {
            self.run_cycle().await;

            let delay = self.next_delay();
            debug!(delay_secs = delay.as_secs(), "sleeping until next cycle");
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(delay) => {}
            }
        }
        info!(cursor = %self.cursor, "poll loop stopped");
    }

    /// One full cycle, including error handling. Never fails.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        match self.check_and_report().await {
            Ok(outcome) => {
                self.consecutive_failures = 0;
                self.last_operator_error = None;
                outcome
            }
            Err(err) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                self.handle_error(err).await
            }
        }
    }

    #[tracing::instrument(skip_all)]
    async fn check_and_report(&mut self) -> Result<CycleOutcome> {
        debug!(cursor = %self.cursor, "fetching homework statuses");
        let payload = self.source.fetch(self.cursor).await?;

        let checked = status::validate(&payload)?;
        // Advance as soon as the response is known good; a reporting failure
        // below does not rewind it.
        self.cursor = checked.current_date;

        let Some(item) = checked.latest() else {
            info!(cursor = %self.cursor, "no status updates");
            return Ok(CycleOutcome::Skipped);
        };

        let text = format_status(item)?;
        self.notifier.notify(self.chat_id, &text).await?;
        Ok(CycleOutcome::Reported(text))
    }

    #[tracing::instrument(skip_all)]
    async fn handle_error(&mut self, err: Error) -> CycleOutcome {
        let kind = err.kind();
        error!(?kind, cursor = %self.cursor, "cycle failed: {err}");

        if !kind.operator_notifiable() {
            return CycleOutcome::Failed {
                kind,
                operator_notified: false,
            };
        }

        let text = format_failure(&err);
        if self.suppress_repeated_errors
            && self.last_operator_error.as_deref() == Some(text.as_str())
        {
            debug!("failure already reported to operator; not sending again");
            return CycleOutcome::Failed {
                kind,
                operator_notified: false,
            };
        }

        // Best effort: a failed operator notification is logged and dropped.
        let operator_notified = match self.notifier.notify(self.chat_id, &text).await {
            Ok(()) => {
                self.last_operator_error = Some(text);
                true
            }
            Err(e) => {
                warn!("could not notify operator about failure: {e}");
                false
            }
        };

        CycleOutcome::Failed {
            kind,
            operator_notified,
        }
    }
}
