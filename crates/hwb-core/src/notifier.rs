use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    domain::ChatId,
    errors::Error,
    formatting::truncate_chars,
    messaging::port::MessagingPort,
    Result,
};

/// Delivers notification texts through a messenger.
///
/// A failed send becomes `DeliveryFailed` with the original text attached.
/// There is no retry here; the poll loop owns the retry schedule.
#[derive(Clone)]
pub struct Notifier {
    messenger: Arc<dyn MessagingPort>,
}

impl Notifier {
    pub fn new(messenger: Arc<dyn MessagingPort>) -> Self {
        Self { messenger }
    }

    pub async fn notify(&self, chat_id: ChatId, text: &str) -> Result<()> {
        let limit = self.messenger.capabilities().max_message_len;
        let body = truncate_chars(text, limit);
        if body != text {
            debug!(limit, "message truncated to messenger limit");
        }

        match self.messenger.send_text(chat_id, &body).await {
            Ok(sent) => {
                info!(
                    chat_id = chat_id.0,
                    message_id = sent.message_id.0,
                    "message has been sent"
                );
                Ok(())
            }
            Err(e) => Err(Error::DeliveryFailed {
                text: text.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeMessenger;

    #[tokio::test]
    async fn sends_text_to_chat() {
        let messenger = Arc::new(FakeMessenger::new());
        let notifier = Notifier::new(messenger.clone());

        notifier.notify(ChatId(7), "hello").await.unwrap();

        assert_eq!(messenger.sent(), vec![(ChatId(7), "hello".to_string())]);
    }

    #[tokio::test]
    async fn failure_maps_to_delivery_failed_with_text() {
        let messenger = Arc::new(FakeMessenger::new());
        messenger.fail_next(1);
        let notifier = Notifier::new(messenger.clone());

        let err = notifier.notify(ChatId(7), "hello").await.unwrap_err();
        match err {
            Error::DeliveryFailed { text, reason } => {
                assert_eq!(text, "hello");
                assert!(reason.contains("fake send failure"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // No internal retry.
        assert_eq!(messenger.attempts(), 1);
    }

    #[tokio::test]
    async fn truncates_to_messenger_limit() {
        let messenger = Arc::new(FakeMessenger::with_limit(5));
        let notifier = Notifier::new(messenger.clone());

        notifier.notify(ChatId(1), "abcdefgh").await.unwrap();

        assert_eq!(messenger.sent()[0].1, "abcd…");
    }
}
