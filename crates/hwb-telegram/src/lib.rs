//! Telegram adapter (teloxide).
//!
//! This crate implements the `hwb-core` MessagingPort over the Telegram Bot API.

use async_trait::async_trait;

use teloxide::prelude::*;
use tracing::debug;

use hwb_core::{
    config::Config,
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{port::MessagingPort, types::MessagingCapabilities},
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Build a bot whose HTTP client gives up after `cfg.send_timeout`.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let client = teloxide::net::default_reqwest_settings()
            .timeout(cfg.send_timeout)
            .build()
            .map_err(|e| Error::External(format!("telegram client build error: {e}")))?;
        Ok(Self::new(Bot::with_client(cfg.telegram_token.clone(), client)))
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(&self, e: teloxide::RequestError) -> Error {
        Error::External(redact(&format!("telegram error: {e}"), self.bot.token()))
    }
}

/// Remove every occurrence of `secret` from `text`.
fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret, "***")
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_message_len: 4096,
        }
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        debug!(chat_id = chat_id.0, len = text.len(), "sending telegram message");
        let msg = self
            .bot
            .send_message(Self::tg_chat(chat_id), text.to_string())
            .await
            .map_err(|e| self.map_err(e))?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }
}
