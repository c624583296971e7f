//! Hand-rolled port fakes shared by the unit tests.

use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    domain::{ChatId, Cursor, MessageId, MessageRef},
    errors::{EndpointFailure, Error, RequestContext},
    messaging::{port::MessagingPort, types::MessagingCapabilities},
    ports::StatusSource,
    Result,
};

#[derive(Default)]
pub struct FakeMessenger {
    limit: Option<usize>,
    sent: Mutex<Vec<(ChatId, String)>>,
    attempts: Mutex<usize>,
    failures_left: Mutex<usize>,
}

impl FakeMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    /// Make the next `n` sends fail.
    pub fn fail_next(&self, n: usize) {
        *self.failures_left.lock().unwrap() = n;
    }

    pub fn sent(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, t)| t).collect()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        match self.limit {
            Some(max_message_len) => MessagingCapabilities { max_message_len },
            None => MessagingCapabilities::default(),
        }
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        let id = {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            *attempts as i32
        };
        {
            let mut left = self.failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(Error::External("fake send failure".to_string()));
            }
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(id),
        })
    }
}

/// Status source that replays scripted responses and records cursors.
#[derive(Default)]
pub struct FakeSource {
    responses: Mutex<VecDeque<Result<Value>>>,
    cursors: Mutex<Vec<Cursor>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, payload: Value) {
        self.responses.lock().unwrap().push_back(Ok(payload));
    }

    pub fn push_unavailable(&self) {
        self.responses.lock().unwrap().push_back(Err(unavailable()));
    }

    pub fn cursors(&self) -> Vec<Cursor> {
        self.cursors.lock().unwrap().clone()
    }
}

pub fn unavailable() -> Error {
    Error::EndpointUnavailable {
        request: RequestContext {
            url: "https://status.test/api/".to_string(),
            headers: vec![("Authorization".to_string(), "OAuth ***".to_string())],
            params: vec![("from_date".to_string(), "0".to_string())],
        },
        failure: EndpointFailure::Transport("connection refused".to_string()),
    }
}

#[async_trait]
impl StatusSource for FakeSource {
    async fn fetch(&self, cursor: Cursor) -> Result<Value> {
        self.cursors.lock().unwrap().push(cursor);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unavailable()))
    }
}
