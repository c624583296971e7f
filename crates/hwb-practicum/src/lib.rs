//! Practicum adapter (homework status API over reqwest).
//!
//! Implements the `hwb-core` StatusSource port: one GET per cycle with an
//! OAuth token and the `from_date` cursor.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, StatusCode};
use serde_json::Value;
use tracing::debug;

use hwb_core::{
    config::Config,
    domain::Cursor,
    errors::{EndpointFailure, Error, RequestContext},
    ports::StatusSource,
    Result,
};

#[derive(Clone)]
pub struct PracticumClient {
    endpoint: String,
    token: String,
    http: reqwest::Client,
}

impl PracticumClient {
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("http client build error: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into(),
            token: token.into(),
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(
            cfg.endpoint.clone(),
            cfg.practicum_token.clone(),
            cfg.request_timeout,
        )
    }

    fn unavailable(&self, cursor: Cursor, failure: EndpointFailure) -> Error {
        Error::EndpointUnavailable {
            request: RequestContext {
                url: self.endpoint.clone(),
                // Never leak the token into logs or chat messages.
                headers: vec![("Authorization".to_string(), "OAuth ***".to_string())],
                params: vec![("from_date".to_string(), cursor.to_string())],
            },
            failure,
        }
    }
}

fn classify(e: &reqwest::Error) -> EndpointFailure {
    if e.is_timeout() {
        EndpointFailure::Timeout
    } else if e.is_decode() {
        EndpointFailure::Decode(e.to_string())
    } else {
        EndpointFailure::Transport(e.to_string())
    }
}

#[async_trait]
impl StatusSource for PracticumClient {
    #[tracing::instrument(name = "fetch", skip_all, fields(%cursor))]
    async fn fetch(&self, cursor: Cursor) -> Result<Value> {
        debug!(endpoint = %self.endpoint, "requesting homework statuses");

        let resp = self
            .http
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", cursor.0)])
            .send()
            .await
            .map_err(|e| self.unavailable(cursor, classify(&e)))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(self.unavailable(cursor, EndpointFailure::Status(status.as_u16())));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| self.unavailable(cursor, classify(&e)))
    }
}
