use std::{env, fs, path::Path, time::Duration};

use crate::{domain::ChatId, errors::Error, retry::RetryPolicy, Result};

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Typed configuration, built once at startup and passed down explicitly.
#[derive(Clone, Debug)]
pub struct Config {
    // Secrets
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: ChatId,

    // Status API
    pub endpoint: String,
    pub request_timeout: Duration,

    // Telegram
    pub send_timeout: Duration,

    // Loop behaviour
    pub retry: RetryPolicy,
    pub suppress_repeated_errors: bool,
}

impl Config {
    /// Load `.env` (if present) and then read the process environment.
    pub fn load(dotenv: &Path) -> Result<Self> {
        load_dotenv_if_present(dotenv);
        Self::from_env()
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let practicum_token = required(&lookup, "PRACTICUM_TOKEN")?;
        let telegram_token = required(&lookup, "TELEGRAM_TOKEN")?;
        let raw_chat_id = required(&lookup, "TELEGRAM_CHAT_ID")?;
        let telegram_chat_id = raw_chat_id.trim().parse::<i64>().map(ChatId).map_err(|_| {
            Error::Config(format!(
                "TELEGRAM_CHAT_ID must be a numeric chat id, got {raw_chat_id:?}"
            ))
        })?;

        let endpoint = lookup("PRACTICUM_ENDPOINT")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let request_timeout =
            Duration::from_millis(parse(&lookup, "REQUEST_TIMEOUT_MS").unwrap_or(30_000));
        let send_timeout =
            Duration::from_millis(parse(&lookup, "SEND_TIMEOUT_MS").unwrap_or(30_000));

        let interval = Duration::from_secs(parse(&lookup, "RETRY_TIME").unwrap_or(600));
        let max_interval = Duration::from_secs(parse(&lookup, "MAX_RETRY_TIME").unwrap_or(3600));
        let multiplier = parse(&lookup, "BACKOFF_MULTIPLIER")
            .filter(|m: &f64| m.is_finite() && *m >= 1.0)
            .unwrap_or(1.0);
        if interval.is_zero() {
            return Err(Error::Config("RETRY_TIME must be positive".to_string()));
        }

        let suppress_repeated_errors = lookup("SUPPRESS_REPEATED_ERRORS")
            .map(|s| parse_bool(&s))
            .unwrap_or(true);

        Ok(Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
            endpoint,
            request_timeout,
            send_timeout,
            retry: RetryPolicy {
                interval,
                multiplier,
                max_interval: max_interval.max(interval),
            },
            suppress_repeated_errors,
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .and_then(non_empty)
        .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
}

fn parse<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|s| s.trim().parse::<T>().ok())
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Populate the process environment from a `KEY=VALUE` file.
///
/// Variables already set in the environment are left untouched.
pub fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}
