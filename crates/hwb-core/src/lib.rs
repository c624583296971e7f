//! Core domain + application logic for the homework status bot.
//!
//! This crate is intentionally transport-agnostic. The Practicum status API and
//! Telegram live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod notifier;
pub mod poll;
pub mod ports;
pub mod retry;
pub mod status;

#[cfg(test)]
mod fakes;

pub use errors::{Error, ErrorKind, Result};
