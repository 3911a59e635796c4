//! Telegram transport for the murmur bot.
//!
//! The kernel only sees the `Transport` trait (outbound text + typing
//! indicator) and a stream of `InboundEvent`s; this crate provides both over
//! the Telegram Bot API using long-polling.

pub mod adapter;
pub mod types;

pub use adapter::TelegramTransport;
pub use types::{InboundContent, InboundEvent, Transport};
