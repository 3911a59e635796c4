//! Core types for the murmur conversational bot.
//!
//! This crate defines the shared data structures used across the kernel,
//! memory stores, LLM driver, and Telegram transport. It contains no
//! business logic.

pub mod config;
pub mod error;
pub mod message;
