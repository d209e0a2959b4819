//! # streak-core
//!
//! Core types, traits, configuration, and error handling for the streak bot:
//! the title codec, the per-chat streak state machine, and day schedule math.

pub mod config;
pub mod error;
pub mod message;
pub mod schedule;
pub mod streak;
pub mod title;
pub mod traits;

pub use config::shellexpand;
