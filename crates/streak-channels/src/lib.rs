//! # streak-channels
//!
//! Messaging platform integrations for streak.

pub mod telegram;
