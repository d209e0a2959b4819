//! # streak-store
//!
//! Durable chat state for streak: one JSON snapshot of every tracked chat,
//! guarded by a single exclusive section and committed by atomic replace.

pub mod snapshot;
pub mod store;

pub use snapshot::Snapshot;
pub use store::StateStore;
