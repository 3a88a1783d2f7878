//! # concierge-session
//!
//! Conversation state lifecycle: the session-keyed store, versioned
//! all-or-nothing commits, one-turn-at-a-time permits, idle expiry and
//! per-session analytics.

pub mod analytics;
pub mod cleanup;
pub mod lifecycle;
pub mod manager;
pub mod store;

pub use analytics::SessionAnalytics;
pub use cleanup::{cleanup_idle_sessions, spawn_expiry_sweeper};
pub use lifecycle::{StateLookup, TurnPermit};
pub use manager::ContextManager;
pub use store::InMemorySessionStore;
