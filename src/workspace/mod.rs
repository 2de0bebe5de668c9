//! Workspace state manager.
//!
//! [`Workspace`] owns the in-memory tab → unit → note hierarchy, the active
//! selection pointers, and the per-unit chat transcripts for the lifetime of
//! a session. Every mutation goes through its operation set, which keeps the
//! selection pointers consistent with the loaded collections and
//! garbage-collects transcripts exactly when their unit is removed.

mod chat;
mod manager;

pub use chat::{ChatLine, ChatRole};
pub use manager::{Workspace, WorkspaceError};
