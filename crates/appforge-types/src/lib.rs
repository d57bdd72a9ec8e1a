//! Shared domain types for Appforge.
//!
//! This crate owns the data shapes that cross crate boundaries: chat
//! sessions and messages, completion request/response types, quota
//! snapshots, configuration, and error enums. It has no I/O.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod quota;
