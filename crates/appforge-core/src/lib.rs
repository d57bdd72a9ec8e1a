//! Business logic for the Appforge chat gateway.
//!
//! Contains the trait seams (completion gateway, chat store) and the
//! pipeline building blocks: the quota tracker, multi-model fan-out,
//! and the chat service. Infrastructure implementations live in
//! appforge-infra; this crate never depends on it.

pub mod chat;
pub mod fanout;
pub mod gateway;
pub mod quota;
