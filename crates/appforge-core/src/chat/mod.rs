//! Chat session persistence: store trait and orchestrating service.

pub mod service;
pub mod store;

pub use service::ChatService;
pub use store::ChatStore;
