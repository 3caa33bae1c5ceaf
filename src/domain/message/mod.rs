//! Problem → chat message correlation.
//!
//! - `entity`: persisted record of which chat message represents a problem
//! - `store`: storage abstraction over that record
//! - `messenger`: send/delete capability against the chat endpoint
//! - `service`: the decision procedure driven once per monitoring event

pub mod dto;
pub mod entity;
pub mod messenger;
pub mod service;
pub mod store;

pub use dto::{ActiveMessage, Invocation, NewRecord, Outcome, TriggerStatus};
pub use entity::problem_message::RecordStatus;
pub use messenger::{Messenger, TelegramMessenger};
pub use service::MessageCorrelator;
pub use store::{MemoryMessageStore, MessageStore, SeaOrmMessageStore, UnavailableStore};
