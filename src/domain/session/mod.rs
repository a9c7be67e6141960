//! Session domain - durable per-conversation state of the drafting workflow

mod entity;
mod store;

pub use entity::{validate_session_id, ConversationTurn, SessionId, SessionRecord, MAX_SESSION_ID_LENGTH};
pub use store::SessionStore;
