//! Conversational Q&A over translated transcripts.
//!
//! The bilingual transcript and recent conversation turns are sent to a
//! hosted chat model; each answered question is appended to a persisted
//! interaction log.

mod backend;
mod log;
mod session;

pub use backend::{ChatBackend, ChatMessage, ChatRole, OpenAiChat};
pub use log::{ConversationTurn, InteractionLog};
pub use session::QaSession;
