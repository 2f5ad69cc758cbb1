//! The chat screen for recording income and expenses with the help of the
//! classification service.

mod conversation;
mod models;
mod page;
mod submit;
mod view;

pub use conversation::{ConversationStore, MAX_MESSAGE_GRAPHEMES};
pub use models::{AutoTransactionRequest, AutoTransactionResponse, HistoryEntry};
pub use page::{get_chat_page, get_chat_start_page};
pub use submit::{reply_endpoint, submit_message_endpoint};
