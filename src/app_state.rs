//! Implements a struct that holds the state of the server.

use crate::{BackendClient, Error, chat::ConversationStore, timezone::get_local_offset};

/// The state of the server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The client for the transaction classification service.
    pub backend: BackendClient,

    /// The conversation of each user who has opened the chat since the server started.
    pub conversations: ConversationStore,

    /// The local timezone as a canonical timezone name, e.g. "Asia/Ho_Chi_Minh".
    pub local_timezone: String,
}

impl AppState {
    /// Create a new [AppState] with no conversations.
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Asia/Ho_Chi_Minh".
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezoneError] if `local_timezone` is not a known timezone.
    pub fn new(backend: BackendClient, local_timezone: &str) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
        }

        Ok(Self {
            backend,
            conversations: ConversationStore::new(),
            local_timezone: local_timezone.to_owned(),
        })
    }
}
