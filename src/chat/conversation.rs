//! The state of a user's chat screen and the store that holds it between requests.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use unicode_segmentation::UnicodeSegmentation;

use crate::{
    Error, UserUuid,
    chat::models::{AutoTransactionResponse, ChatItem, ChatMessage, HistoryEntry},
};

/// The max number of graphemes a user may send in a single message.
pub const MAX_MESSAGE_GRAPHEMES: usize = 1000;

/// The bot message shown when the classification service rejects a message.
pub const PROCESSING_FAILED_MESSAGE: &str = "An error occurred while processing your request.";

/// The bot message shown when the classification service cannot be reached.
pub const CONNECTION_FAILED_MESSAGE: &str = "Could not connect to the server.";

/// How long a conversation may go unused before the store drops it.
pub const CONVERSATION_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Submission IDs are unique across all conversations, so a reply that
/// outlives a page reload can never match a message sent after the reload.
static NEXT_SUBMISSION_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one sent message and the reply it is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionId(u64);

impl SubmissionId {
    fn next() -> Self {
        Self(NEXT_SUBMISSION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A message that is waiting for a reply.
#[derive(Debug, Clone, PartialEq)]
struct PendingSubmission {
    id: SubmissionId,
    message: String,
    /// Set once a reply request has sent the message to the classification service.
    claimed: bool,
}

/// The chat box of a single user: the items on screen, in arrival order, and
/// the message that is waiting for a reply, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    items: Vec<ChatItem>,
    pending: Option<PendingSubmission>,
}

impl Conversation {
    /// Create a conversation from the chat history, keeping the order of the turns.
    pub fn from_history(history: Vec<HistoryEntry>) -> Self {
        let items = history
            .into_iter()
            .flat_map(HistoryEntry::into_items)
            .collect();

        Self {
            items,
            pending: None,
        }
    }

    pub fn items(&self) -> &[ChatItem] {
        &self.items
    }

    /// Whether a message has been sent and is waiting for a reply.
    pub fn is_sending(&self) -> bool {
        self.pending.is_some()
    }

    /// The message waiting for a reply.
    pub fn pending_message(&self) -> Option<&str> {
        self.pending
            .as_ref()
            .map(|pending| pending.message.as_str())
    }

    /// Append the user's message and mark it as waiting for a reply.
    ///
    /// Returns the appended item.
    ///
    /// # Errors
    /// - [Error::SubmissionInFlight] if another message is waiting for a reply,
    /// - [Error::EmptyMessage] or [Error::MessageTooLong] if `text` is not a valid message.
    pub fn begin_submission(&mut self, text: &str) -> Result<ChatItem, Error> {
        if self.is_sending() {
            return Err(Error::SubmissionInFlight);
        }

        validate_message(text)?;

        let item = ChatItem::Message(ChatMessage::from_user(text));
        self.items.push(item.clone());
        self.pending = Some(PendingSubmission {
            id: SubmissionId::next(),
            message: text.to_owned(),
            claimed: false,
        });

        Ok(item)
    }

    /// Take responsibility for sending the pending message to the
    /// classification service.
    ///
    /// Returns the ID to complete the submission with and the message to send.
    ///
    /// # Errors
    /// - [Error::NoPendingMessage] if no message is waiting for a reply,
    /// - [Error::ReplyAlreadyRequested] if the message was already claimed.
    pub fn claim_pending(&mut self) -> Result<(SubmissionId, String), Error> {
        let pending = self.pending.as_mut().ok_or(Error::NoPendingMessage)?;

        if pending.claimed {
            return Err(Error::ReplyAlreadyRequested);
        }

        pending.claimed = true;

        Ok((pending.id, pending.message.clone()))
    }

    /// Append the reply to the submission `id` and clear the sending flag.
    ///
    /// A successful `outcome` adds the bot's comment and the recorded
    /// transaction, a failed one adds a single bot message describing the
    /// failure. Returns the appended items.
    ///
    /// # Errors
    /// Returns [Error::StaleReply] if `id` is not the pending submission, in
    /// which case `outcome` is dropped and the conversation is unchanged.
    pub fn complete_submission(
        &mut self,
        id: SubmissionId,
        outcome: Result<AutoTransactionResponse, Error>,
    ) -> Result<Vec<ChatItem>, Error> {
        if self.pending.as_ref().map(|pending| pending.id) != Some(id) {
            return Err(Error::StaleReply);
        }

        self.pending = None;

        let new_items = match outcome {
            Ok(AutoTransactionResponse {
                transaction,
                comment,
            }) => vec![
                ChatItem::Message(ChatMessage::from_bot(&comment)),
                ChatItem::Transaction(transaction),
            ],
            Err(error) => vec![ChatItem::Message(ChatMessage::from_bot(failure_message(
                &error,
            )))],
        };

        self.items.extend(new_items.iter().cloned());

        Ok(new_items)
    }
}

/// Check that `text` is non-blank and at most [MAX_MESSAGE_GRAPHEMES] long.
pub fn validate_message(text: &str) -> Result<(), Error> {
    if text.trim().is_empty() {
        return Err(Error::EmptyMessage);
    }

    let length = text.graphemes(true).count();
    if length > MAX_MESSAGE_GRAPHEMES {
        return Err(Error::MessageTooLong(length));
    }

    Ok(())
}

/// The bot message to show for a failed submission.
pub fn failure_message(error: &Error) -> &'static str {
    match error {
        Error::BackendUnreachable(_) => CONNECTION_FAILED_MESSAGE,
        _ => PROCESSING_FAILED_MESSAGE,
    }
}

#[derive(Debug)]
struct StoredConversation {
    conversation: Conversation,
    last_active: Instant,
}

/// The conversations of all users that have the chat screen open.
///
/// Only loading the chat page adds a conversation, which replaces the user's
/// previous one. Conversations unused for longer than the idle timeout are
/// dropped whenever a conversation is added.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    conversations: Arc<Mutex<HashMap<UserUuid, StoredConversation>>>,
    idle_timeout: Duration,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self {
            conversations: Arc::default(),
            idle_timeout: CONVERSATION_IDLE_TIMEOUT,
        }
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the conversation of `user` and drop idle conversations.
    ///
    /// # Errors
    /// Returns [Error::ConversationLockError] if the lock is poisoned.
    pub fn replace(&self, user: UserUuid, conversation: Conversation) -> Result<(), Error> {
        let mut conversations = self.lock()?;
        let now = Instant::now();

        conversations
            .retain(|_, stored| now.duration_since(stored.last_active) < self.idle_timeout);
        conversations.insert(
            user,
            StoredConversation {
                conversation,
                last_active: now,
            },
        );

        Ok(())
    }

    /// Run `f` on the conversation of `user`.
    ///
    /// The lock is held for the duration of `f`, so `f` must not block.
    ///
    /// # Errors
    /// - [Error::ConversationNotFound] if `user` has not opened the chat page,
    /// - [Error::ConversationLockError] if the lock is poisoned,
    /// - the error returned by `f`.
    pub fn with_conversation<T>(
        &self,
        user: &UserUuid,
        f: impl FnOnce(&mut Conversation) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut conversations = self.lock()?;
        let stored = conversations
            .get_mut(user)
            .ok_or_else(|| Error::ConversationNotFound(user.to_string()))?;
        stored.last_active = Instant::now();

        f(&mut stored.conversation)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<UserUuid, StoredConversation>>, Error> {
        self.conversations.lock().map_err(|error| {
            tracing::error!("could not acquire conversation lock: {error}");
            Error::ConversationLockError
        })
    }
}
