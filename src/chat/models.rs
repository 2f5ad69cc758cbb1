//! The messages and transactions exchanged with the classification service.

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "USER",
            Sender::Bot => "BOT",
        }
    }
}

/// Anything other than "USER" is treated as the bot.
impl From<String> for Sender {
    fn from(value: String) -> Self {
        if value == "USER" {
            Sender::User
        } else {
            Sender::Bot
        }
    }
}

/// A plain chat bubble.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub sender: Sender,
    pub message: String,
    /// The time the message was sent, as given by the classification service.
    ///
    /// Kept as the raw string since the service does not guarantee a format.
    #[serde(default)]
    pub created_at: String,
}

impl ChatMessage {
    /// A message from the user, stamped with the current time.
    pub fn from_user(message: &str) -> Self {
        Self::now(Sender::User, message)
    }

    /// A message from the bot, stamped with the current time.
    pub fn from_bot(message: &str) -> Self {
        Self::now(Sender::Bot, message)
    }

    fn now(sender: Sender, message: &str) -> Self {
        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();

        Self {
            sender,
            message: message.to_owned(),
            created_at,
        }
    }
}

/// An income or expense event that the classification service derived from
/// the user's message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionRecord {
    /// Whether the transaction is an income or an expense, e.g. "expense".
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub date: String,
}

impl TransactionRecord {
    pub fn is_income(&self) -> bool {
        self.kind.eq_ignore_ascii_case("income")
    }
}

/// One row in the chat box.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatItem {
    Message(ChatMessage),
    Transaction(TransactionRecord),
}

/// A chat turn as returned by the history endpoint.
///
/// Bot turns carry the transaction that was recorded in reply to the user's
/// previous message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub message: ChatMessage,
    #[serde(default)]
    pub transaction: Option<TransactionRecord>,
}

impl HistoryEntry {
    /// Split the turn into display items.
    ///
    /// User turns become a single message item. Bot turns become a message
    /// item followed by a transaction item, if the turn has a transaction.
    pub fn into_items(self) -> Vec<ChatItem> {
        let transaction = match self.message.sender {
            Sender::User => None,
            Sender::Bot => self.transaction,
        };

        let mut items = vec![ChatItem::Message(self.message)];

        if let Some(transaction) = transaction {
            items.push(ChatItem::Transaction(transaction));
        }

        items
    }
}

/// The request body for classifying a message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoTransactionRequest<'a> {
    pub message: &'a str,
    pub user_uuid: &'a str,
}

/// The reply to a classified message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AutoTransactionResponse {
    pub transaction: TransactionRecord,
    /// The bot's reply to show in the chat, e.g. "Recorded".
    pub comment: String,
}

#[cfg(test)]
mod history_entry_tests {
    use serde_json::json;

    use super::{AutoTransactionRequest, ChatItem, HistoryEntry, Sender};

    #[test]
    fn user_turn_is_one_item() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "sender": "USER",
            "message": "Spent 50k on coffee",
            "createdAt": "2024-01-01T08:30:00"
        }))
        .unwrap();

        let items = entry.into_items();

        assert_eq!(items.len(), 1);
        let ChatItem::Message(message) = &items[0] else {
            panic!("want message item, got {:?}", items[0]);
        };
        assert_eq!(message.sender, Sender::User);
        assert_eq!(message.message, "Spent 50k on coffee");
        assert_eq!(message.created_at, "2024-01-01T08:30:00");
    }

    #[test]
    fn bot_turn_is_message_then_transaction() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "sender": "BOT",
            "message": "Recorded",
            "createdAt": "2024-01-01T08:30:01",
            "transaction": {
                "type": "expense",
                "category": "food",
                "description": "coffee",
                "amount": 50000,
                "date": "2024-01-01"
            }
        }))
        .unwrap();

        let items = entry.into_items();

        assert_eq!(items.len(), 2);
        assert!(matches!(&items[0], ChatItem::Message(message) if message.sender == Sender::Bot));
        let ChatItem::Transaction(transaction) = &items[1] else {
            panic!("want transaction item, got {:?}", items[1]);
        };
        assert_eq!(transaction.kind, "expense");
        assert_eq!(transaction.amount, 50000.0);
        assert!(!transaction.is_income());
    }

    #[test]
    fn bot_turn_without_transaction_is_one_item() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "sender": "BOT",
            "message": "Hello!",
            "createdAt": "2024-01-01T08:30:01",
            "transaction": null
        }))
        .unwrap();

        assert_eq!(entry.into_items().len(), 1);
    }

    #[test]
    fn unknown_sender_is_bot() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "sender": "ASSISTANT",
            "message": "Hi"
        }))
        .unwrap();

        assert_eq!(entry.message.sender, Sender::Bot);
        assert_eq!(entry.message.created_at, "");
    }

    #[test]
    fn request_uses_camel_case() {
        let request = AutoTransactionRequest {
            message: "Got paid 10m",
            user_uuid: "abc-123",
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"message": "Got paid 10m", "userUuid": "abc-123"})
        );
    }
}
