//! Renders chat items as rows in the chat box.

use maud::{Markup, html};
use time::{
    OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::well_known::Rfc3339,
    macros::format_description,
};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    UserUuid,
    chat::models::{ChatItem, ChatMessage, Sender, TransactionRecord},
    endpoints::{self, format_endpoint},
    html::{format_amount, loading_spinner},
};

/// The max number of graphemes of a transaction description to display
/// before truncating and displaying ellipses.
const MAX_DESCRIPTION_GRAPHEMES: usize = 32;

const USER_BUBBLE_STYLE: &str = "max-w-[75%] rounded-lg px-3 py-2 text-sm \
    bg-blue-600 text-white";
const BOT_BUBBLE_STYLE: &str = "max-w-[75%] rounded-lg px-3 py-2 text-sm \
    bg-gray-200 text-gray-900 dark:bg-gray-700 dark:text-white";

/// Render one row of the chat box.
///
/// Timestamps are displayed in the timezone given by `local_offset`.
pub fn chat_item_view(item: &ChatItem, local_offset: UtcOffset) -> Markup {
    match item {
        ChatItem::Message(message) => message_view(message, local_offset),
        ChatItem::Transaction(transaction) => transaction_card_view(transaction),
    }
}

fn message_view(message: &ChatMessage, local_offset: UtcOffset) -> Markup {
    let (row_style, bubble_style, time_style) = match message.sender {
        Sender::User => ("flex justify-end", USER_BUBBLE_STYLE, "text-blue-100"),
        Sender::Bot => (
            "flex justify-start",
            BOT_BUBBLE_STYLE,
            "text-gray-500 dark:text-gray-400",
        ),
    };
    let display_time = format_created_at(&message.created_at, local_offset);

    html! {
        div
            class={ (row_style) " mb-2" }
            data-item="message"
            data-sender=(message.sender.as_str())
        {
            div class=(bubble_style)
            {
                p class="whitespace-pre-wrap break-words" { (message.message) }

                @if !display_time.is_empty() {
                    time
                        class={ "block text-right text-xs mt-1 " (time_style) }
                        datetime=(message.created_at)
                    {
                        (display_time)
                    }
                }
            }
        }
    }
}

fn transaction_card_view(transaction: &TransactionRecord) -> Markup {
    let (amount_style, amount_sign) = if transaction.is_income() {
        ("text-green-700 dark:text-green-300", "+")
    } else {
        ("text-red-700 dark:text-red-300", "-")
    };
    let (description, full_description) = format_description(&transaction.description);

    html! {
        div
            class="flex justify-start mb-2"
            data-item="transaction"
            data-amount=(transaction.amount)
        {
            div
                class="w-3/4 rounded-lg border border-gray-200 dark:border-gray-600
                    bg-white dark:bg-gray-800 p-3 text-sm text-gray-900 dark:text-white shadow-sm"
            {
                div class="flex justify-between items-center mb-1"
                {
                    span
                        class="inline-flex items-center px-2.5 py-0.5 text-xs
                            font-semibold text-blue-800 bg-blue-100 rounded-full
                            dark:bg-blue-900 dark:text-blue-300"
                    {
                        (transaction.category)
                    }

                    span class="text-xs uppercase text-gray-500 dark:text-gray-400"
                    {
                        (transaction.kind)
                    }
                }

                p class="font-medium" title=[full_description] { (description) }

                div class="flex justify-between items-end mt-1"
                {
                    span class="text-xs text-gray-500 dark:text-gray-400" { (transaction.date) }

                    span class={ "text-base font-bold " (amount_style) }
                    {
                        (amount_sign) (format_amount(transaction.amount.abs()))
                    }
                }
            }
        }
    }
}

/// The bot's "typing" bubble that asks the server for the reply to the
/// pending message as soon as it is added to the page.
pub fn pending_reply_view(user: &UserUuid) -> Markup {
    let reply_endpoint = format_endpoint(endpoints::CHAT_REPLY_API, user.as_str());

    html! {
        div
            id="pending-reply"
            class="flex justify-start mb-2"
            hx-post=(reply_endpoint)
            hx-trigger="load"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
        {
            div class=(BOT_BUBBLE_STYLE) { (loading_spinner()) }
        }
    }
}

/// Truncate long descriptions, returning the full description as well if it was truncated.
fn format_description(description: &str) -> (String, Option<&str>) {
    let description_length = description.graphemes(true).count();

    if description_length <= MAX_DESCRIPTION_GRAPHEMES {
        (description.to_owned(), None)
    } else {
        let truncated: String = description
            .graphemes(true)
            .take(MAX_DESCRIPTION_GRAPHEMES - 3)
            .collect();
        (truncated + "...", Some(description))
    }
}

/// Format a message timestamp as "HH:MM".
///
/// Timestamps with an offset are converted to `local_offset`, timestamps
/// without one are assumed to already be local time. Anything else is
/// returned unchanged.
fn format_created_at(created_at: &str, local_offset: UtcOffset) -> String {
    let time_format = format_description!("[hour]:[minute]");

    let local_time = if let Ok(date_time) = OffsetDateTime::parse(created_at, &Rfc3339) {
        date_time.to_offset(local_offset).time()
    } else if let Ok(date_time) = PrimitiveDateTime::parse(
        created_at,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            created_at,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
    }) {
        date_time.time()
    } else {
        return created_at.to_owned();
    };

    local_time
        .format(time_format)
        .unwrap_or_else(|_| created_at.to_owned())
}
