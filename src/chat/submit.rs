//! Endpoints for sending a chat message and getting the bot's reply.
//!
//! Sending is split into two requests so that the user's message shows up
//! straight away: the first request appends the message with a placeholder for
//! the reply, then the placeholder requests the reply, which waits on the
//! classification service.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_htmx::{HxRequest, HxReswap, SwapOption};
use maud::html;
use serde::Deserialize;

use crate::{
    Error, UserUuid,
    chat::{
        conversation::Conversation,
        models::ChatItem,
        page::{ChatState, message_form_view},
        view::{chat_item_view, pending_reply_view},
    },
    endpoints::{self, format_endpoint},
};

/// The form data for sending a chat message.
#[derive(Debug, Deserialize)]
pub struct MessageForm {
    pub message: String,
}

/// Append the user's message to the chat and mark it as waiting for a reply.
///
/// For HTMX requests, responds with the user's message, a placeholder that
/// fetches the reply and the message form in its disabled state. Plain form
/// submissions wait for the reply and then redirect back to the chat page.
pub async fn submit_message_endpoint(
    State(state): State<ChatState>,
    HxRequest(is_htmx_request): HxRequest,
    Path(user_uuid): Path<String>,
    Form(form): Form<MessageForm>,
) -> Response {
    let user = match UserUuid::new(&user_uuid) {
        Ok(user) => user,
        Err(error) => return error.into_alert_response(),
    };

    let local_offset = match state.local_offset() {
        Ok(local_offset) => local_offset,
        Err(error) => return error.into_alert_response(),
    };

    let user_message = match state
        .conversations
        .with_conversation(&user, |conversation| {
            conversation.begin_submission(&form.message)
        }) {
        Ok(item) => item,
        Err(error) => return error.into_alert_response(),
    };

    if !is_htmx_request {
        return match resolve_submission(&state, &user).await {
            Ok(_) => Redirect::to(&format_endpoint(endpoints::CHAT_VIEW, user.as_str()))
                .into_response(),
            Err(error) => error.into_response(),
        };
    }

    html! {
        (chat_item_view(&user_message, local_offset))
        (pending_reply_view(&user))
        (message_form_view(&user, "", true, true))
    }
    .into_response()
}

/// Send the pending message to the classification service and respond with
/// the bot's reply.
///
/// The reply is either the bot's comment and the recorded transaction, or a
/// single bot message saying what went wrong. Either way, the placeholder is
/// replaced and the message form is re-enabled.
pub async fn reply_endpoint(
    State(state): State<ChatState>,
    Path(user_uuid): Path<String>,
) -> Response {
    let user = match UserUuid::new(&user_uuid) {
        Ok(user) => user,
        Err(error) => return error.into_alert_response(),
    };

    let local_offset = match state.local_offset() {
        Ok(local_offset) => local_offset,
        Err(error) => return reply_error_response(&user, error),
    };

    let new_items = match resolve_submission(&state, &user).await {
        Ok(new_items) => new_items,
        Err(error) => return reply_error_response(&user, error),
    };

    html! {
        @for item in &new_items {
            (chat_item_view(item, local_offset))
        }
        (message_form_view(&user, "", false, true))
    }
    .into_response()
}

/// An alert for the alert container that also removes the reply placeholder
/// and re-enables the message form.
fn reply_error_response(user: &UserUuid, error: Error) -> Response {
    let (status_code, alert) = error.into_alert();

    (
        status_code,
        HxReswap(SwapOption::InnerHtml),
        html! {
            (alert.into_html())
            div id="pending-reply" hx-swap-oob="delete" {}
            (message_form_view(user, "", false, true))
        },
    )
        .into_response()
}

/// Classify the user's pending message and record the outcome in their conversation.
///
/// The message is claimed before the classification service is called, so a
/// message is sent at most once. The conversation lock is not held while
/// waiting on the classification service.
async fn resolve_submission(state: &ChatState, user: &UserUuid) -> Result<Vec<ChatItem>, Error> {
    let (submission_id, message) = state
        .conversations
        .with_conversation(user, Conversation::claim_pending)?;

    let outcome = state.backend.classify_message(&message, user).await;

    if let Err(error) = &outcome {
        tracing::error!("Could not record message from user {user}: {error}");
    }

    state
        .conversations
        .with_conversation(user, |conversation| {
            conversation.complete_submission(submission_id, outcome)
        })
        .inspect_err(|error| {
            if *error == Error::StaleReply {
                tracing::warn!("Dropped the reply to an earlier message from user {user}");
            }
        })
}

#[cfg(test)]
mod submit_message_endpoint_tests {
    use axum::{
        Form,
        extract::{FromRef, Path, State},
        http::StatusCode,
    };
    use axum_htmx::HxRequest;
    use scraper::Selector;

    use crate::{
        Error, UserUuid,
        chat::{conversation::Conversation, page::ChatState},
        endpoints::{self, format_endpoint},
        test_utils::{
            chat_items, get_header, must_get_form, parse_html_fragment, submit_button_is_disabled,
            test_app_state, unreachable_backend_url,
        },
    };

    use super::{MessageForm, submit_message_endpoint};

    /// State for a user "abc" who has the chat page open.
    fn open_chat_state(base_url: &str) -> ChatState {
        let state = ChatState::from_ref(&test_app_state(base_url));
        state
            .conversations
            .replace(UserUuid::new("abc").unwrap(), Conversation::default())
            .unwrap();

        state
    }

    fn form(message: &str) -> Form<MessageForm> {
        Form(MessageForm {
            message: message.to_owned(),
        })
    }

    #[tokio::test]
    async fn appends_user_message_with_pending_reply() {
        let state = open_chat_state(&unreachable_backend_url());

        let response = submit_message_endpoint(
            State(state.clone()),
            HxRequest(true),
            Path("abc".to_owned()),
            form("Spent 50k on coffee"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_eq!(chat_items(&html), vec![("message", Some("USER".to_owned()))]);
        let placeholder = html
            .select(&Selector::parse("#pending-reply").unwrap())
            .next()
            .expect("No pending reply placeholder found");
        assert_eq!(
            placeholder.value().attr("hx-post"),
            Some(format_endpoint(endpoints::CHAT_REPLY_API, "abc").as_str())
        );
        let form = must_get_form(&html);
        assert_eq!(form.value().attr("hx-swap-oob"), Some("true"));
        assert!(submit_button_is_disabled(&form));

        let user = UserUuid::new("abc").unwrap();
        let pending = state
            .conversations
            .with_conversation(&user, |conversation| {
                Ok(conversation.pending_message().map(str::to_owned))
            })
            .unwrap();
        assert_eq!(pending, Some("Spent 50k on coffee".to_owned()));
    }

    #[tokio::test]
    async fn rejects_empty_message() {
        let state = open_chat_state(&unreachable_backend_url());

        let response = submit_message_endpoint(
            State(state.clone()),
            HxRequest(true),
            Path("abc".to_owned()),
            form("   "),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let user = UserUuid::new("abc").unwrap();
        let item_count = state
            .conversations
            .with_conversation(&user, |conversation| Ok(conversation.items().len()))
            .unwrap();
        assert_eq!(item_count, 0);
    }

    #[tokio::test]
    async fn rejects_second_message_while_sending() {
        let state = open_chat_state(&unreachable_backend_url());
        submit_message_endpoint(
            State(state.clone()),
            HxRequest(true),
            Path("abc".to_owned()),
            form("first"),
        )
        .await;

        let response = submit_message_endpoint(
            State(state.clone()),
            HxRequest(true),
            Path("abc".to_owned()),
            form("second"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn rejects_invalid_user() {
        let state = open_chat_state(&unreachable_backend_url());

        let response = submit_message_endpoint(
            State(state),
            HxRequest(true),
            Path("a b".to_owned()),
            form("coffee 50k"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn user_without_open_chat_is_not_found() {
        let state = ChatState::from_ref(&test_app_state(&unreachable_backend_url()));

        let response = submit_message_endpoint(
            State(state.clone()),
            HxRequest(true),
            Path("someone-else".to_owned()),
            form("coffee 50k"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let user = UserUuid::new("someone-else").unwrap();
        assert_eq!(
            state.conversations.with_conversation(&user, |_| Ok(())),
            Err(Error::ConversationNotFound("someone-else".to_owned()))
        );
    }

    #[tokio::test]
    async fn plain_form_post_waits_for_reply_and_redirects() {
        let state = open_chat_state(&unreachable_backend_url());

        let response = submit_message_endpoint(
            State(state.clone()),
            HxRequest(false),
            Path("abc".to_owned()),
            form("coffee 50k"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            get_header(&response, "location"),
            format_endpoint(endpoints::CHAT_VIEW, "abc")
        );
        let user = UserUuid::new("abc").unwrap();
        let (item_count, is_sending) = state
            .conversations
            .with_conversation(&user, |conversation| {
                Ok((conversation.items().len(), conversation.is_sending()))
            })
            .unwrap();
        assert_eq!(item_count, 2);
        assert!(!is_sending);
    }
}
