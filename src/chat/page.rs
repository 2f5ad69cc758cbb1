//! The chat screen and the page for choosing whose chat to open.

use axum::{
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, PreEscaped, html};
use serde::Deserialize;
use time::UtcOffset;

use crate::{
    AppState, BackendClient, Error, UserUuid,
    chat::{
        conversation::{Conversation, ConversationStore},
        view::chat_item_view,
    },
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        ICON_BUTTON_STYLE, base,
    },
    timezone::get_local_offset,
};

/// Enables the send button only while the input has non-blank text.
const TOGGLE_SUBMIT_BUTTON_SCRIPT: &str =
    "document.getElementById('submit-button').disabled = this.value.trim() === ''";

/// Disables the send button for blank input as soon as the form is shown.
const INIT_SUBMIT_BUTTON_SCRIPT: &str = "document.getElementById('submit-button').disabled = \
    document.getElementById('message').value.trim() === ''";

/// The state needed for the chat screen and its endpoints.
#[derive(Debug, Clone)]
pub struct ChatState {
    pub backend: BackendClient,
    pub conversations: ConversationStore,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Ho_Chi_Minh".
    pub local_timezone: String,
}

impl FromRef<AppState> for ChatState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
            conversations: state.conversations.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl ChatState {
    pub fn local_offset(&self) -> Result<UtcOffset, Error> {
        get_local_offset(&self.local_timezone)
            .ok_or_else(|| Error::InvalidTimezoneError(self.local_timezone.clone()))
    }
}

/// The query string of the chat start page.
#[derive(Debug, Deserialize)]
pub struct ChatStartQuery {
    pub user: Option<String>,
}

/// Display the page asking for a user ID, or open the chat if one was given.
pub async fn get_chat_start_page(Query(query): Query<ChatStartQuery>) -> Response {
    let raw_user = query.user.unwrap_or_default();

    if raw_user.trim().is_empty() {
        return chat_start_view("", None).into_response();
    }

    match UserUuid::new(&raw_user) {
        Ok(user) => {
            Redirect::to(&format_endpoint(endpoints::CHAT_VIEW, user.as_str())).into_response()
        }
        Err(error) => {
            chat_start_view(&raw_user, Some(&format!("Error: {error}"))).into_response()
        }
    }
}

/// Display the chat screen of a user.
///
/// Loading the page fetches the user's chat history and starts a new
/// conversation from it. If the history cannot be fetched, the chat box
/// starts out empty.
pub async fn get_chat_page(
    State(state): State<ChatState>,
    Path(user_uuid): Path<String>,
) -> Response {
    let user = match UserUuid::new(&user_uuid) {
        Ok(user) => user,
        Err(error) => return error.into_response(),
    };

    let local_offset = match state.local_offset() {
        Ok(local_offset) => local_offset,
        Err(error) => return error.into_response(),
    };

    let conversation = load_conversation(&state.backend, &user).await;
    let page = chat_view(&user, &conversation, local_offset);

    match state.conversations.replace(user, conversation) {
        Ok(()) => page.into_response(),
        Err(error) => error.into_response(),
    }
}

async fn load_conversation(backend: &BackendClient, user: &UserUuid) -> Conversation {
    match backend.fetch_history(user).await {
        Ok(history) => Conversation::from_history(history),
        Err(error) => {
            tracing::warn!("Could not load chat history for user {user}: {error}");
            Conversation::default()
        }
    }
}

fn chat_view(user: &UserUuid, conversation: &Conversation, local_offset: UtcOffset) -> Markup {
    let content = html! {
        div class="flex flex-col w-full min-h-screen bg-white dark:bg-gray-900"
        {
            header class="relative flex items-center justify-center h-16 px-4 bg-blue-600 text-white"
            {
                a
                    href=(endpoints::CHAT_START_VIEW)
                    aria-label="Back"
                    class="absolute left-4"
                {
                    (back_icon())
                }

                h1 class="font-bold text-lg" { "Add income/expense" }
            }

            section class="flex flex-col flex-1 justify-between gap-4 w-full max-w-2xl mx-auto p-6"
            {
                div class="flex flex-col items-center gap-2"
                {
                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Record your income and expenses here!"
                    }

                    div class="p-3 bg-blue-600 rounded-full"
                    {
                        img src="/static/chatbot.svg" alt="" class="w-8 h-8";
                    }
                }

                div id="chatbox" class="flex-1 overflow-y-auto"
                {
                    @for item in conversation.items() {
                        (chat_item_view(item, local_offset))
                    }
                }

                (message_form_view(user, "", conversation.is_sending(), false))
            }
        }
    };

    base("Chat", &content)
}

/// The message input with its send button.
///
/// The send button is disabled while a message is being sent. Blank input is
/// rejected by the `required` attribute and, with JavaScript, by disabling the
/// send button, so the form still works as a plain form post. Set `out_of_band` when the form is returned alongside other content
/// so that HTMX swaps it into the existing form.
pub fn message_form_view(
    user: &UserUuid,
    input: &str,
    is_sending: bool,
    out_of_band: bool,
) -> Markup {
    let messages_endpoint = format_endpoint(endpoints::CHAT_MESSAGES_API, user.as_str());

    html! {
        form
            id="message-form"
            method="post"
            action=(messages_endpoint)
            hx-post=(messages_endpoint)
            hx-target="#chatbox"
            hx-swap="beforeend"
            hx-target-error="#alert-container"
            hx-swap-oob=[out_of_band.then_some("true")]
            class="flex w-full h-12 gap-2 items-center"
        {
            input
                type="text"
                name="message"
                id="message"
                placeholder="Enter an income or expense..."
                autocomplete="off"
                required
                autofocus
                value=(input)
                disabled[is_sending]
                hx-on-input=(TOGGLE_SUBMIT_BUTTON_SCRIPT)
                class=(FORM_TEXT_INPUT_STYLE);

            // Voice input is not supported yet, the button only mirrors the input's state.
            button
                type="button"
                id="microphone-button"
                aria-label="Voice input"
                disabled[is_sending]
                class=(ICON_BUTTON_STYLE)
            {
                (microphone_icon())
            }

            button
                type="submit"
                id="submit-button"
                aria-label="Send"
                disabled[is_sending]
                class=(ICON_BUTTON_STYLE)
            {
                (send_icon())
            }

            @if !is_sending {
                script { (PreEscaped(INIT_SUBMIT_BUTTON_SCRIPT)) }
            }
        }
    }
}

fn chat_start_view(user: &str, error_message: Option<&str>) -> Markup {
    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-6 text-xl font-bold leading-tight tracking-tight md:text-2xl"
            {
                "Open your chat"
            }

            form
                method="get"
                action=(endpoints::CHAT_START_VIEW)
                class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label for="user" class=(FORM_LABEL_STYLE) { "User ID" }

                    input
                        id="user"
                        type="text"
                        name="user"
                        placeholder="e.g. 3f2b8c1e-9d4a-4b7e-a1c2-5e6f7a8b9c0d"
                        required
                        autofocus
                        value=(user)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                @if let Some(error_message) = error_message {
                    p class="text-red-600 dark:text-red-400" { (error_message) }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Open chat" }
            }
        }
    };

    base("Open Chat", &content)
}

// Icons adapted from https://boxicons.com
fn back_icon() -> Markup {
    html! {
        svg class="w-7 h-7" viewBox="0 0 24 24" fill="currentColor" xmlns="http://www.w3.org/2000/svg"
        {
            path d="M13.293 6.293 7.586 12l5.707 5.707 1.414-1.414L10.414 12l4.293-4.293z" {}
        }
    }
}

fn microphone_icon() -> Markup {
    html! {
        svg class="w-7 h-7" viewBox="0 0 24 24" fill="currentColor" xmlns="http://www.w3.org/2000/svg"
        {
            path d="M12 16c2.206 0 4-1.794 4-4V6c0-2.217-1.785-4.021-3.979-4.021a.933.933 0 0 0-.209.025A4.006 4.006 0 0 0 8 6v6c0 2.206 1.794 4 4 4z" {}
            path d="M11 19.931V22h2v-2.069c3.939-.495 7-3.858 7-7.931h-2c0 3.309-2.691 6-6 6s-6-2.691-6-6H4c0 4.072 3.061 7.436 7 7.931z" {}
        }
    }
}

fn send_icon() -> Markup {
    html! {
        svg class="w-7 h-7" viewBox="0 0 24 24" fill="currentColor" xmlns="http://www.w3.org/2000/svg"
        {
            path d="m21.426 11.095-17-8A.999.999 0 0 0 3.03 4.242L4.969 12 3.03 19.758a.998.998 0 0 0 1.396 1.147l17-8a1 1 0 0 0 0-1.81zM5.481 18.197l.839-3.357L12 12 6.32 9.16l-.839-3.357L18.651 12l-13.17 6.197z" {}
        }
    }
}



#[cfg(test)]
mod message_form_tests {
    use scraper::Html;

    use crate::{
        UserUuid,
        test_utils::{assert_form_input, must_get_form, submit_button_is_disabled},
    };

    use super::message_form_view;

    fn render(input: &str, is_sending: bool, out_of_band: bool) -> Html {
        let user = UserUuid::new("abc").unwrap();
        Html::parse_fragment(&message_form_view(&user, input, is_sending, out_of_band).into_string())
    }

    #[test]
    fn blank_input_is_blocked_without_disabling_plain_form_posts() {
        let html = render("", false, false);
        let form = must_get_form(&html);

        assert!(
            !submit_button_is_disabled(&form),
            "want send button usable when JavaScript is disabled"
        );
        assert_form_input(&form, "message", "text");
        let script = form
            .select(&scraper::Selector::parse("script").unwrap())
            .next()
            .expect("No script to disable the send button found")
            .text()
            .collect::<String>();
        assert!(script.contains("submit-button"));
        assert!(script.contains("trim() === ''"));
    }

    #[test]
    fn submit_is_disabled_while_sending() {
        let html = render("coffee 50k", true, false);
        let form = must_get_form(&html);

        assert!(submit_button_is_disabled(&form));
        let input = form
            .select(&scraper::Selector::parse("#message").unwrap())
            .next()
            .expect("No message input found");
        assert!(input.value().attr("disabled").is_some());
    }

    #[test]
    fn no_script_while_sending() {
        let html = render("", true, false);

        assert!(
            html.select(&scraper::Selector::parse("script").unwrap())
                .next()
                .is_none()
        );
    }

    #[test]
    fn submit_is_enabled_for_text_while_idle() {
        let html = render("coffee 50k", false, false);

        assert!(!submit_button_is_disabled(&must_get_form(&html)));
    }

    #[test]
    fn out_of_band_form_is_marked_for_swap() {
        let html = render("", false, true);

        assert_eq!(must_get_form(&html).value().attr("hx-swap-oob"), Some("true"));
        assert_eq!(
            must_get_form(&render("", false, false))
                .value()
                .attr("hx-swap-oob"),
            None
        );
    }
}
