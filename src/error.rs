//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, chat::MAX_MESSAGE_GRAPHEMES, error_pages::ErrorPage};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The classification service could not be reached, e.g., the connection
    /// was refused or the request timed out.
    #[error("could not connect to the classification service: {0}")]
    BackendUnreachable(String),

    /// The classification service responded with a non-success status code.
    #[error("the classification service responded with status {0}")]
    BackendStatus(u16),

    /// The classification service responded with a body that could not be
    /// decoded as the expected JSON.
    #[error("could not decode the classification service response: {0}")]
    InvalidBackendResponse(String),

    /// The configured base URL of the classification service is not a valid
    /// HTTP(S) URL.
    #[error("invalid classification service URL {0}")]
    InvalidBackendUrl(String),

    /// The HTTP client could not be built.
    #[error("could not create the HTTP client: {0}")]
    HttpClient(String),

    /// The user tried to send a message that is empty or only whitespace.
    #[error("message cannot be empty")]
    EmptyMessage,

    /// The user tried to send a message with more graphemes than allowed.
    #[error("message has {0} characters, which is more than allowed")]
    MessageTooLong(usize),

    /// The user tried to send a message while a previous message is still
    /// waiting for a reply.
    #[error("a message is already waiting for a reply")]
    SubmissionInFlight,

    /// A reply was requested but there is no message waiting for one.
    #[error("there is no message waiting for a reply")]
    NoPendingMessage,

    /// A reply was requested for a message that has already been sent to the
    /// classification service.
    #[error("the reply to this message has already been requested")]
    ReplyAlreadyRequested,

    /// A reply arrived for a message that is no longer waiting for one, e.g.
    /// because the chat page was reloaded in the meantime.
    #[error("the reply is for a message that is no longer waiting for one")]
    StaleReply,

    /// The user has no conversation, i.e. they have not opened the chat page.
    #[error("no conversation for user \"{0}\"")]
    ConversationNotFound(String),

    /// The user identifier is empty or contains characters other than ASCII
    /// letters, digits and hyphens.
    #[error("invalid user ID \"{0}\"")]
    InvalidUserUuid(String),

    /// Could not acquire the lock on the conversation store.
    #[error("could not acquire the conversation lock")]
    ConversationLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Error::BackendUnreachable(error.to_string())
        } else if let Some(status) = error.status() {
            Error::BackendStatus(status.as_u16())
        } else {
            Error::InvalidBackendResponse(error.to_string())
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::InvalidUserUuid(_) | Error::ConversationNotFound(_) => {
                ErrorPage::not_found().into_response()
            }
            Error::InvalidTimezoneError(timezone) => ErrorPage::internal(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            )
            .into_response(),
            Error::ConversationLockError => ErrorPage::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                ErrorPage::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = self.into_alert();

        (status_code, alert.into_html()).into_response()
    }

    /// The status code and alert to show the user for this error.
    pub(crate) fn into_alert(self) -> (StatusCode, Alert) {
        match self {
            Error::EmptyMessage => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Message cannot be empty".to_owned(),
                    details: "Describe an income or expense, e.g. \"Spent 50k on coffee\"."
                        .to_owned(),
                },
            ),
            Error::MessageTooLong(length) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Message is too long".to_owned(),
                    details: format!(
                        "Your message has {length} characters. \
                        Shorten it to at most {MAX_MESSAGE_GRAPHEMES} characters."
                    ),
                },
            ),
            Error::SubmissionInFlight => (
                StatusCode::CONFLICT,
                Alert::Warning {
                    message: "Please wait".to_owned(),
                    details: "Your previous message is still being processed.".to_owned(),
                },
            ),
            Error::NoPendingMessage => (
                StatusCode::CONFLICT,
                Alert::Warning {
                    message: "Nothing to reply to".to_owned(),
                    details: "There is no message waiting for a reply. \
                    Try refreshing the page."
                        .to_owned(),
                },
            ),
            Error::ReplyAlreadyRequested => (
                StatusCode::CONFLICT,
                Alert::Warning {
                    message: "Please wait".to_owned(),
                    details: "The reply to your message is on its way.".to_owned(),
                },
            ),
            Error::StaleReply => (
                StatusCode::CONFLICT,
                Alert::Warning {
                    message: "Reply discarded".to_owned(),
                    details: "The chat was reloaded before the reply arrived. \
                    Refresh the page to see your latest messages."
                        .to_owned(),
                },
            ),
            Error::ConversationNotFound(_) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Chat not open".to_owned(),
                    details: "Open the chat page again before sending a message.".to_owned(),
                },
            ),
            Error::InvalidUserUuid(user_uuid) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Unknown user".to_owned(),
                    details: format!("\"{user_uuid}\" is not a valid user ID."),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        }
    }
}
