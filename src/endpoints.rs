//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/users/{user_uuid}/chat', use [format_endpoint].

/// The root route which redirects to the chat start page.
pub const ROOT: &str = "/";
/// The page that asks for the user ID before opening the chat.
pub const CHAT_START_VIEW: &str = "/chat";
/// The chat screen of a user.
pub const CHAT_VIEW: &str = "/users/{user_uuid}/chat";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for sending a chat message.
pub const CHAT_MESSAGES_API: &str = "/api/users/{user_uuid}/chat/messages";
/// The route for getting the bot's reply to the message that was just sent.
pub const CHAT_REPLY_API: &str = "/api/users/{user_uuid}/chat/reply";

/// Replace the parameter in `endpoint_path` with `value`.
///
/// A parameter is a string that starts with a left brace and ends with a right
/// brace. For example, in the endpoint path '/users/{user_uuid}', '{user_uuid}'
/// is the parameter.
///
/// This function assumes that an endpoint path contains a single parameter and
/// that `value` is safe to use as a path segment.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, value: &str) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        value,
        &endpoint_path[param_end..]
    )
}
