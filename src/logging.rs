//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The form fields whose values are not written to the logs.
const REDACTED_FORM_FIELDS: [&str; 1] = ["message"];

const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the request body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// Chat messages in form submissions are redacted. Response bodies are not
/// logged since the rendered chat contains the user's messages.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body_text) = match extract_header_and_body_text_from_request(request).await {
        Ok(parts_and_body) => parts_and_body,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let is_form = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|content_type| content_type.to_str().ok())
        .is_some_and(|content_type| {
            content_type.starts_with("application/x-www-form-urlencoded")
        });

    if is_form {
        log_request(&parts, &redact_form_fields(&body_text));
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    tracing::info!("Sending response: {parts:#?}");

    Response::from_parts(parts, body)
}

/// Replace the values of [REDACTED_FORM_FIELDS] in URL encoded `form_text`.
///
/// Text that cannot be decoded as a form is redacted entirely.
fn redact_form_fields(form_text: &str) -> String {
    let Ok(fields) = serde_urlencoded::from_str::<Vec<(String, String)>>(form_text) else {
        return "<unreadable form>".to_owned();
    };

    let fields: Vec<(String, String)> = fields
        .into_iter()
        .map(|(name, value)| {
            if REDACTED_FORM_FIELDS.contains(&name.as_str()) {
                (name, "********".to_owned())
            } else {
                (name, value)
            }
        })
        .collect();

    serde_urlencoded::to_string(&fields).unwrap_or_else(|_| "<unreadable form>".to_owned())
}

async fn extract_header_and_body_text_from_request(
    request: Request,
) -> Result<(axum::http::request::Parts, String), axum::Error> {
    let (parts, body) = request.into_parts();
    let body_text = body_to_text(body).await?;

    Ok((parts, body_text))
}

async fn body_to_text(body: Body) -> Result<String, axum::Error> {
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await?;

    Ok(String::from_utf8_lossy(&body_bytes).to_string())
}

/// The longest prefix of `text` that is at most [LOG_BODY_LENGTH_LIMIT]
/// bytes and ends on a character boundary.
fn truncate_body(text: &str) -> &str {
    let mut end = LOG_BODY_LENGTH_LIMIT.min(text.len());

    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {parts:#?}\nbody: {:}...",
            truncate_body(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {parts:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod redact_form_fields_tests {
    use super::redact_form_fields;

    #[test]
    fn redacts_message() {
        assert_eq!(
            redact_form_fields("message=Spent+50k+on+coffee"),
            "message=********"
        );
    }

    #[test]
    fn keeps_other_fields() {
        assert_eq!(
            redact_form_fields("user=abc-123&message=Got+paid+10m"),
            "user=abc-123&message=********"
        );
    }

    #[test]
    fn form_without_message_is_unchanged() {
        assert_eq!(redact_form_fields("user=abc-123"), "user=abc-123");
    }
}
