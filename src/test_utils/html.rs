use axum::{body::Body, response::Response};
use scraper::Html;

/// Reads the whole body of a handler's response as text.
pub(crate) async fn response_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    String::from_utf8(bytes.to_vec()).expect("Response body is not valid UTF-8")
}

/// Parses a full page such as the chat page or an error page.
pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    Html::parse_document(&response_text(response).await)
}

/// Parses an htmx fragment such as a chat item or an alert.
pub(crate) async fn parse_html_fragment(response: Response<Body>) -> Html {
    Html::parse_fragment(&response_text(response).await)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors {:?} in:\n{}",
        html.errors,
        html.html()
    );
}
