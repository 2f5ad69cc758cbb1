use std::{net::TcpListener as StdTcpListener, time::Duration};

use axum::Router;
use scraper::{Html, Selector};
use tokio::net::TcpListener;

use crate::{AppState, BackendClient};

/// Serve `router` on a random local port and return its base URL.
pub(crate) async fn spawn_fake_backend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Could not bind fake backend");
    let address = listener
        .local_addr()
        .expect("Could not get fake backend address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Fake backend stopped unexpectedly");
    });

    format!("http://{address}")
}

/// A base URL with nothing listening on it.
pub(crate) fn unreachable_backend_url() -> String {
    let listener = StdTcpListener::bind("127.0.0.1:0").expect("Could not bind port");
    let address = listener.local_addr().expect("Could not get address");
    drop(listener);

    format!("http://{address}")
}

pub(crate) fn test_app_state(base_url: &str) -> AppState {
    let backend = BackendClient::new(base_url, Duration::from_secs(5))
        .expect("Could not create backend client");

    AppState::new(backend, "Etc/UTC").expect("Could not create app state")
}

/// The kind of each row in the chat box, in display order, along with the
/// sender for messages.
#[track_caller]
pub(crate) fn chat_items(html: &Html) -> Vec<(&'static str, Option<String>)> {
    html.select(&Selector::parse("[data-item]").unwrap())
        .map(|item| match item.value().attr("data-item") {
            Some("message") => (
                "message",
                item.value().attr("data-sender").map(str::to_owned),
            ),
            Some("transaction") => ("transaction", None),
            other => panic!("unexpected chat item kind {other:?}"),
        })
        .collect()
}
