//! Ledger Chat is a web app for recording income and expenses by chatting.
//!
//! The user types a free-form description of a transaction, e.g. "Spent 50k on
//! coffee", and a remote classification service turns it into a structured
//! transaction. This library provides a server that directly serves the chat
//! screen as HTML and relays messages to the classification service.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod backend;
mod chat;
mod endpoints;
mod error;
mod error_pages;
mod html;
mod logging;
mod routing;
mod timezone;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use backend::{BackendClient, DEFAULT_REQUEST_TIMEOUT};
pub use error::Error;
pub use logging::logging_middleware;
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use user::UserUuid;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
