//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    chat::{get_chat_page, get_chat_start_page, reply_endpoint, submit_message_endpoint},
    endpoints,
    error_pages::{get_404_not_found, get_internal_server_error_page},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::CHAT_START_VIEW, get(get_chat_start_page))
        .route(endpoints::CHAT_VIEW, get(get_chat_page))
        .route(endpoints::CHAT_MESSAGES_API, post(submit_message_endpoint))
        .route(endpoints::CHAT_REPLY_API, post(reply_endpoint))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the chat start page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::CHAT_START_VIEW)
}
