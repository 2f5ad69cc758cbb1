//! Full HTML pages for requests that cannot be served, i.e. 404 and 500 pages.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// An error page with a short description of what went wrong and a hint on how to fix it.
pub struct ErrorPage<'a> {
    pub status_code: StatusCode,
    pub description: &'a str,
    pub fix: &'a str,
}

impl<'a> ErrorPage<'a> {
    pub fn not_found() -> Self {
        Self {
            status_code: StatusCode::NOT_FOUND,
            description: "Something's missing.",
            fix: "Sorry, we can't find that page. Check the link or start a new chat.",
        }
    }

    pub fn internal(description: &'a str, fix: &'a str) -> Self {
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            description,
            fix,
        }
    }
}

impl Default for ErrorPage<'_> {
    fn default() -> Self {
        Self::internal(
            "Sorry, something went wrong.",
            "Try again later or check the server logs",
        )
    }
}

impl IntoResponse for ErrorPage<'_> {
    fn into_response(self) -> Response {
        let title = match self.status_code {
            StatusCode::NOT_FOUND => "Not Found",
            _ => "Internal Server Error",
        };
        let page = error_view(
            title,
            self.status_code.as_str(),
            self.description,
            self.fix,
        );

        (self.status_code, Html(page.into_string())).into_response()
    }
}

pub async fn get_404_not_found() -> Response {
    ErrorPage::not_found().into_response()
}

pub async fn get_internal_server_error_page() -> Response {
    ErrorPage::default().into_response()
}
