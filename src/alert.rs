//! Alert messages that are swapped into the page's alert container by HTMX.

use maud::{Markup, html};

/// An alert message with a short summary and a longer explanation.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// Something the user can fix by waiting or refreshing.
    Warning { message: String, details: String },
    /// The request failed.
    Error { message: String, details: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::Warning { message, details } => (
                "p-4 mb-4 text-sm text-yellow-800 rounded-lg bg-yellow-50 \
                dark:bg-gray-800 dark:text-yellow-300 border border-yellow-300",
                message,
                details,
            ),
            Alert::Error { message, details } => (
                "p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
                dark:bg-gray-800 dark:text-red-400 border border-red-300",
                message,
                details,
            ),
        };

        html! {
            div class=(container_style) role="alert"
            {
                div class="flex justify-between items-start gap-4"
                {
                    div
                    {
                        span class="font-semibold" { (message) }

                        @if !details.is_empty() {
                            p class="mt-1" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        class="font-bold"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "×"
                    }
                }
            }
        }
    }
}
