#![allow(missing_docs)]

pub(crate) mod chat;
pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use chat::{chat_items, spawn_fake_backend, test_app_state, unreachable_backend_url};
pub(crate) use form::{
    assert_form_error_message, assert_form_input, assert_form_submit_button, assert_hx_endpoint,
    must_get_form, submit_button_is_disabled,
};
pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment};
pub(crate) use http::{assert_content_type, get_header};
