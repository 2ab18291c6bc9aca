#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;

pub(crate) use form::{assert_form_error_message, assert_form_input, must_get_form};
pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment};
