//! The 500 page shown when something genuinely unexpected goes wrong.
//!
//! Ordinary store failures never reach this page: handlers log them and
//! render with whatever data they have.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{endpoints, html::error_view};

/// Route handler for the internal server error page.
pub async fn get_internal_server_error_page() -> Response {
    render_internal_server_error()
}

/// Get a response containing the rendered 500 page.
pub fn render_internal_server_error() -> Response {
    let page = error_view(
        "Something Went Wrong",
        "500",
        "Sorry, something went wrong.",
        "Try again later or check the server logs.",
    );

    (StatusCode::INTERNAL_SERVER_ERROR, page).into_response()
}

/// Get a response that will redirect the client to the internal server error 500 page.
///
/// **Note**: This redirect is intended to be served as a response to a POST request initiated by
/// HTMX. Route handlers using GET should use `axum::response::Redirect` to redirect via a response.
pub fn get_internal_server_error_redirect() -> Response {
    (
        HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
        .into_response()
}

#[cfg(test)]
mod internal_server_error_tests {
    use axum::http::StatusCode;

    use crate::test_utils::{assert_valid_html, parse_html_document};

    use super::get_internal_server_error_page;

    #[tokio::test]
    async fn renders_error_page() {
        let response = get_internal_server_error_page().await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);
    }
}
