//! The 404 page shown for unknown routes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

/// Route handler for unknown routes.
pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

/// Get a response containing the rendered 404 page.
pub fn get_404_not_found_response() -> Response {
    let page = error_view(
        "Page Not Found",
        "404",
        "Sorry, that page does not exist.",
        "Check the address for typos, or head back to the dashboard.",
    );

    (StatusCode::NOT_FOUND, page).into_response()
}

#[cfg(test)]
mod not_found_tests {
    use axum::http::StatusCode;

    use crate::test_utils::{assert_valid_html, parse_html_document};

    use super::get_404_not_found;

    #[tokio::test]
    async fn renders_not_found_page() {
        let response = get_404_not_found().await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);
    }
}
