//! Middleware for logging requests and responses.

use axum::{extract::Request, http::header::CONTENT_TYPE, middleware::Next, response::Response};

/// The maximum number of body bytes logged at the `info` level. Longer
/// bodies are truncated and logged in full at the `debug` level.
const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level. Password
/// fields in form submissions are redacted before logging.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (headers, body_text) = extract_header_and_body_text_from_request(request).await;

    if headers.method.eq(&axum::http::Method::POST)
        && headers.headers.get(CONTENT_TYPE)
            == Some(&"application/x-www-form-urlencoded".parse().unwrap())
    {
        let display_text = redact_field(&body_text, "password");
        let display_text = redact_field(&display_text, "confirm_password");
        log_request(&headers, &display_text);
    } else {
        log_request(&headers, &body_text);
    }

    let request = Request::from_parts(headers, body_text.into());
    let response = next.run(request).await;

    let (headers, body) = response.into_parts();
    log_response(&headers);

    Response::from_parts(headers, body)
}

fn redact_field(form_text: &str, field_name: &str) -> String {
    let field_start = form_text.find(&format!("{field_name}="));

    let start = match field_start {
        Some(field_pos) => field_pos,
        None => return form_text.to_string(),
    };

    let field_end = form_text[start..].find('&');
    let end = match field_end {
        Some(end) => start + end,
        None => form_text.len(),
    };
    let field = &form_text[start..end];

    form_text.replace(field, &format!("{field_name}=********"))
}

async fn extract_header_and_body_text_from_request(
    request: Request,
) -> (axum::http::request::Parts, String) {
    let (headers, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    (headers, String::from_utf8_lossy(&body_bytes).to_string())
}

fn log_request(headers: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {} {}\nbody: {:}...",
            headers.method,
            headers.uri,
            &body[..LOG_BODY_LENGTH_LIMIT]
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!(
            "Received request: {} {}\nbody: {body:?}",
            headers.method,
            headers.uri
        );
    }
}

fn log_response(headers: &axum::http::response::Parts) {
    tracing::info!("Sending response: {}", headers.status);
}

#[cfg(test)]
mod redact_field_tests {
    use super::redact_field;

    #[test]
    fn redacts_password_field() {
        let form_text = "email=ada%40example.com&password=hunter2&remember_me=on";

        let redacted = redact_field(form_text, "password");

        assert_eq!(
            redacted,
            "email=ada%40example.com&password=********&remember_me=on"
        );
    }

    #[test]
    fn redacts_trailing_field() {
        let form_text = "email=ada%40example.com&password=hunter2";

        let redacted = redact_field(form_text, "password");

        assert_eq!(redacted, "email=ada%40example.com&password=********");
    }

    #[test]
    fn leaves_other_fields_untouched() {
        let form_text = "amount=12.30&category=Food";

        let redacted = redact_field(form_text, "password");

        assert_eq!(redacted, form_text);
    }
}
