//! Signing out: drop the session cookie and send the client back to log in.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::invalidate_auth_cookie, endpoints};

/// Invalidate the auth cookie and redirect the client to the log-in page.
///
/// Signing out is fire-and-forget from the client's perspective: the redirect
/// happens whether or not there was a session to invalidate.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::{
        body::Body,
        http::{Response, StatusCode, header::SET_COOKIE},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime, UtcOffset};

    use crate::{
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, set_auth_cookie},
        endpoints,
        user::UserId,
    };

    use super::get_log_out;

    fn signed_in_jar() -> PrivateCookieJar {
        let jar = PrivateCookieJar::new(Key::from(&Sha512::digest("42")));

        set_auth_cookie(jar, UserId::new(123), DEFAULT_COOKIE_DURATION, UtcOffset::UTC).unwrap()
    }

    fn token_cookie(response: &Response<Body>) -> Option<Cookie<'static>> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|header| Cookie::parse(header.to_str().ok()?.to_owned()).ok())
            .find(|cookie| cookie.name() == COOKIE_TOKEN)
    }

    #[tokio::test]
    async fn log_out_invalidates_auth_cookie_and_redirects() {
        let response = get_log_out(signed_in_jar()).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::LOG_IN_VIEW
        );

        let cookie = token_cookie(&response).expect("expected the token cookie to be re-set");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }

    #[tokio::test]
    async fn log_out_without_session_still_redirects() {
        let jar = PrivateCookieJar::new(Key::from(&Sha512::digest("42")));

        let response = get_log_out(jar).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::LOG_IN_VIEW
        );
    }
}
