//! The route-guard middleware.
//!
//! Anonymous requests to protected routes are sent to the log-in screen;
//! the log-in handlers do the reverse and send authenticated visitors to
//! the dashboard. Re-applying either rule once the client is on the target
//! route changes nothing, so redirect loops cannot form.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
    endpoints,
    timezone::get_local_offset,
};

/// The slice of [AppState] the guard needs.
#[derive(Clone)]
pub struct AuthState {
    /// Signs and encrypts the private cookie jar.
    pub cookie_key: Key,
    /// How long a session lives without activity.
    pub cookie_duration: Duration,
    /// Canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

// Lets `PrivateCookieJar` pull its key out of the guard state.
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Runs the request if the session cookie is valid, otherwise replies with
/// `reject`.
///
/// On the way in, the signed-in [crate::user::UserId] is inserted as a
/// request extension for handlers to extract. On the way out, the cookie
/// expiry is pushed forward so an active session stays alive.
#[inline]
async fn run_guarded(
    state: AuthState,
    request: Request,
    next: Next,
    reject: impl Fn() -> Response,
) -> Response {
    let local_offset = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => {
            tracing::error!(
                timezone = state.local_timezone,
                "could not resolve the local timezone, treating the request as anonymous"
            );
            return reject();
        }
    };

    let (mut parts, body) = request.into_parts();

    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("could not read the cookie jar: {error:?}");
            return reject();
        }
    };

    let user_id = match get_token_from_cookies(&jar) {
        Ok(token) => token.user_id,
        Err(_) => return reject(),
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    // Sliding expiry: re-issue the cookie with a later deadline. A failure
    // here must not break the response, so fall back to the original jar.
    let jar = extend_auth_cookie_duration_if_needed(jar.clone(), state.cookie_duration, local_offset)
        .unwrap_or_else(|error| {
            tracing::error!("could not extend the session cookie: {error:?}");
            jar
        });

    let (mut parts, body) = response.into_parts();
    for (name, value) in jar.into_response().headers() {
        if name == SET_COOKIE {
            parts.headers.append(name, value.to_owned());
        }
    }

    Response::from_parts(parts, body)
}

/// Route guard for full-page routes.
///
/// Requests without a valid session cookie get a 303 redirect to the
/// log-in screen. Handlers behind this guard receive the user via
/// `Extension(user_id): Extension<UserId>`.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    run_guarded(state, request, next, || {
        Redirect::to(endpoints::LOG_IN_VIEW).into_response()
    })
    .await
}

/// Route guard for htmx fragment routes.
///
/// A plain 303 would make htmx swap the log-in page into the target
/// element, so anonymous requests get an `HX-Redirect` header instead,
/// which navigates the whole window.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    run_guarded(state, request, next, || {
        (
            HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
            StatusCode::OK,
        )
            .into_response()
    })
    .await
}
