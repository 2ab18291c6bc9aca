//! Defines functions for handling user authentication with cookies.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::{Error, user::UserId};

use super::token::Token;

pub(crate) const COOKIE_TOKEN: &str = "token";

/// The default duration for which auth cookies are valid.
pub(crate) const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(30);

/// Add an auth cookie to the cookie jar, indicating that a user is logged in and authenticated.
///
/// Sets the initial expiry of the cookie to `duration` from the current time.
///
/// Returns the cookie jar with the cookie added.
///
/// # Errors
///
/// Returns an [Error::JsonSerializationError] if the token cannot be
/// serialized (this should not happen in practice).
pub(crate) fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserId,
    duration: Duration,
    local_offset: UtcOffset,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc().to_offset(local_offset) + duration;
    let token = Token {
        user_id,
        expires_at,
    };
    let token_string = serde_json::to_string(&token)
        .map_err(|error| Error::JsonSerializationError(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_TOKEN, token_string))
            .expires(expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Set the auth cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub(crate) fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Parse and validate the auth token from the cookies in `jar`.
///
/// # Errors
///
/// Returns a:
/// - [Error::CookieMissing] if there is no token cookie,
/// - [Error::InvalidSessionToken] if the token cannot be parsed or has expired.
pub(crate) fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;

    let token: Token = serde_json::from_str(cookie.value_trimmed())
        .map_err(|_| Error::InvalidSessionToken)?;

    if token.expires_at <= OffsetDateTime::now_utc() {
        return Err(Error::InvalidSessionToken);
    }

    Ok(token)
}

/// Set the expiry of the auth cookie in `jar` to the latest of now plus
/// `duration` and the cookie's current expiry.
///
/// This keeps an active session alive without ever shortening a longer
/// "remember me" expiry.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
///
/// Returns a:
/// - [Error::CookieMissing] if the token cookie is not in the cookie jar.
/// - [Error::InvalidSessionToken] if the token cannot be parsed or has expired.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
    local_offset: UtcOffset,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?;

    let new_expiry = OffsetDateTime::now_utc().to_offset(local_offset) + duration;
    let expires_at = max(token.expires_at, new_expiry);

    set_auth_cookie(
        jar,
        token.user_id,
        expires_at - OffsetDateTime::now_utc().to_offset(local_offset),
        local_offset,
    )
}
