//! The log-in screen and its submit handler. The auth module owns the
//! cookie and token machinery this builds on.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    app_state::create_cookie_key,
    auth::{DEFAULT_COOKIE_DURATION, get_token_from_cookies, invalidate_auth_cookie, set_auth_cookie},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, base, email_input, link, loading_spinner, log_in_register,
        password_input,
    },
    timezone::get_local_offset,
    user::get_user_by_email,
};

fn log_in_form(email: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (email_input(email, None))
            (password_input("", 0, error_message))

            label
                for="remember_me"
                class="flex items-center gap-x-3 text-sm font-medium text-slate-900 dark:text-white"
            {
                input type="checkbox" name="remember_me" id="remember_me" tabindex="0" class="rounded-xs";
                "Remember me for a week"
            }

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Sign In"
            }

            p class="text-sm font-light text-slate-500 dark:text-slate-400" {
                "Don't have an account? "
                (link(endpoints::REGISTER_VIEW, "Sign up here"))
            }
        }
    }
}

/// Display the log-in page.
///
/// An already authenticated client is sent straight to the dashboard: the
/// log-in screen is the only route that redirects away from itself.
pub async fn get_log_in_page(jar: PrivateCookieJar) -> Response {
    if get_token_from_cookies(&jar).is_ok() {
        return Redirect::to(endpoints::DASHBOARD_VIEW).into_response();
    }

    let log_in_form = log_in_form("", None);
    let content = log_in_register("Sign in to your account", &log_in_form);
    base("Sign In", &[], &content).into_response()
}

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The slice of [AppState] a log-in needs.
#[derive(Clone)]
pub struct LoginState {
    /// Signs and encrypts the private cookie jar.
    pub cookie_key: Key,
    /// How long a session lives without "remember me".
    pub cookie_duration: Duration,
    /// Canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// Used to look up the user by email.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl LoginState {
    /// Derive the cookie key from `cookie_secret` and use the default
    /// session duration.
    pub fn new(
        cookie_secret: &str,
        local_timezone: &str,
        db_connection: Arc<Mutex<Connection>>,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection,
        }
    }
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// Lets `PrivateCookieJar` pull its key out of the log-in state.
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

pub(crate) const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie is set and the client is redirected to the
/// dashboard page. Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let email = match EmailAddress::from_str(&user_data.email) {
        Ok(email) => email,
        Err(_) => {
            return log_in_form(&user_data.email, Some(INVALID_CREDENTIALS_ERROR_MSG))
                .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return log_in_form(
                &user_data.email,
                Some("An internal error occurred. Please try again later."),
            )
            .into_response();
        }
    };

    let user = match get_user_by_email(&email, &connection) {
        Ok(user) => user,
        Err(Error::NotFound) => {
            return log_in_form(&user_data.email, Some(INVALID_CREDENTIALS_ERROR_MSG))
                .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_form(
                &user_data.email,
                Some("An internal error occurred. Please try again later."),
            )
            .into_response();
        }
    };
    drop(connection);

    let is_password_valid = match user.password_hash.verify(&user_data.password) {
        Ok(is_password_valid) => is_password_valid,
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_form(
                &user_data.email,
                Some("An internal error occurred. Please try again later."),
            )
            .into_response();
        }
    };

    if !is_password_valid {
        return log_in_form(&user_data.email, Some(INVALID_CREDENTIALS_ERROR_MSG)).into_response();
    }

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let local_timezone = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };

    match set_auth_cookie(jar.clone(), user.id, cookie_duration, local_timezone) {
        Ok(updated_jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            updated_jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not set the auth cookie: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}

/// What the log-in form submits.
///
/// The password stays a plain string here; it is only ever compared against
/// the stored hash.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    pub email: String,

    pub password: String,

    /// Checkbox inputs submit a string when ticked and nothing otherwise,
    /// so any `Some` means "remember me" regardless of the string value.
    pub remember_me: Option<String>,
}
