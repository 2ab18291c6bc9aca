//! The registration page for creating a new user account.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    app_state::create_cookie_key,
    auth::{DEFAULT_COOKIE_DURATION, set_auth_cookie},
    endpoints,
    internal_server_error::get_internal_server_error_redirect,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, email_input, link,
        loading_spinner, log_in_register, password_input,
    },
    timezone::get_local_offset,
    user::create_user,
};

/// The minimum number of characters the password should have to be considered valid on the client
/// side (server-side validation is done on top of this validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()]
            ;

            @if let Some(error_message) = error_message
            {
                p class="text-rose-500 text-base" { (error_message) }
            }
        }
    }
}

fn registration_form(
    email: &str,
    email_error_message: Option<&str>,
    password_error_message: Option<&str>,
    confirm_password_error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #confirm-password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (email_input(email, email_error_message))
            (password_input("", PASSWORD_INPUT_MIN_LENGTH, password_error_message))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, confirm_password_error_message))

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Sign Up"
            }

            p class="text-sm font-light text-slate-500 dark:text-slate-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN_VIEW, "Sign in here"))
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form("", None, None, None);
    let content = log_in_register("Create an account", &registration_form);
    base("Sign Up", &[], &content).into_response()
}

/// The slice of [AppState] registration needs.
#[derive(Clone)]
pub struct RegistrationState {
    /// Signs and encrypts the private cookie jar.
    pub cookie_key: Key,
    /// How long the session issued on sign-up lives.
    pub cookie_duration: Duration,
    /// Canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// Used to insert the new user row.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl RegistrationState {
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

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// Lets `PrivateCookieJar` pull its key out of the registration state.
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the registration form.
#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    /// The email address to register with.
    pub email: String,
    /// The chosen password.
    pub password: String,
    /// The chosen password, repeated.
    pub confirm_password: String,
}

/// Handler for registration requests via the POST method.
///
/// On success a new user is created, an auth cookie is set, and the client is
/// redirected to the dashboard. Otherwise the form is returned with an error
/// message next to the offending field.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let email = match EmailAddress::from_str(user_data.email.trim()) {
        Ok(email) => email,
        Err(_) => {
            return registration_form(
                &user_data.email,
                Some("Enter a valid email address."),
                None,
                None,
            )
            .into_response();
        }
    };

    let validated_password = match ValidatedPassword::new(&user_data.password) {
        Ok(password) => password,
        Err(error) => {
            return registration_form(
                &user_data.email,
                None,
                Some(error.to_string().as_ref()),
                None,
            )
            .into_response();
        }
    };

    if user_data.password != user_data.confirm_password {
        return registration_form(&user_data.email, None, None, Some("Passwords do not match"))
            .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let local_timezone = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return get_internal_server_error_redirect();
        }
    };

    match create_user(email, password_hash, &connection) {
        Ok(user) => {
            drop(connection);

            match set_auth_cookie(jar, user.id, state.cookie_duration, local_timezone) {
                Ok(jar) => (
                    StatusCode::SEE_OTHER,
                    HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                    jar,
                )
                    .into_response(),
                Err(error) => {
                    tracing::error!("An error occurred while setting the auth cookie: {error}");
                    (
                        HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
                        StatusCode::SEE_OTHER,
                    )
                        .into_response()
                }
            }
        }
        Err(Error::DuplicateEmail) => registration_form(
            &user_data.email,
            Some("That email address is already in use."),
            None,
            None,
        )
        .into_response(),
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");
            get_internal_server_error_redirect()
        }
    }
}

#[cfg(test)]
mod register_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::{Form, PrivateCookieJar};
    use rusqlite::Connection;

    use crate::{
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_input, assert_valid_html, must_get_form, parse_html_document,
            parse_html_fragment,
        },
        user::get_user_by_email,
    };

    use super::{RegisterForm, RegistrationState, get_register_page, register_user};

    const STRONG_PASSWORD: &str = "correcthorsebatterystaple";

    fn get_test_state() -> RegistrationState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        RegistrationState::new("nafstenoas", "Etc/UTC", Arc::new(Mutex::new(conn)))
    }

    fn get_jar(state: &RegistrationState) -> PrivateCookieJar {
        PrivateCookieJar::new(state.cookie_key.clone())
    }

    fn register_form(email: &str, password: &str, confirm_password: &str) -> RegisterForm {
        RegisterForm {
            email: email.to_owned(),
            password: password.to_owned(),
            confirm_password: confirm_password.to_owned(),
        }
    }

    #[tokio::test]
    async fn render_register_page() {
        let response = get_register_page().await;
        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form = must_get_form(&document);
        assert_eq!(form.value().attr("hx-post"), Some(endpoints::USERS));
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "password", "password");
        assert_form_input(&form, "confirm_password", "password");
    }

    #[tokio::test]
    async fn registering_creates_user_and_redirects() {
        let state = get_test_state();
        let jar = get_jar(&state);

        let response = register_user(
            State(state.clone()),
            jar,
            Form(register_form(
                "ada@example.com",
                STRONG_PASSWORD,
                STRONG_PASSWORD,
            )),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("hx-redirect").unwrap(),
            endpoints::DASHBOARD_VIEW
        );

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_email(&"ada@example.com".parse().unwrap(), &connection)
            .expect("user should have been created");
        assert!(user.password_hash.verify(STRONG_PASSWORD).unwrap());
    }

    #[tokio::test]
    async fn rejects_weak_password() {
        let state = get_test_state();
        let jar = get_jar(&state);

        let response = register_user(
            State(state.clone()),
            jar,
            Form(register_form("ada@example.com", "hunter2", "hunter2")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_fragment(response).await;
        assert!(must_get_form(&document).html().contains("text-rose-500"));

        let connection = state.db_connection.lock().unwrap();
        assert!(get_user_by_email(&"ada@example.com".parse().unwrap(), &connection).is_err());
    }

    #[tokio::test]
    async fn rejects_mismatched_passwords() {
        let state = get_test_state();
        let jar = get_jar(&state);

        let response = register_user(
            State(state.clone()),
            jar,
            Form(register_form(
                "ada@example.com",
                STRONG_PASSWORD,
                "somethingelseentirely",
            )),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_fragment(response).await;
        assert!(
            must_get_form(&document)
                .html()
                .contains("Passwords do not match")
        );
    }

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let state = get_test_state();

        register_user(
            State(state.clone()),
            get_jar(&state),
            Form(register_form(
                "ada@example.com",
                STRONG_PASSWORD,
                STRONG_PASSWORD,
            )),
        )
        .await;

        let response = register_user(
            State(state.clone()),
            get_jar(&state),
            Form(register_form(
                "ada@example.com",
                STRONG_PASSWORD,
                STRONG_PASSWORD,
            )),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_fragment(response).await;
        assert!(
            must_get_form(&document)
                .html()
                .contains("already in use")
        );
    }

    #[tokio::test]
    async fn rejects_invalid_email() {
        let state = get_test_state();

        let response = register_user(
            State(state),
            PrivateCookieJar::new(axum_extra::extract::cookie::Key::generate()),
            Form(register_form(
                "not-an-email",
                STRONG_PASSWORD,
                STRONG_PASSWORD,
            )),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_fragment(response).await;
        assert!(
            must_get_form(&document)
                .html()
                .contains("valid email address")
        );
    }
}
