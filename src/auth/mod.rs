//! Cookie-based session authentication.
//!
//! The log-in endpoint issues a private cookie containing a signed session
//! token. The auth middleware validates the token on every protected
//! request, makes the current user's ID available to handlers, and extends
//! the session while it is in use.

mod cookie;
mod middleware;
mod token;

pub(crate) use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use middleware::{auth_guard, auth_guard_hx};

pub(crate) use cookie::get_token_from_cookies;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;

#[cfg(test)]
pub use middleware::AuthState;
