//! The session token stored inside the private auth cookie.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::user::UserId;

/// Identifies a signed-in user and when their session lapses.
///
/// The token only ever travels inside an encrypted private cookie, so the
/// serialized form is not a wire contract. The expiry is serialized as a
/// unix timestamp to keep the cookie payload small.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    pub user_id: UserId,

    #[serde(with = "time::serde::timestamp")]
    pub expires_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use time::{OffsetDateTime, UtcOffset, macros::datetime};

    use crate::user::UserId;

    use super::Token;

    #[test]
    fn token_round_trips_through_json() {
        let token = Token {
            user_id: UserId::new(42),
            expires_at: datetime!(2025-12-21 03:54:00).assume_offset(UtcOffset::UTC),
        };

        let serialized = serde_json::to_string(&token).unwrap();
        let deserialized: Token = serde_json::from_str(&serialized).unwrap();

        assert_eq!(token, deserialized);
    }

    #[test]
    fn expiry_serializes_as_unix_timestamp() {
        let token = Token {
            user_id: UserId::new(1),
            expires_at: OffsetDateTime::UNIX_EPOCH,
        };

        let serialized = serde_json::to_string(&token).unwrap();

        assert_eq!(serialized, r#"{"user_id":1,"expires_at":0}"#);
    }
}
