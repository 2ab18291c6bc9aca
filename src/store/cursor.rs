//! The continuation cursor for one-shot paged queries.

use std::{fmt::Display, str::FromStr};

use time::OffsetDateTime;

use crate::{Error, database_id::DatabaseId};

/// A reference to the last record of a page, used to fetch the page after it.
///
/// Records are paged in descending `(created_at, id)` order, so the cursor
/// carries both: the ID breaks ties between records created in the same
/// nanosecond. The string form is opaque to clients and only ever round-trips
/// through query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    /// The creation timestamp of the last record, as unix nanoseconds.
    pub created_at_nanos: i64,
    /// The ID of the last record.
    pub id: DatabaseId,
}

impl PageCursor {
    /// Create a cursor referencing a record with the given creation timestamp
    /// and ID.
    pub fn new(created_at: OffsetDateTime, id: DatabaseId) -> Self {
        Self {
            created_at_nanos: created_at.unix_timestamp_nanos() as i64,
            id,
        }
    }
}

impl Display for PageCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.created_at_nanos, self.id)
    }
}

impl FromStr for PageCursor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (created_at_nanos, id) = s
            .split_once('.')
            .ok_or_else(|| Error::InvalidCursor(s.to_owned()))?;

        let created_at_nanos = created_at_nanos
            .parse()
            .map_err(|_| Error::InvalidCursor(s.to_owned()))?;
        let id = id.parse().map_err(|_| Error::InvalidCursor(s.to_owned()))?;

        Ok(Self {
            created_at_nanos,
            id,
        })
    }
}
