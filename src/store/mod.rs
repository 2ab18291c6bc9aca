//! The record store gateway.
//!
//! Per-collection models and queries live with their features
//! ([crate::transaction], [crate::budget], [crate::user]). This module holds
//! the cross-cutting pieces of the gateway:
//!
//! - [cursor::PageCursor]: the opaque continuation token for one-shot paged
//!   queries.
//! - [watch::ChangeRouter] and [watch::LiveQuery]: change notification and
//!   full-snapshot requery, the push half of the store. Live queries are
//!   released when their handle is dropped, so a subscription can never
//!   outlive the screen that opened it.

pub mod cursor;
pub mod watch;
