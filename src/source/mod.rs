//! Timeline source abstraction layer.
//!
//! Three narrow traits meet here:
//!
//! * [`TimelineClient`] — something that can read a profile's timeline
//!   (`profile, page_size, since_id, max_id`).  It owns transport and auth.
//! * [`TimelineSource`] — what the poller holds and calls once per empty
//!   queue: "give me what is newer than this id".  [`UserTimelineSource`] is
//!   the implementation that binds a client to one profile.
//! * [`TimelineItem`] — the two facts the poller needs from an item: its id
//!   and when it was posted.
//!
//! ## Adding a new client
//!
//! Implement [`TimelineClient`] for your type and hand it to
//! [`UserTimelineSource::new`].  The poller and ingest step don't change.

mod json_client;
mod tweet;
mod user_timeline;

pub use json_client::{parse_timeline, FileProducer, JsonTimelineClient, TimelineProducer, TimelineRequest};
pub use tweet::{Entities, Hashtag, Tweet, User, UserMention};
pub use user_timeline::UserTimelineSource;

#[cfg(test)]
pub(crate) use tweet::tests::make_tweet;

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// An item that can be cursored by id and ordered by post time.
pub trait TimelineItem {
    fn id(&self) -> u64;
    fn created_at(&self) -> DateTime<Utc>;
}

/// Capability that performs the actual timeline read.
///
/// `since_id` and `max_id` are exclusive/inclusive id bounds as the remote API
/// defines them; `0` means "unbounded" for both.  Implementations return items
/// in the order the remote API serves them (newest first).
pub trait TimelineClient {
    type Item;
    type Error: std::error::Error + 'static;

    fn user_timeline(
        &self,
        profile_id: &str,
        page_size: usize,
        since_id: u64,
        max_id: u64,
    ) -> Result<Vec<Self::Item>, Self::Error>;
}

impl<C: TimelineClient + ?Sized> TimelineClient for &C {
    type Item = C::Item;
    type Error = C::Error;

    fn user_timeline(
        &self,
        profile_id: &str,
        page_size: usize,
        since_id: u64,
        max_id: u64,
    ) -> Result<Vec<Self::Item>, Self::Error> {
        (**self).user_timeline(profile_id, page_size, since_id, max_id)
    }
}

impl<C: TimelineClient + ?Sized> TimelineClient for Box<C> {
    type Item = C::Item;
    type Error = C::Error;

    fn user_timeline(
        &self,
        profile_id: &str,
        page_size: usize,
        since_id: u64,
        max_id: u64,
    ) -> Result<Vec<Self::Item>, Self::Error> {
        (**self).user_timeline(profile_id, page_size, since_id, max_id)
    }
}

impl<C: TimelineClient + ?Sized> TimelineClient for Arc<C> {
    type Item = C::Item;
    type Error = C::Error;

    fn user_timeline(
        &self,
        profile_id: &str,
        page_size: usize,
        since_id: u64,
        max_id: u64,
    ) -> Result<Vec<Self::Item>, Self::Error> {
        (**self).user_timeline(profile_id, page_size, since_id, max_id)
    }
}

/// The hook a poller invokes on each poll.
///
/// The poller owns scheduling, the cursor and page size; a source only turns
/// `(since_id, page_size)` into a batch of items.
pub trait TimelineSource {
    type Item: TimelineItem;
    type Error: std::error::Error + 'static;

    /// Human-readable label used in logs.
    fn name(&self) -> &str;

    /// Key under which a host persists this source's cursor.
    fn metadata_key(&self) -> &str;

    /// Fetch items with an id strictly greater than `since_id`.
    fn fetch_since(&self, since_id: u64, page_size: usize) -> Result<Vec<Self::Item>, Self::Error>;
}
