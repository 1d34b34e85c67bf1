//! Polls a single profile's timeline.
//!
//! [`UserTimelineSource`] binds a [`TimelineClient`] to one profile and a
//! metadata key, and implements [`TimelineSource`] by issuing exactly one
//! client read per call.  It keeps no mutable state: cursoring, ordering and
//! de-duplication are the poller's job.

use tracing::Span;

use super::{TimelineClient, TimelineSource};
use crate::error::InvalidArgument;

/// Reads the timeline of one fixed profile.
pub struct UserTimelineSource<C> {
    profile_id: String,
    client: C,
    metadata_key: String,
    span: Span,
}

impl<C: TimelineClient> UserTimelineSource<C> {
    /// Bind `client` to `profile_id`.
    ///
    /// Fails with [`InvalidArgument`] when the profile id is empty or only
    /// whitespace.  No client call is made here.
    pub fn new(
        profile_id: impl Into<String>,
        client: C,
        metadata_key: impl Into<String>,
    ) -> Result<Self, InvalidArgument> {
        let profile_id = profile_id.into();
        if profile_id.trim().is_empty() {
            return Err(InvalidArgument::new("profile_id", "the profile id must not be empty"));
        }
        let metadata_key = metadata_key.into();
        let span = tracing::debug_span!("user_timeline", profile = %profile_id, key = %metadata_key);

        Ok(Self {
            profile_id,
            client,
            metadata_key,
            span,
        })
    }

    /// Replace the instance span that poll events are recorded in.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn profile_id(&self) -> &str {
        &self.profile_id
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C> TimelineSource for UserTimelineSource<C>
where
    C: TimelineClient,
    C::Item: super::TimelineItem,
{
    type Item = C::Item;
    type Error = C::Error;

    fn name(&self) -> &str {
        &self.profile_id
    }

    fn metadata_key(&self) -> &str {
        &self.metadata_key
    }

    fn fetch_since(&self, since_id: u64, page_size: usize) -> Result<Vec<C::Item>, C::Error> {
        let _entered = self.span.enter();
        tracing::debug!(since_id, page_size, "polling for tweets for @{}", self.profile_id);
        self.client.user_timeline(&self.profile_id, page_size, since_id, 0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
