//! The timeline item type produced by [`JsonTimelineClient`].
//!
//! `Tweet` is a plain data record.  The adapter never looks inside it; the
//! poller only needs its id and timestamp (see [`TimelineItem`]), and the
//! ingest step reads the rest.
//!
//! [`JsonTimelineClient`]: super::JsonTimelineClient

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use super::TimelineItem;

/// A single post from a user's timeline.
///
/// ## Sorting
///
/// `Tweet` implements [`Ord`] for **reverse-chronological** ordering, the
/// order a timeline is served in: newer tweets sort first, and tweets posted
/// in the same second fall back to the higher id first.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Tweet {
    /// Numeric status id.  Ids grow monotonically over time.
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub truncated: bool,
    pub in_reply_to_status_id: Option<u64>,
    pub entities: Entities,
    /// Author of this status.  For a retweet this is the retweeting account.
    pub user: User,
    /// The original status when this one is a retweet.
    pub retweeted_status: Option<Box<Tweet>>,
}

impl Tweet {
    pub fn is_retweet(&self) -> bool {
        self.retweeted_status.is_some()
    }

    /// Public URL of this status.
    pub fn permalink(&self) -> String {
        format!(
            "https://twitter.com/{}/status/{}",
            self.user.screen_name, self.id
        )
    }
}

impl TimelineItem for Tweet {
    fn id(&self) -> u64 {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Entities {
    pub hashtags: Vec<Hashtag>,
    pub user_mentions: Vec<UserMention>,
    /// Expanded (not t.co) URLs.
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Hashtag {
    /// Tag text without the leading `#`.
    pub text: String,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UserMention {
    pub id: u64,
    pub screen_name: String,
    pub name: String,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub screen_name: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

// ---------------------------------------------------------------------------
// Ordering — reverse chronological (newest first)
// ---------------------------------------------------------------------------

impl Ord for Tweet {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .created_at
            .cmp(&self.created_at)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Tweet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
