//! Timeline client that decodes `user_timeline` JSON.
//!
//! [`JsonTimelineClient`] implements [`TimelineClient`] on top of a
//! [`TimelineProducer`]: anything that can hand back the raw JSON for a
//! [`TimelineRequest`].  The producer does the I/O; this module only decodes.
//! [`FileProducer`] replays a saved response from disk, and any closure
//! `Fn(&TimelineRequest) -> Result<String, ClientError>` works too.
//!
//! Decoding is a pure function, [`parse_timeline`], so tests can exercise it
//! without a producer at all.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{Entities, Hashtag, TimelineClient, Tweet, User, UserMention};
use crate::error::ClientError;

/// Timestamp format of `created_at`, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// One timeline read, as handed to a producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineRequest {
    pub screen_name: String,
    pub count: usize,
    pub since_id: u64,
    pub max_id: u64,
}

impl TimelineRequest {
    /// Render the request as the HTTP API's query string.
    ///
    /// `since_id` and `max_id` are omitted when zero.  The screen name is
    /// percent-encoded.
    pub fn query_string(&self) -> String {
        let mut q = format!(
            "screen_name={}&count={}&include_rts=1",
            urlencoding::encode(&self.screen_name),
            self.count
        );
        if self.since_id > 0 {
            q.push_str(&format!("&since_id={}", self.since_id));
        }
        if self.max_id > 0 {
            q.push_str(&format!("&max_id={}", self.max_id));
        }
        q
    }
}

/// Produces the raw JSON body for a timeline request.
pub trait TimelineProducer {
    fn produce(&self, request: &TimelineRequest) -> Result<String, ClientError>;
}

impl<F> TimelineProducer for F
where
    F: Fn(&TimelineRequest) -> Result<String, ClientError>,
{
    fn produce(&self, request: &TimelineRequest) -> Result<String, ClientError> {
        self(request)
    }
}

/// Replays a saved timeline response from a file, whatever the request.
#[derive(Debug, Clone)]
pub struct FileProducer {
    path: PathBuf,
}

impl FileProducer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TimelineProducer for FileProducer {
    fn produce(&self, request: &TimelineRequest) -> Result<String, ClientError> {
        tracing::trace!(path = %self.path.display(), query = %request.query_string(), "reading saved timeline");
        Ok(fs::read_to_string(&self.path)?)
    }
}

/// A [`TimelineClient`] that decodes JSON from a [`TimelineProducer`].
pub struct JsonTimelineClient<P> {
    producer: P,
}

impl<P: TimelineProducer> JsonTimelineClient<P> {
    pub fn new(producer: P) -> Self {
        Self { producer }
    }
}

impl<P: TimelineProducer> TimelineClient for JsonTimelineClient<P> {
    type Item = Tweet;
    type Error = ClientError;

    fn user_timeline(
        &self,
        profile_id: &str,
        page_size: usize,
        since_id: u64,
        max_id: u64,
    ) -> Result<Vec<Tweet>, ClientError> {
        let request = TimelineRequest {
            screen_name: profile_id.to_string(),
            count: page_size,
            since_id,
            max_id,
        };
        let body = self.producer.produce(&request)?;
        let decoded = parse_timeline(&body)?;
        let total = decoded.len();
        let tweets = request.select(decoded);
        tracing::debug!(total, count = tweets.len(), "decoded timeline");
        Ok(tweets)
    }
}

impl TimelineRequest {
    /// Apply the request's bounds to a decoded response the way the remote
    /// API does: ids above `since_id`, at or below `max_id` when it is set,
    /// at most `count` of them, in document order.
    fn select(&self, tweets: Vec<Tweet>) -> Vec<Tweet> {
        tweets
            .into_iter()
            .filter(|t| t.id > self.since_id)
            .filter(|t| self.max_id == 0 || t.id <= self.max_id)
            .take(self.count)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawTweet {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    id_str: Option<String>,
    created_at: String,
    #[serde(default, alias = "full_text")]
    text: String,
    #[serde(default)]
    truncated: bool,
    #[serde(default)]
    in_reply_to_status_id_str: Option<String>,
    #[serde(default)]
    entities: RawEntities,
    user: RawUser,
    #[serde(default)]
    retweeted_status: Option<Box<RawTweet>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEntities {
    #[serde(default)]
    hashtags: Vec<RawHashtag>,
    #[serde(default)]
    user_mentions: Vec<RawMention>,
    #[serde(default)]
    urls: Vec<RawUrl>,
}

#[derive(Debug, Deserialize)]
struct RawHashtag {
    text: String,
}

#[derive(Debug, Deserialize)]
struct RawMention {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    id_str: Option<String>,
    screen_name: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawUrl {
    #[serde(default)]
    expanded_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    id_str: Option<String>,
    #[serde(default)]
    name: String,
    screen_name: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Decode a `user_timeline` JSON array.
///
/// Items keep the order they appear in the document.
pub fn parse_timeline(json: &str) -> Result<Vec<Tweet>, ClientError> {
    let raw: Vec<RawTweet> = serde_json::from_str(json)?;
    raw.into_iter().map(convert_tweet).collect()
}

fn convert_tweet(raw: RawTweet) -> Result<Tweet, ClientError> {
    let id = resolve_id("status", raw.id_str.as_deref(), raw.id)?;
    let created_at = parse_created_at(&raw.created_at)?;
    let in_reply_to_status_id = raw
        .in_reply_to_status_id_str
        .as_deref()
        .map(|s| parse_id("in_reply_to_status_id_str", s))
        .transpose()?;
    let retweeted_status = raw
        .retweeted_status
        .map(|rt| convert_tweet(*rt).map(Box::new))
        .transpose()?;

    Ok(Tweet {
        id,
        created_at,
        text: raw.text,
        truncated: raw.truncated,
        in_reply_to_status_id,
        entities: convert_entities(raw.entities)?,
        user: convert_user(raw.user)?,
        retweeted_status,
    })
}

fn convert_entities(raw: RawEntities) -> Result<Entities, ClientError> {
    let user_mentions = raw
        .user_mentions
        .into_iter()
        .map(|m| -> Result<UserMention, ClientError> {
            Ok(UserMention {
                id: resolve_id("user_mention", m.id_str.as_deref(), m.id)?,
                screen_name: m.screen_name,
                name: m.name,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Entities {
        hashtags: raw
            .hashtags
            .into_iter()
            .map(|h| Hashtag { text: h.text })
            .collect(),
        user_mentions,
        urls: raw
            .urls
            .into_iter()
            .filter_map(|u| u.expanded_url.or(u.url))
            .collect(),
    })
}

fn convert_user(raw: RawUser) -> Result<User, ClientError> {
    Ok(User {
        id: resolve_id("user", raw.id_str.as_deref(), raw.id)?,
        name: raw.name,
        screen_name: raw.screen_name,
        location: raw.location.filter(|s| !s.is_empty()),
        description: raw.description.filter(|s| !s.is_empty()),
        url: raw.url.filter(|s| !s.is_empty()),
    })
}

/// Prefer the string id (the numeric one loses precision in some decoders).
fn resolve_id(what: &str, id_str: Option<&str>, id: Option<u64>) -> Result<u64, ClientError> {
    match (id_str, id) {
        (Some(s), _) => parse_id(what, s),
        (None, Some(id)) => Ok(id),
        (None, None) => Err(ClientError::Decode(format!("{what} has no id"))),
    }
}

fn parse_id(what: &str, s: &str) -> Result<u64, ClientError> {
    s.parse()
        .map_err(|_| ClientError::Decode(format!("{what} id `{s}` is not a number")))
}

fn parse_created_at(s: &str) -> Result<DateTime<Utc>, ClientError> {
    DateTime::parse_from_str(s, CREATED_AT_FORMAT)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ClientError::Decode(format!("bad created_at `{s}`: {e}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
