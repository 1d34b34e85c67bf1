//! Turning delivered tweets into bookmark drafts.
//!
//! [`Ingest`] is the handler at the end of the pipeline.  For each tweet it
//! builds a [`Bookmark`]: the tweet's permalink, a readable summary of the
//! post and a normalised tag set.  A permalink that was already processed is
//! skipped, so replaying overlapping timelines never yields duplicates.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::source::Tweet;

/// Tags every bookmark carries in addition to the profile name.
const BASE_TAGS: [&str; 2] = ["ingest", "twitter"];

/// A bookmark ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bookmark {
    pub url: String,
    pub description: String,
    pub extended: String,
    /// Sorted, lower-case, without leading `#`.
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Bookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<18} {}  [{}]",
            self.created_at.format("%Y-%m-%d %H:%M").to_string(),
            self.url,
            self.tags.join(" ")
        )?;
        for line in self.extended.lines() {
            writeln!(f, "    {line}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Ingest {
    /// Permalinks already turned into bookmarks.
    seen: HashSet<String>,
}

impl Ingest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct tweets processed so far.
    pub fn processed(&self) -> usize {
        self.seen.len()
    }

    /// Build the bookmark for `tweet`, or `None` if its link was seen before.
    pub fn process(&mut self, profile: &str, tweet: &Tweet, tags: &[String]) -> Option<Bookmark> {
        let link = tweet.permalink();
        if !self.seen.insert(link.clone()) {
            tracing::debug!(%link, "processed already");
            return None;
        }
        tracing::debug!(%link, user = %tweet.user.screen_name, "processing incoming tweet");

        Some(Bookmark {
            description: link.clone(),
            extended: summary(tweet, &link),
            tags: collect_tags(profile, tweet, tags),
            created_at: tweet.created_at,
            url: link,
        })
    }
}

fn summary(tweet: &Tweet, link: &str) -> String {
    let header = match &tweet.retweeted_status {
        Some(original) => format!(
            "@{} retweeted ({link}) @{}'s tweet:",
            tweet.user.screen_name, original.user.screen_name
        ),
        None => format!("@{} tweeted ({link}):", tweet.user.screen_name),
    };

    let hashtags = tweet
        .entities
        .hashtags
        .iter()
        .map(|h| format!("#{}", h.text.trim()))
        .collect::<Vec<_>>()
        .join(" ");
    let urls = tweet
        .entities
        .urls
        .iter()
        .map(|u| u.trim())
        .collect::<Vec<_>>()
        .join(" ");
    let mentions = tweet
        .entities
        .user_mentions
        .iter()
        .map(|m| format!("@{}", m.screen_name.trim()))
        .collect::<Vec<_>>()
        .join(" ");

    [header, tweet.text.trim().to_string(), hashtags, urls, mentions]
        .into_iter()
        .filter(|section| !section.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn collect_tags(profile: &str, tweet: &Tweet, extra: &[String]) -> Vec<String> {
    std::iter::once(profile)
        .chain(BASE_TAGS)
        .chain(extra.iter().map(String::as_str))
        .chain(tweet.entities.hashtags.iter().map(|h| h.text.as_str()))
        .map(|t| t.trim().trim_start_matches('#').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
