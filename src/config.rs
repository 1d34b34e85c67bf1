//! Command-line and environment configuration.
//!
//! Every option can also come from the environment, which is how the ingest
//! job is configured when it runs unattended.  The profile→tags mapping is a
//! base64-encoded JSON object (`{"acme": ["spring", "java"]}`) so that it
//! fits in a single environment variable.

use std::collections::HashMap;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use clap::Parser;
use thiserror::Error;

use crate::poll::DEFAULT_PAGE_SIZE;

/// Replay a saved user timeline through the ingest pipeline once.
#[derive(Parser, Debug, Clone)]
#[command(name = "timeline-ingest")]
#[command(about = "Turn new posts from a user's timeline into bookmark drafts")]
pub struct Args {
    /// Account whose timeline is polled
    #[arg(long, env = "TIMELINE_PROFILE")]
    pub profile: String,

    /// Saved `user_timeline` JSON response to read
    #[arg(long, env = "TIMELINE_FILE")]
    pub timeline: PathBuf,

    /// Only deliver posts with an id greater than this
    #[arg(long, default_value_t = 0)]
    pub since: u64,

    /// Items requested per fetch
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Key the cursor is reported under (defaults to `timeline-ingest.<profile>`)
    #[arg(long)]
    pub metadata_key: Option<String>,

    /// Extra tags for every bookmark, comma separated
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Base64 JSON object mapping profiles to tag lists
    #[arg(long, env = "INGEST_TWITTER_MAPPINGS")]
    pub mappings: Option<String>,

    /// Print bookmarks as JSON lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("mappings are not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("mappings are not a JSON object of tag lists: {0}")]
    Json(#[from] serde_json::Error),
}

impl Args {
    pub fn metadata_key(&self) -> String {
        self.metadata_key
            .clone()
            .unwrap_or_else(|| format!("timeline-ingest.{}", self.profile))
    }

    /// Tags for `--profile`: the mapping's entry (if any) followed by `--tags`.
    pub fn resolved_tags(&self) -> Result<Vec<String>, ConfigError> {
        let mut tags = match &self.mappings {
            Some(encoded) => decode_mappings(encoded)?
                .remove(&self.profile)
                .unwrap_or_default(),
            None => Vec::new(),
        };
        tags.extend(self.tags.iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()));
        Ok(tags)
    }
}

/// Decode a base64 JSON profile→tags mapping.  Blank input is an empty map.
pub fn decode_mappings(encoded: &str) -> Result<HashMap<String, Vec<String>>, ConfigError> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Ok(HashMap::new());
    }
    let bytes = STANDARD.decode(encoded)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn encode(json: &str) -> String {
        STANDARD.encode(json)
    }

    /// Parse `extra` on top of a fixed profile and timeline.  The
    /// environment-backed `--mappings` is reset unless `extra` sets it, so the
    /// caller's shell cannot leak into the result.
    pub(crate) fn args_from(base: &[&str], extra: &[&str]) -> Args {
        let mut argv = vec!["timeline-ingest"];
        argv.extend_from_slice(base);
        argv.extend_from_slice(extra);
        let mut a = Args::try_parse_from(argv).unwrap();
        if !extra.contains(&"--mappings") {
            a.mappings = None;
        }
        a
    }

    fn args(extra: &[&str]) -> Args {
        args_from(&["--profile", "acme", "--timeline", "t.json"], extra)
    }

    #[test]
    fn defaults() {
        let a = args(&[]);
        assert_eq!(a.since, 0);
        assert_eq!(a.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(a.metadata_key(), "timeline-ingest.acme");
        assert!(!a.json);
        assert!(a.mappings.is_none());
        assert!(a.resolved_tags().unwrap().is_empty());
    }

    #[test]
    fn decode_mappings_reads_profile_lists() {
        let m = decode_mappings(&encode(r#"{"acme": ["spring", "java"], "other": []}"#)).unwrap();
        assert_eq!(m["acme"], vec!["spring", "java"]);
        assert!(m["other"].is_empty());
    }

    #[test]
    fn blank_mappings_are_empty() {
        assert!(decode_mappings("  ").unwrap().is_empty());
    }

    #[test]
    fn invalid_base64_is_rejected() {
        assert!(matches!(decode_mappings("***"), Err(ConfigError::Base64(_))));
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(matches!(decode_mappings(&encode("[1, 2]")), Err(ConfigError::Json(_))));
    }

    #[test]
    fn resolved_tags_merge_mapping_and_flags() {
        let mappings = encode(r#"{"acme": ["spring"]}"#);
        let a = args(&["--mappings", mappings.as_str(), "--tags", "twis, ,java"]);
        assert_eq!(a.resolved_tags().unwrap(), vec!["spring", "twis", "java"]);
    }

    #[test]
    fn unmapped_profile_gets_only_flag_tags() {
        let mappings = encode(r#"{"other": ["x"]}"#);
        let a = args(&["--mappings", mappings.as_str()]);
        assert!(a.resolved_tags().unwrap().is_empty());
    }

    #[test]
    fn explicit_metadata_key_wins() {
        let a = args(&["--metadata-key", "custom"]);
        assert_eq!(a.metadata_key(), "custom");
    }
}
