//! One pass of the ingest pipeline: source → poller → ingest → writer.

use std::io::Write;

use anyhow::{Context, Result};

use crate::config::Args;
use crate::ingest::Ingest;
use crate::poll::TimelinePoller;
use crate::source::{FileProducer, JsonTimelineClient, UserTimelineSource};

/// What a replay produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub delivered: usize,
    pub written: usize,
    /// Id to pass as `--since` next time.
    pub cursor: u64,
    pub metadata_key: String,
}

/// Replay the configured timeline once, writing one bookmark per new tweet.
pub fn replay(args: &Args, out: &mut impl Write) -> Result<Summary> {
    let tags = args.resolved_tags().context("reading tag mappings")?;
    let client = JsonTimelineClient::new(FileProducer::new(&args.timeline));
    let source = UserTimelineSource::new(&args.profile, client, args.metadata_key())?;
    let mut poller = TimelinePoller::new(source)
        .with_page_size(args.page_size)?
        .with_cursor(args.since);

    let messages = poller
        .drain()
        .with_context(|| format!("polling {}", args.timeline.display()))?;

    let mut ingest = Ingest::new();
    let mut written = 0;
    for msg in &messages {
        let Some(bookmark) = ingest.process(&args.profile, &msg.payload, &tags) else {
            continue;
        };
        if args.json {
            serde_json::to_writer(&mut *out, &bookmark)?;
            writeln!(out)?;
        } else {
            write!(out, "{bookmark}")?;
        }
        written += 1;
    }

    Ok(Summary {
        delivered: messages.len(),
        written,
        cursor: poller.cursor(),
        metadata_key: poller.metadata_key().to_string(),
    })
}
