//! Turning a [`TimelineSource`] into a stream of messages.
//!
//! [`TimelinePoller`] is the message-source half of the pipeline.  On every
//! [`receive`](TimelinePoller::receive) it hands out the next queued item; when
//! the queue runs dry it asks the source once for everything newer than the
//! highest id it has enqueued, orders the batch oldest-first and drops what
//! it has already seen.
//!
//! ## For contributors
//!
//! The poller does not schedule itself.  Whoever drives it decides when to
//! call `receive()`; nothing here sleeps, spawns or retries.  Its cursor lives
//! in memory: read it with [`cursor`](TimelinePoller::cursor) after a run and
//! seed the next one with [`with_cursor`](TimelinePoller::with_cursor).

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::error::{InvalidArgument, PollError};
use crate::source::{TimelineItem, TimelineSource};

/// Items requested per fetch unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Headers attached to every delivered item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeaders {
    /// The source's metadata key.
    pub metadata_key: String,
    /// 1-based delivery counter for this poller.
    pub sequence: u64,
    pub received_at: DateTime<Utc>,
}

/// One delivered timeline item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message<T> {
    pub payload: T,
    pub headers: MessageHeaders,
}

pub struct TimelinePoller<S: TimelineSource> {
    source: S,
    page_size: usize,
    queue: VecDeque<S::Item>,
    /// Highest id placed on the queue.  Also the `since_id` of the next fetch.
    last_enqueued_id: u64,
    /// Id of the last item handed out by `receive()`.
    last_delivered_id: u64,
    sequence: u64,
}

impl<S: TimelineSource> TimelinePoller<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            page_size: DEFAULT_PAGE_SIZE,
            queue: VecDeque::new(),
            last_enqueued_id: 0,
            last_delivered_id: 0,
            sequence: 0,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Result<Self, InvalidArgument> {
        if page_size == 0 {
            return Err(InvalidArgument::new("page_size", "the page size must be at least 1"));
        }
        self.page_size = page_size;
        Ok(self)
    }

    /// Resume after `id`: nothing at or below it will be delivered.
    pub fn with_cursor(mut self, id: u64) -> Self {
        self.last_enqueued_id = id;
        self.last_delivered_id = id;
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Id of the last delivered item (or the seeded cursor).
    pub fn cursor(&self) -> u64 {
        self.last_delivered_id
    }

    pub fn metadata_key(&self) -> &str {
        self.source.metadata_key()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Number of fetched items not yet delivered.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Deliver the next item, fetching once if nothing is queued.
    ///
    /// Returns `Ok(None)` when the source has nothing new.
    pub fn receive(&mut self) -> Result<Option<Message<S::Item>>, PollError<S::Error>> {
        if self.queue.is_empty() {
            self.refresh()?;
        }

        let Some(item) = self.queue.pop_front() else {
            return Ok(None);
        };

        self.last_delivered_id = item.id();
        self.sequence += 1;
        Ok(Some(Message {
            payload: item,
            headers: MessageHeaders {
                metadata_key: self.source.metadata_key().to_string(),
                sequence: self.sequence,
                received_at: Utc::now(),
            },
        }))
    }

    /// Deliver everything currently available.
    ///
    /// Hits the source at most once, and only if nothing was queued.  Stops as
    /// soon as the queue empties.
    pub fn drain(&mut self) -> Result<Vec<Message<S::Item>>, PollError<S::Error>> {
        let mut out = Vec::new();
        while let Some(msg) = self.receive()? {
            out.push(msg);
            if self.queue.is_empty() {
                break;
            }
        }
        Ok(out)
    }

    fn refresh(&mut self) -> Result<(), PollError<S::Error>> {
        let mut batch = self
            .source
            .fetch_since(self.last_enqueued_id, self.page_size)
            .map_err(|source| PollError::Source {
                key: self.source.metadata_key().to_string(),
                source,
            })?;

        batch.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(&b.id()))
        });

        let fetched = batch.len();
        for item in batch {
            let id = item.id();
            if id > self.last_enqueued_id {
                self.queue.push_back(item);
                self.last_enqueued_id = id;
            }
        }

        tracing::debug!(
            source = self.source.name(),
            fetched,
            enqueued = self.queue.len(),
            cursor = self.last_enqueued_id,
            "refreshed timeline queue"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::error::ClientError;
    use crate::source::{make_tweet, Tweet};

    /// A source that serves scripted batches and records its calls.
    struct ScriptedSource {
        batches: RefCell<VecDeque<Result<Vec<Tweet>, ClientError>>>,
        calls: RefCell<Vec<(u64, usize)>>,
    }

    impl ScriptedSource {
        fn new(batches: Vec<Result<Vec<Tweet>, ClientError>>) -> Self {
            Self {
                batches: RefCell::new(batches.into()),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl TimelineSource for ScriptedSource {
        type Item = Tweet;
        type Error = ClientError;

        fn name(&self) -> &str {
            "scripted"
        }

        fn metadata_key(&self) -> &str {
            "scripted-key"
        }

        fn fetch_since(&self, since_id: u64, page_size: usize) -> Result<Vec<Tweet>, ClientError> {
            self.calls.borrow_mut().push((since_id, page_size));
            self.batches
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn ids(messages: &[Message<Tweet>]) -> Vec<u64> {
        messages.iter().map(|m| m.payload.id).collect()
    }

    #[test]
    fn delivers_oldest_first() {
        // Served newest-first, as a timeline is.
        let source = ScriptedSource::new(vec![Ok(vec![
            make_tweet(1005, 30),
            make_tweet(1003, 20),
            make_tweet(1001, 10),
        ])]);
        let mut poller = TimelinePoller::new(source);

        let msgs = poller.drain().unwrap();

        assert_eq!(ids(&msgs), vec![1001, 1003, 1005]);
        assert_eq!(poller.cursor(), 1005);
    }

    #[test]
    fn empty_source_yields_none() {
        let mut poller = TimelinePoller::new(ScriptedSource::new(vec![]));
        assert!(poller.receive().unwrap().is_none());
        assert_eq!(poller.cursor(), 0);
    }

    #[test]
    fn fetches_only_when_queue_is_empty() {
        let source = ScriptedSource::new(vec![Ok(vec![make_tweet(2, 2), make_tweet(1, 1)])]);
        let mut poller = TimelinePoller::new(source);

        poller.receive().unwrap();
        assert_eq!(poller.pending(), 1);
        poller.receive().unwrap();

        assert_eq!(poller.source().calls.borrow().len(), 1);
    }

    #[test]
    fn next_fetch_starts_after_highest_enqueued_id() {
        let source = ScriptedSource::new(vec![
            Ok(vec![make_tweet(11, 1), make_tweet(10, 0)]),
            Ok(vec![make_tweet(12, 2)]),
        ]);
        let mut poller = TimelinePoller::new(source).with_page_size(5).unwrap();

        poller.drain().unwrap();
        let second = poller.drain().unwrap();

        assert_eq!(ids(&second), vec![12]);
        assert_eq!(*poller.source().calls.borrow(), vec![(0, 5), (11, 5)]);
    }

    #[test]
    fn items_at_or_below_cursor_are_dropped() {
        let source = ScriptedSource::new(vec![Ok(vec![
            make_tweet(101, 3),
            make_tweet(100, 2),
            make_tweet(99, 1),
        ])]);
        let mut poller = TimelinePoller::new(source).with_cursor(100);

        let msgs = poller.drain().unwrap();

        assert_eq!(ids(&msgs), vec![101]);
        assert_eq!(poller.source().calls.borrow()[0].0, 100);
    }

    #[test]
    fn source_error_is_wrapped_and_state_kept() {
        let source = ScriptedSource::new(vec![
            Err(ClientError::Transport("connection reset".into())),
            Ok(vec![make_tweet(7, 0)]),
        ]);
        let mut poller = TimelinePoller::new(source).with_cursor(5);

        let err = poller.receive().unwrap_err();
        assert!(matches!(err.source_error(), ClientError::Transport(_)));
        assert!(err.to_string().contains("scripted-key"));
        assert_eq!(poller.cursor(), 5);

        let msg = poller.receive().unwrap().unwrap();
        assert_eq!(msg.payload.id, 7);
        assert_eq!(*poller.source().calls.borrow(), vec![(5, 20), (5, 20)]);
    }

    #[test]
    fn headers_carry_key_and_sequence() {
        let source = ScriptedSource::new(vec![Ok(vec![make_tweet(2, 2), make_tweet(1, 1)])]);
        let mut poller = TimelinePoller::new(source);

        let msgs = poller.drain().unwrap();

        assert_eq!(msgs[0].headers.metadata_key, "scripted-key");
        assert_eq!(msgs[0].headers.sequence, 1);
        assert_eq!(msgs[1].headers.sequence, 2);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let result = TimelinePoller::new(ScriptedSource::new(vec![])).with_page_size(0);
        assert!(result.is_err());
    }

    #[test]
    fn default_page_size_is_forwarded() {
        let mut poller = TimelinePoller::new(ScriptedSource::new(vec![]));
        poller.receive().unwrap();
        assert_eq!(poller.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(poller.source().calls.borrow()[0].1, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn duplicate_ids_within_a_batch_are_enqueued_once() {
        let source = ScriptedSource::new(vec![Ok(vec![make_tweet(3, 1), make_tweet(3, 1)])]);
        let mut poller = TimelinePoller::new(source);

        assert_eq!(ids(&poller.drain().unwrap()), vec![3]);
    }
}
