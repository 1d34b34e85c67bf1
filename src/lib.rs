//! timeline-ingest — poll a user's timeline since a cursor and turn new posts
//! into bookmark drafts.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌────────────────┐ user_timeline ┌────────────────────┐ fetch_since ┌──────────┐ Message ┌──────────┐
//! │ TimelineClient │ ◄──────────── │ UserTimelineSource │ ◄────────── │  poll.rs │ ──────► │ingest.rs │
//! │ (JSON decode)  │               │  (one profile)     │             │ (cursor) │         │(bookmark)│
//! └────────────────┘               └────────────────────┘             └──────────┘         └──────────┘
//! ```
//!
//! * **`source/`** — the client, source and item traits, the `Tweet` model,
//!   the JSON timeline client, and [`UserTimelineSource`](source::UserTimelineSource).
//! * **`poll`** — [`TimelinePoller`](poll::TimelinePoller): queue, in-memory
//!   cursor and message wrapping.  Driven by the caller; never schedules.
//! * **`ingest`** — converts delivered tweets into [`Bookmark`](ingest::Bookmark)s.
//! * **`config`** — clap arguments and the profile→tags mapping.
//! * **`pipeline`** — wires the above together for one replay pass.

pub mod config;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod poll;
pub mod source;

pub use error::{ClientError, InvalidArgument, PollError};
pub use poll::{Message, MessageHeaders, TimelinePoller};
pub use source::{TimelineClient, TimelineItem, TimelineSource, Tweet, UserTimelineSource};
