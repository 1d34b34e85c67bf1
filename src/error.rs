//! Error types shared by the timeline adapter, its client and the poller.
//!
//! Construction problems are reported as [`InvalidArgument`] and are never
//! retried.  Read failures surface as [`ClientError`] from the bundled client;
//! the adapter itself passes whatever error its client raises through
//! untouched, and [`PollError`] only adds the metadata key it was polling.

use std::io;

use thiserror::Error;

/// A required constructor argument was missing or out of range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid argument `{name}`: {reason}")]
pub struct InvalidArgument {
    /// Name of the offending argument.
    pub name: &'static str,
    /// Human-readable explanation.
    pub reason: &'static str,
}

impl InvalidArgument {
    pub fn new(name: &'static str, reason: &'static str) -> Self {
        Self { name, reason }
    }
}

/// Failures raised by a timeline client while reading a timeline.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rate limited{}", .retry_after_secs.map(|s| format!(", retry after {s}s")).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not decode timeline: {0}")]
    Decode(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

/// A poll failed because the underlying source failed.
///
/// The poller leaves its queue and cursor untouched when this is returned, so
/// the next `receive()` re-issues the same request.
#[derive(Debug, Error)]
pub enum PollError<E>
where
    E: std::error::Error + 'static,
{
    #[error("failed while polling timeline `{key}`")]
    Source {
        key: String,
        #[source]
        source: E,
    },
}

impl<E> PollError<E>
where
    E: std::error::Error + 'static,
{
    /// The source error, unchanged.
    pub fn source_error(&self) -> &E {
        match self {
            PollError::Source { source, .. } => source,
        }
    }

    pub fn into_source_error(self) -> E {
        match self {
            PollError::Source { source, .. } => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_message_names_the_argument() {
        let e = InvalidArgument::new("profile_id", "must not be empty");
        assert_eq!(e.to_string(), "invalid argument `profile_id`: must not be empty");
    }

    #[test]
    fn rate_limited_message_mentions_retry_when_known() {
        let known = ClientError::RateLimited { retry_after_secs: Some(900) };
        let unknown = ClientError::RateLimited { retry_after_secs: None };
        assert_eq!(known.to_string(), "rate limited, retry after 900s");
        assert_eq!(unknown.to_string(), "rate limited");
    }

    #[test]
    fn json_errors_become_decode_errors() {
        let err = serde_json::from_str::<Vec<u32>>("{").unwrap_err();
        assert!(matches!(ClientError::from(err), ClientError::Decode(_)));
    }

    #[test]
    fn poll_error_keeps_source_chain() {
        use std::error::Error as _;

        let err: PollError<ClientError> = PollError::Source {
            key: "k".into(),
            source: ClientError::Auth("expired token".into()),
        };
        assert_eq!(err.to_string(), "failed while polling timeline `k`");
        let source = err.source().expect("source is kept");
        assert_eq!(source.to_string(), "authentication failed: expired token");
        assert!(matches!(err.into_source_error(), ClientError::Auth(_)));
    }
}
