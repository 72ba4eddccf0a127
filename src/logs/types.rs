use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lowest accepted value for `--limit`
pub const MIN_LIMIT: i64 = 1;
/// Highest accepted value for `--limit`
pub const MAX_LIMIT: i64 = 10_000;
/// Number of events fetched when `--limit` is not given
pub const DEFAULT_LIMIT: i64 = 10;

/// A single log event read from a log stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    /// Name of the stream the event was read from
    pub log_stream_name: String,
    /// Time the event was ingested by the log store (ms since epoch)
    pub ingestion_time: i64,
    /// Raw message
    pub message: String,
    /// Time the event happened (ms since epoch)
    pub timestamp: i64,
}

/// Per-stream position of the last emitted event, in ms since epoch.
///
/// A present entry means "resume after this point" for that stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamCursor(BTreeMap<String, i64>);

impl StreamCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stream: &str) -> Option<i64> {
        self.0.get(stream).copied()
    }

    pub fn insert(&mut self, stream: impl Into<String>, timestamp: i64) {
        self.0.insert(stream.into(), timestamp);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for StreamCursor {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// One batch returned by a log source
#[derive(Debug, Clone, Default)]
pub struct LogEventsOutput {
    /// Events in the order the source returned them
    pub events: Vec<LogEvent>,
    /// Cursor to resume from, `None` once the source has nothing more to follow
    pub next_cursor: Option<StreamCursor>,
}

/// Limits and time window passed to a log source on every poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub limit: usize,
    /// Inclusive lower bound, ms since epoch
    pub start_time: Option<i64>,
    /// Inclusive upper bound, ms since epoch
    pub end_time: Option<i64>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT as usize,
            start_time: None,
            end_time: None,
        }
    }
}

/// How events are written to the output sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `{stream prefix} {message}` lines
    #[default]
    Human,
    /// One JSON object per line
    Json,
}

/// Validated query for one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameters {
    pub limit: usize,
    pub follow: bool,
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    pub since: Option<chrono::TimeDelta>,
    pub output_format: OutputFormat,
}

/// The log group of one (application, environment, service) deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogGroupTarget {
    pub app: String,
    pub env: String,
    pub service: String,
    pub log_group_name: String,
}

impl LogGroupTarget {
    pub fn new(app: &str, env: &str, service: &str) -> Self {
        Self {
            app: app.to_string(),
            env: env.to_string(),
            service: service.to_string(),
            log_group_name: log_group_name(app, env, service),
        }
    }
}

/// Name of the log group that collects a service's task logs
pub fn log_group_name(app: &str, env: &str, service: &str) -> String {
    format!("/copilot/{}-{}-{}", app, env, service)
}
