use crate::error::{Result, SvcLogsError};
use crate::logs::source::LogEventSource;
use crate::logs::types::{LogEvent, LogEventsOutput, QueryOptions, StreamCursor};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

/// File extension of stream files inside a log group directory
const STREAM_FILE_EXTENSION: &str = "log";

/// A record as stored on disk, one JSON object per line
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEvent {
    timestamp: i64,
    #[serde(default)]
    ingestion_time: Option<i64>,
    message: String,
}

/// Log source backed by a local directory tree.
///
/// Log group `/copilot/app-env-svc` lives in `<root>/copilot/app-env-svc/` and
/// every `*.log` file below it is one stream, named by its relative path
/// without the extension.
#[derive(Debug, Clone)]
pub struct FileLogSource {
    root: PathBuf,
}

impl FileLogSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the streams of a log group
    pub fn group_dir(&self, log_group: &str) -> PathBuf {
        self.root.join(log_group.trim_start_matches('/'))
    }
}

#[async_trait]
impl LogEventSource for FileLogSource {
    async fn task_log_events(
        &self,
        log_group: &str,
        mut cursor: StreamCursor,
        options: &QueryOptions,
    ) -> Result<LogEventsOutput> {
        let dir = self.group_dir(log_group);
        let is_dir = tokio::fs::metadata(&dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(SvcLogsError::Retrieval(format!(
                "log group {} does not exist",
                log_group
            )));
        }

        // A fresh query tails the newest events; a resumed one returns the
        // oldest unseen events first so the rest follow on the next call.
        let resuming = !cursor.is_empty();

        let mut events = Vec::new();
        for (stream, path) in list_streams(&dir).await? {
            let stream_events =
                read_stream(&path, &stream, cursor.get(&stream), options, resuming).await?;
            events.extend(stream_events);
        }

        // Stable, so events sharing a timestamp keep their stream order
        events.sort_by_key(|e| e.timestamp);
        keep_limit(&mut events, options.limit, resuming);

        // Only returned events move a stream forward
        for event in &events {
            cursor.insert(event.log_stream_name.clone(), event.timestamp);
        }

        tracing::debug!(
            log_group,
            events = events.len(),
            streams = cursor.len(),
            "read log events"
        );

        Ok(LogEventsOutput {
            events,
            next_cursor: Some(cursor),
        })
    }
}

/// Collect every stream file below `dir`, sorted by stream name
async fn list_streams(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut streams = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&current)
            .await
            .map_err(|e| SvcLogsError::Retrieval(format!("list log streams: {}", e)))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SvcLogsError::Retrieval(format!("list log streams: {}", e)))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| SvcLogsError::Retrieval(format!("list log streams: {}", e)))?;
            if file_type.is_dir() {
                pending.push(path);
                continue;
            }
            if path.extension().and_then(|s| s.to_str()) != Some(STREAM_FILE_EXTENSION) {
                continue;
            }
            if let Some(name) = stream_name(dir, &path) {
                streams.push((name, path));
            }
        }
    }

    streams.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(streams)
}

fn stream_name(group_dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(group_dir).ok()?.with_extension("");
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// Read the events of one stream that fall after `after` and inside the window.
///
/// At most `options.limit` matching events are kept, see [`keep_limit`].
async fn read_stream(
    path: &Path,
    stream: &str,
    after: Option<i64>,
    options: &QueryOptions,
    resuming: bool,
) -> Result<Vec<LogEvent>> {
    let file = File::open(path)
        .await
        .map_err(|e| SvcLogsError::LogFileError(format!("{}: {}", path.display(), e)))?;

    let mut lines = BufReader::new(file).lines();
    let mut events = Vec::new();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| SvcLogsError::LogFileError(format!("{}: {}", path.display(), e)))?
    {
        if line.trim().is_empty() {
            continue;
        }

        let stored: StoredEvent = match serde_json::from_str(&line) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(stream, "skipping malformed log record: {}", e);
                continue;
            }
        };

        if after.is_some_and(|t| stored.timestamp <= t) {
            continue;
        }
        if options.start_time.is_some_and(|t| stored.timestamp < t) {
            continue;
        }
        if options.end_time.is_some_and(|t| stored.timestamp > t) {
            continue;
        }

        events.push(LogEvent {
            log_stream_name: stream.to_string(),
            ingestion_time: stored.ingestion_time.unwrap_or(stored.timestamp),
            message: stored.message,
            timestamp: stored.timestamp,
        });
    }

    keep_limit(&mut events, options.limit, resuming);
    Ok(events)
}

/// Cut time-ordered `events` down to `limit`: the oldest when resuming, the newest otherwise
fn keep_limit(events: &mut Vec<LogEvent>, limit: usize, resuming: bool) {
    if events.len() <= limit {
        return;
    }
    if resuming {
        events.truncate(limit);
    } else {
        events.drain(..events.len() - limit);
    }
}
