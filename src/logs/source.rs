use crate::error::Result;
use crate::logs::types::{LogEventsOutput, QueryOptions, StreamCursor};
use async_trait::async_trait;

/// A store that can hand out the task log events of a log group.
///
/// One source is used per environment. The cursor is moved in and the
/// continuation comes back in [`LogEventsOutput::next_cursor`].
#[async_trait]
pub trait LogEventSource: Send + Sync {
    /// Fetch the next batch of events for `log_group`.
    ///
    /// # Arguments
    /// * `log_group` - Name of the log group to read
    /// * `cursor` - Last emitted timestamp per stream, empty on the first call
    /// * `options` - Limit and time window
    ///
    /// # Returns
    /// * `Ok(LogEventsOutput)` - Events in source order plus the cursor to resume from
    /// * `Err(SvcLogsError)` - The store could not be read
    async fn task_log_events(
        &self,
        log_group: &str,
        cursor: StreamCursor,
        options: &QueryOptions,
    ) -> Result<LogEventsOutput>;
}
