use crate::error::Result;
use crate::logs::render::Renderer;
use crate::logs::source::LogEventSource;
use crate::logs::types::{LogEvent, LogGroupTarget, QueryOptions, StreamCursor};
use std::io::Write;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

/// Delay between two passes in follow mode
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A log group together with the source that serves it
#[derive(Clone)]
pub struct PollTarget {
    pub target: LogGroupTarget,
    pub source: Arc<dyn LogEventSource>,
}

impl PollTarget {
    pub fn new(target: LogGroupTarget, source: Arc<dyn LogEventSource>) -> Self {
        Self { target, source }
    }
}

/// Drives log sources pass by pass and hands each pass to the renderer.
///
/// Targets are polled one after the other in the order given, so output is
/// stable across runs. Each target carries its own cursor, starting empty.
pub struct LogPoller {
    options: QueryOptions,
    follow: bool,
    renderer: Renderer,
    poll_interval: Duration,
    cancel: CancellationToken,
}

impl LogPoller {
    pub fn new(options: QueryOptions, follow: bool, renderer: Renderer) -> Self {
        Self {
            options,
            follow,
            renderer,
            poll_interval: DEFAULT_POLL_INTERVAL,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Stop following once `cancel` fires. Checked between passes only.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Poll every target and write the events to `out`.
    ///
    /// Without follow this is a single pass. With follow, passes repeat until
    /// every target is exhausted or the poller is cancelled. Any source error
    /// ends the run and the events of that pass are dropped.
    pub async fn run<W: Write + ?Sized>(&self, targets: &[PollTarget], out: &mut W) -> Result<()> {
        // None marks an exhausted target
        let mut cursors: Vec<Option<StreamCursor>> =
            targets.iter().map(|_| Some(StreamCursor::new())).collect();
        let mut pass = 0u64;

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!(pass, "log polling cancelled");
                return Ok(());
            }

            pass += 1;
            let events = self.poll_pass(targets, &mut cursors).await?;
            tracing::debug!(pass, events = events.len(), "pass complete");
            self.renderer.render(&events, out)?;

            if !self.follow {
                return Ok(());
            }
            if cursors.iter().all(Option::is_none) {
                tracing::debug!(pass, "all log groups exhausted");
                return Ok(());
            }

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!(pass, "log polling cancelled");
                    return Ok(());
                }
                _ = sleep(self.poll_interval) => {}
            }
        }
    }

    /// Poll each active target once, in order
    async fn poll_pass(
        &self,
        targets: &[PollTarget],
        cursors: &mut [Option<StreamCursor>],
    ) -> Result<Vec<LogEvent>> {
        let mut events = Vec::new();

        for (target, slot) in targets.iter().zip(cursors.iter_mut()) {
            let Some(cursor) = slot.take() else {
                continue;
            };

            let output = target
                .source
                .task_log_events(&target.target.log_group_name, cursor, &self.options)
                .await?;

            tracing::debug!(
                env = %target.target.env,
                log_group = %target.target.log_group_name,
                events = output.events.len(),
                exhausted = output.next_cursor.is_none(),
                "polled log group"
            );

            events.extend(output.events);
            *slot = output.next_cursor;
        }

        Ok(events)
    }
}
