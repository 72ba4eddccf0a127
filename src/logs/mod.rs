// Logs module - Log retrieval, follow loop and rendering

mod poller;
mod reader;
mod render;
mod source;
pub mod time;
mod types;

pub use poller::{LogPoller, PollTarget, DEFAULT_POLL_INTERVAL};
pub use reader::FileLogSource;
pub use render::{Renderer, SHORT_STREAM_NAME_LEN};
pub use source::LogEventSource;
pub use types::{
    log_group_name, LogEvent, LogEventsOutput, LogGroupTarget, OutputFormat, QueryOptions,
    QueryParameters, StreamCursor, DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT,
};
