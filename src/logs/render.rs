use crate::error::{Result, SvcLogsError};
use crate::logs::types::{LogEvent, OutputFormat};
use colored::Colorize;
use std::io::Write;

/// Width of the stream name column in human output
pub const SHORT_STREAM_NAME_LEN: usize = 25;

const FATAL_CODES: &[&str] = &["FATA", "FATAL", "ERRO", "ERROR", "panic"];
const WARNING_CODES: &[&str] = &["WARN", "WARNING"];

/// Writes log events to an output sink, one line per event
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    format: OutputFormat,
    color: bool,
}

impl Renderer {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: false,
        }
    }

    /// Enable ANSI colors for human output. Ignored for JSON.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Format a single event as a newline-terminated line
    pub fn format_event(&self, event: &LogEvent) -> Result<String> {
        match self.format {
            OutputFormat::Human => Ok(self.human_line(event)),
            OutputFormat::Json => {
                let mut line = serde_json::to_string(event)
                    .map_err(|e| SvcLogsError::SerializationError(e.to_string()))?;
                line.push('\n');
                Ok(line)
            }
        }
    }

    /// Write every event in order.
    ///
    /// Each line goes out with a single write so lines never interleave.
    pub fn render<W: Write + ?Sized>(&self, events: &[LogEvent], out: &mut W) -> Result<()> {
        for event in events {
            let line = self.format_event(event)?;
            out.write_all(line.as_bytes())?;
        }
        out.flush()?;
        Ok(())
    }

    fn human_line(&self, event: &LogEvent) -> String {
        let prefix = short_stream_name(&event.log_stream_name);
        if !self.color {
            return format!("{} {}\n", prefix, event.message);
        }

        let message = if FATAL_CODES.iter().any(|c| event.message.contains(c)) {
            event.message.red().to_string()
        } else if WARNING_CODES.iter().any(|c| event.message.contains(c)) {
            event.message.yellow().to_string()
        } else {
            event.message.clone()
        };
        format!("{} {}\n", prefix.dimmed(), message)
    }
}

/// First characters of a stream name, padded to a fixed-width column
fn short_stream_name(name: &str) -> String {
    let truncated: String = name.chars().take(SHORT_STREAM_NAME_LEN).collect();
    format!("{:<width$}", truncated, width = SHORT_STREAM_NAME_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(stream: &str, message: &str) -> LogEvent {
        LogEvent {
            log_stream_name: stream.to_string(),
            ingestion_time: 0,
            message: message.to_string(),
            timestamp: 0,
        }
    }

    #[test]
    fn test_short_stream_name() {
        assert_eq!(
            short_stream_name("firelens_log_router/fcfe4ab8043841c08162318e5ad805f1"),
            "firelens_log_router/fcfe4"
        );
        assert_eq!(short_stream_name("web"), format!("web{}", " ".repeat(22)));
        assert_eq!(short_stream_name("web").len(), SHORT_STREAM_NAME_LEN);
    }

    #[test]
    fn test_human_line() {
        let renderer = Renderer::new(OutputFormat::Human);
        let line = renderer
            .format_event(&event(
                "firelens_log_router/fcfe4ab8043841c08162318e5ad805f1",
                "X",
            ))
            .unwrap();
        assert_eq!(line, "firelens_log_router/fcfe4 X\n");
    }

    #[test]
    fn test_human_line_keeps_message_untouched() {
        let renderer = Renderer::new(OutputFormat::Human);
        let line = renderer
            .format_event(&event("s", "  FATA \"quoted\"  "))
            .unwrap();
        assert!(line.ends_with(" FATA \"quoted\"  \n"));
    }

    #[test]
    fn test_json_line() {
        let renderer = Renderer::new(OutputFormat::Json);
        let line = renderer
            .format_event(&event("stream", "say \"hi\""))
            .unwrap();
        assert_eq!(
            line,
            "{\"logStreamName\":\"stream\",\"ingestionTime\":0,\"message\":\"say \\\"hi\\\"\",\"timestamp\":0}\n"
        );
    }

    #[test]
    fn test_json_ignores_color() {
        let renderer = Renderer::new(OutputFormat::Json).with_color(true);
        let line = renderer.format_event(&event("s", "ERROR boom")).unwrap();
        assert!(!line.contains('\u{1b}'));
    }

    #[test]
    fn test_colored_line_highlights_levels() {
        colored::control::set_override(true);
        let renderer = Renderer::new(OutputFormat::Human).with_color(true);

        for message in ["FATA some error", "ERROR boom", "panic: oops"] {
            let line = renderer.format_event(&event("s", message)).unwrap();
            assert!(line.contains(&format!("\u{1b}[31m{}", message)), "{line:?}");
        }

        let line = renderer.format_event(&event("s", "WARN careful")).unwrap();
        assert!(line.contains("\u{1b}[33mWARN careful"), "{line:?}");
        assert!(line.starts_with("\u{1b}[2ms"), "{line:?}");
        assert!(line.ends_with('\n'));

        let line = renderer.format_event(&event("s", "all good")).unwrap();
        assert!(line.starts_with("\u{1b}[2ms"), "{line:?}");
        assert!(line.ends_with(" all good\n"), "{line:?}");
        assert!(!line.contains("\u{1b}[31m"));
        assert!(!line.contains("\u{1b}[33m"));
    }

    #[test]
    fn test_render_preserves_order() {
        let renderer = Renderer::new(OutputFormat::Human);
        let events = vec![event("b", "second"), event("a", "first")];
        let mut out = Vec::new();
        renderer.render(&events, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("second"));
        assert!(lines[1].ends_with("first"));
    }
}
