//! Colored terminal output for pipeline runs
//!
//! Renders progress events with `[step/total]` prefixes indented by
//! depth, plus run-level info, success, warning and error lines.

use std::io::Write;

use chrono::Local;
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

use crate::progress::{FailureEvent, ProgressEvent, ProgressSink};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Position prefix of a rendered event line
fn position(depth: usize, step: usize, total: usize) -> String {
    format!("{}[{step}/{total}]", "    ".repeat(depth))
}

fn tinted(color: Color, bold: bool) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color)).set_bold(bold);
    spec
}

/// Terminal reporter for progress events and run-level messages
#[derive(Debug)]
pub struct ConsoleReporter {
    bufwtr: BufferWriter,
    timestamps: bool,
}

impl Clone for ConsoleReporter {
    fn clone(&self) -> Self {
        Self::new(self.timestamps)
    }
}

impl ConsoleReporter {
    /// Creates a reporter, optionally prefixing lines with timestamps
    pub fn new(timestamps: bool) -> Self {
        Self {
            bufwtr: BufferWriter::stdout(ColorChoice::Auto),
            timestamps,
        }
    }

    fn stamp(&self) -> String {
        if self.timestamps {
            format!("{} ", Local::now().format(TIME_FORMAT))
        } else {
            String::new()
        }
    }

    /// Writes one stdout line: a colored marker, then the message.
    /// The message is tinted too when `body` is given.
    fn emit(&self, marker: &str, head: &ColorSpec, body: Option<&ColorSpec>, message: &str) {
        let mut buffer = self.bufwtr.buffer();
        let _ = write!(&mut buffer, "{}", self.stamp());
        let _ = buffer.set_color(head);
        let _ = write!(&mut buffer, "{marker}");
        let _ = buffer.reset();
        if let Some(spec) = body {
            let _ = buffer.set_color(spec);
        }
        let _ = writeln!(&mut buffer, " {message}");
        if body.is_some() {
            let _ = buffer.reset();
        }
        let _ = self.bufwtr.print(&buffer);
    }

    /// Print an informational line
    pub fn info(&self, message: &str) {
        self.emit("ℹ", &tinted(Color::Cyan, false), None, message);
    }

    /// Print a line marking something that went well
    pub fn success(&self, message: &str) {
        self.emit("✓", &tinted(Color::Green, true), None, message);
    }

    /// Print a warning line
    pub fn warn(&self, message: &str) {
        self.emit(
            "⚠",
            &tinted(Color::Yellow, true),
            Some(&tinted(Color::Yellow, false)),
            message,
        );
    }

    /// Print an error line to stderr (always shown)
    pub fn error(&self, message: &str) {
        if self.error_to_stderr(message).is_err() {
            // stderr failed, stdout as last resort
            println!("✗ {}", message);
        }
    }

    fn error_to_stderr(&self, message: &str) -> std::io::Result<()> {
        let stderr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = stderr.buffer();
        buffer.set_color(&tinted(Color::Red, true))?;
        write!(&mut buffer, "{}✗", self.stamp())?;
        buffer.reset()?;
        buffer.set_color(&tinted(Color::Red, false))?;
        writeln!(&mut buffer, " {}", message)?;
        buffer.reset()?;
        stderr.print(&buffer)
    }
}

impl ProgressSink for ConsoleReporter {
    fn step(&self, event: ProgressEvent) {
        let prefix = position(event.depth, event.step, event.total);
        let head = tinted(Color::Cyan, event.depth == 0);
        self.emit(&prefix, &head, None, &event.label);
    }

    fn failure(&self, event: FailureEvent) {
        let stderr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = stderr.buffer();
        let _ = write!(&mut buffer, "{}", self.stamp());
        let _ = buffer.set_color(&tinted(Color::Red, true));
        let _ = write!(
            &mut buffer,
            "✗ {}",
            position(event.depth, event.step, event.total)
        );
        let _ = buffer.reset();
        let _ = buffer.set_color(&tinted(Color::Red, false));
        let _ = writeln!(&mut buffer, " {}", event.message);
        let _ = buffer.reset();
        let _ = stderr.print(&buffer);
    }
}
