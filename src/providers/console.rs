//! Console provider implementation
//!
//! Rendering happens on the logging thread, but the actual terminal writes
//! go through a bounded queue to a background worker so a slow console
//! never stalls dispatch. Error and Critical output is routed to stderr.

use crate::core::{EventRecord, LogLevel, Provider, Result, Sink};
use chrono::{DateTime, Utc};
use colored::Colorize;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Default queue capacity for pending console lines
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Timeout for draining the queue when the provider is disposed
pub const DISPOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Timestamp rendering options for console output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimestampFormat {
    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// RFC 3339 format with timezone offset
    Rfc3339,

    /// Custom strftime format
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Iso8601Micros => {
                datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
            }
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        }
    }
}

enum ConsoleMessage {
    Line { text: String, use_stderr: bool },
    Shutdown,
}

struct ConsoleShared {
    sender: Sender<ConsoleMessage>,
    dropped: AtomicU64,
}

/// Console provider with a background writer thread.
///
/// # Example
///
/// ```no_run
/// use rust_log_dispatch::prelude::*;
/// use rust_log_dispatch::providers::ConsoleProvider;
///
/// let factory = LoggerFactory::builder()
///     .provider(ConsoleProvider::new().with_colors(false))
///     .build()
///     .unwrap();
///
/// factory.create_logger("App").info("Server listening on {Port}", vec![FieldValue::from(8080)]);
/// ```
pub struct ConsoleProvider {
    name: String,
    shared: Arc<ConsoleShared>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
    use_colors: bool,
    timestamp_format: TimestampFormat,
    include_scopes: bool,
}

impl ConsoleProvider {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Create a console provider with a custom queue capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        let handle = thread::spawn(move || Self::worker_loop(receiver));
        Self {
            name: "console".to_string(),
            shared: Arc::new(ConsoleShared {
                sender,
                dropped: AtomicU64::new(0),
            }),
            worker: Mutex::new(Some(handle)),
            use_colors: true,
            timestamp_format: TimestampFormat::default(),
            include_scopes: true,
        }
    }

    /// Override the provider name, e.g. to run two differently-filtered
    /// console providers side by side.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Include or omit the `=> scope` chain suffix
    #[must_use]
    pub fn with_scopes(mut self, include_scopes: bool) -> Self {
        self.include_scopes = include_scopes;
        self
    }

    /// Lines dropped because the queue was full
    pub fn dropped_count(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    fn worker_loop(receiver: Receiver<ConsoleMessage>) {
        for message in receiver.iter() {
            match message {
                ConsoleMessage::Line { text, use_stderr } => {
                    if use_stderr {
                        eprintln!("{}", text);
                    } else {
                        println!("{}", text);
                    }
                }
                ConsoleMessage::Shutdown => break,
            }
        }
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
    }

    fn dispose_internal(&self) {
        let Some(handle) = self.worker.lock().take() else {
            return;
        };

        // Sentinel rather than dropping the sender: cached sinks may still
        // hold sender clones.
        let _ = self.shared.sender.send(ConsoleMessage::Shutdown);

        let start = std::time::Instant::now();
        loop {
            if handle.is_finished() {
                if handle.join().is_err() {
                    eprintln!("[DISPATCH ERROR] Console worker thread panicked during dispose");
                }
                break;
            }
            if start.elapsed() >= DISPOSE_TIMEOUT {
                eprintln!(
                    "[DISPATCH WARNING] Console worker did not drain within {:?}; \
                     some output may be lost.",
                    DISPOSE_TIMEOUT
                );
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Default for ConsoleProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for ConsoleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_sink(&self, _category: &str) -> Arc<dyn Sink> {
        Arc::new(ConsoleSink {
            shared: Arc::clone(&self.shared),
            use_colors: self.use_colors,
            timestamp_format: self.timestamp_format.clone(),
            include_scopes: self.include_scopes,
        })
    }

    fn dispose(&self) {
        self.dispose_internal();
    }
}

impl Drop for ConsoleProvider {
    fn drop(&mut self) {
        self.dispose_internal();
    }
}

struct ConsoleSink {
    shared: Arc<ConsoleShared>,
    use_colors: bool,
    timestamp_format: TimestampFormat,
    include_scopes: bool,
}

/// Keep each event on a single terminal line.
fn sanitize(text: &str) -> String {
    text.replace('\n', "\\n").replace('\r', "\\r")
}

impl ConsoleSink {
    fn format_line(&self, record: &EventRecord) -> String {
        let level_str = if self.use_colors {
            format!("{:8}", record.level.to_str())
                .color(record.level.color_code())
                .to_string()
        } else {
            format!("{:8}", record.level.to_str())
        };

        let mut line = format!(
            "[{}] [{}] {}",
            self.timestamp_format.format(&record.timestamp),
            level_str,
            record.category,
        );

        if record.event_id.id != 0 {
            line.push_str(&format!("[{}]", record.event_id));
        }

        line.push_str(" - ");
        line.push_str(&sanitize(&record.message()));

        if self.include_scopes {
            // Outermost first reads naturally left to right.
            for scope in record.scopes.iter().rev() {
                line.push_str(" => ");
                line.push_str(&sanitize(&scope.text));
            }
        }

        if let Some(error) = &record.error {
            line.push_str(" | ");
            line.push_str(&sanitize(&error.to_string()));
        }

        line
    }
}

impl Sink for ConsoleSink {
    fn write(&self, record: &EventRecord) -> Result<()> {
        let message = ConsoleMessage::Line {
            text: self.format_line(record),
            use_stderr: record.level >= LogLevel::Error,
        };

        match self.shared.sender.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.shared.dropped.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Disconnected(_)) => {
                // Worker already gone; nothing useful to report.
            }
        }
        Ok(())
    }
}
