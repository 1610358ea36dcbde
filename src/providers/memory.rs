//! In-memory capture provider
//!
//! Records every delivered event and every begun scope, primarily for
//! assertions in tests. Cloning the provider shares the captured state, so
//! keep a clone before handing ownership to the factory.

use crate::core::{EventRecord, Provider, Result, ScopePayload, Sink};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type WritePredicate = Box<dyn Fn(&EventRecord) -> bool + Send + Sync>;

/// A scope opening observed by a sink, tagged with the sink's category.
#[derive(Debug, Clone)]
pub struct CapturedScope {
    pub category: String,
    pub scope: ScopePayload,
}

struct MemoryInner {
    writes: Mutex<Vec<EventRecord>>,
    scopes: Mutex<Vec<CapturedScope>>,
    write_enabled: RwLock<Option<WritePredicate>>,
    dispose_count: AtomicUsize,
}

/// Capture provider for tests and diagnostics.
///
/// # Example
///
/// ```
/// use rust_log_dispatch::prelude::*;
///
/// let memory = MemoryProvider::new("memory");
/// let factory = LoggerFactory::builder()
///     .provider(memory.clone())
///     .build()
///     .unwrap();
///
/// factory.create_logger("App").info("captured {N}", vec![FieldValue::from(1)]);
/// assert_eq!(memory.writes().len(), 1);
/// ```
#[derive(Clone)]
pub struct MemoryProvider {
    name: String,
    inner: Arc<MemoryInner>,
}

impl MemoryProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: Arc::new(MemoryInner {
                writes: Mutex::new(Vec::new()),
                scopes: Mutex::new(Vec::new()),
                write_enabled: RwLock::new(None),
                dispose_count: AtomicUsize::new(0),
            }),
        }
    }

    /// Only record events the predicate accepts.
    pub fn set_write_filter(&self, predicate: impl Fn(&EventRecord) -> bool + Send + Sync + 'static) {
        *self.inner.write_enabled.write() = Some(Box::new(predicate));
    }

    /// Snapshot of every captured event, in delivery order.
    pub fn writes(&self) -> Vec<EventRecord> {
        self.inner.writes.lock().clone()
    }

    /// Captured events for one category.
    pub fn writes_for(&self, category: &str) -> Vec<EventRecord> {
        self.inner
            .writes
            .lock()
            .iter()
            .filter(|r| r.category == category)
            .cloned()
            .collect()
    }

    /// Snapshot of every observed scope opening.
    pub fn scopes(&self) -> Vec<CapturedScope> {
        self.inner.scopes.lock().clone()
    }

    /// How many times this provider has been disposed.
    pub fn dispose_count(&self) -> usize {
        self.inner.dispose_count.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.inner.writes.lock().clear();
        self.inner.scopes.lock().clear();
    }
}

impl Provider for MemoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_sink(&self, category: &str) -> Arc<dyn Sink> {
        Arc::new(MemorySink {
            category: category.to_string(),
            inner: Arc::clone(&self.inner),
        })
    }

    fn dispose(&self) {
        self.inner.dispose_count.fetch_add(1, Ordering::Relaxed);
    }
}

struct MemorySink {
    category: String,
    inner: Arc<MemoryInner>,
}

impl Sink for MemorySink {
    fn write(&self, record: &EventRecord) -> Result<()> {
        let enabled = self.inner.write_enabled.read();
        if let Some(predicate) = enabled.as_ref() {
            if !predicate(record) {
                return Ok(());
            }
        }
        drop(enabled);
        self.inner.writes.lock().push(record.clone());
        Ok(())
    }

    fn begin_scope(&self, scope: &ScopePayload) {
        self.inner.scopes.lock().push(CapturedScope {
            category: self.category.clone(),
            scope: scope.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EventId, LogLevel, MessageTemplate};

    fn record(category: &str, level: LogLevel) -> EventRecord {
        let template = MessageTemplate::parse("msg");
        let args = template.bind(vec![]);
        EventRecord::new(level, EventId::default(), category, template, args)
    }

    #[test]
    fn test_capture_and_filter_by_category() {
        let provider = MemoryProvider::new("memory");
        let sink_a = provider.create_sink("A");
        let sink_b = provider.create_sink("B");

        sink_a.write(&record("A", LogLevel::Info)).unwrap();
        sink_b.write(&record("B", LogLevel::Warn)).unwrap();

        assert_eq!(provider.writes().len(), 2);
        assert_eq!(provider.writes_for("A").len(), 1);
    }

    #[test]
    fn test_write_predicate() {
        let provider = MemoryProvider::new("memory");
        provider.set_write_filter(|r| r.level >= LogLevel::Warn);
        let sink = provider.create_sink("A");

        sink.write(&record("A", LogLevel::Info)).unwrap();
        sink.write(&record("A", LogLevel::Error)).unwrap();

        let writes = provider.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].level, LogLevel::Error);
    }

    #[test]
    fn test_clear() {
        let provider = MemoryProvider::new("memory");
        let sink = provider.create_sink("A");
        sink.write(&record("A", LogLevel::Info)).unwrap();
        provider.clear();
        assert!(provider.writes().is_empty());
    }

    #[test]
    fn test_clones_share_captures() {
        let provider = MemoryProvider::new("memory");
        let observer = provider.clone();
        let sink = provider.create_sink("A");
        sink.write(&record("A", LogLevel::Info)).unwrap();
        assert_eq!(observer.writes().len(), 1);
    }
}
