//! Logger front-end
//!
//! A `Logger` is a cheap, cloneable handle bound to one category. It never
//! returns an error and never panics on ordinary logging calls: filter
//! misses make `log` a no-op, template/argument mismatches render
//! best-effort, and provider failures are absorbed by the dispatcher.

use super::dispatcher::Dispatcher;
use super::event::{ErrorDetails, EventId, EventRecord};
use super::field_value::FieldValue;
use super::log_level::LogLevel;
use super::scope::{self, ScopeGuard, ScopePayload};
use super::template::MessageTemplate;
use std::sync::Arc;

#[derive(Clone)]
pub struct Logger {
    category: Arc<str>,
    dispatcher: Arc<Dispatcher>,
}

impl Logger {
    pub(crate) fn new(category: Arc<str>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            category,
            dispatcher,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Whether any provider would accept an event at this level.
    ///
    /// Check this before evaluating expensive arguments; the logging macros
    /// do so automatically.
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.dispatcher.is_enabled(&self.category, level)
    }

    /// Build one event record and dispatch it.
    ///
    /// A no-op when no provider accepts the level; otherwise the template is
    /// parsed and the scope chain snapshotted exactly once, and the record is
    /// fanned out to every passing provider.
    pub fn log(
        &self,
        level: LogLevel,
        event_id: EventId,
        template: &str,
        values: Vec<FieldValue>,
        error: Option<&dyn std::error::Error>,
    ) {
        if level == LogLevel::Off || !self.enabled(level) {
            return;
        }

        let template = MessageTemplate::parse(template);
        let args = template.bind(values);
        let mut record = EventRecord::new(
            level,
            event_id,
            self.category.as_ref(),
            template,
            args,
        )
        .with_scopes(scope::current_chain());
        if let Some(error) = error {
            record = record.with_error(ErrorDetails::from_error(error));
        }

        self.dispatcher.dispatch(&record);
    }

    /// Open a nested scope on the calling thread; events written while the
    /// returned guard is alive carry the scope in their chain snapshot.
    /// Provider sinks are offered the opening scope as well.
    pub fn begin_scope(&self, template: &str, values: Vec<FieldValue>) -> ScopeGuard {
        let template = MessageTemplate::parse(template);
        let args = template.bind(values);
        let payload = ScopePayload {
            text: template.render(&args),
            fields: args
                .into_iter()
                .filter_map(|(name, value)| name.map(|n| (n, value)))
                .collect(),
        };
        self.dispatcher.notify_begin_scope(&self.category, &payload);
        scope::begin(payload)
    }

    #[inline]
    pub fn trace(&self, template: &str, values: Vec<FieldValue>) {
        self.log(LogLevel::Trace, EventId::default(), template, values, None);
    }

    #[inline]
    pub fn debug(&self, template: &str, values: Vec<FieldValue>) {
        self.log(LogLevel::Debug, EventId::default(), template, values, None);
    }

    #[inline]
    pub fn info(&self, template: &str, values: Vec<FieldValue>) {
        self.log(LogLevel::Info, EventId::default(), template, values, None);
    }

    #[inline]
    pub fn warn(&self, template: &str, values: Vec<FieldValue>) {
        self.log(LogLevel::Warn, EventId::default(), template, values, None);
    }

    #[inline]
    pub fn error(&self, template: &str, values: Vec<FieldValue>) {
        self.log(LogLevel::Error, EventId::default(), template, values, None);
    }

    #[inline]
    pub fn critical(&self, template: &str, values: Vec<FieldValue>) {
        self.log(LogLevel::Critical, EventId::default(), template, values, None);
    }

    /// Log a warning carrying an error payload
    pub fn warn_with(
        &self,
        error: &dyn std::error::Error,
        template: &str,
        values: Vec<FieldValue>,
    ) {
        self.log(
            LogLevel::Warn,
            EventId::default(),
            template,
            values,
            Some(error),
        );
    }

    /// Log an error-level event carrying an error payload
    pub fn error_with(
        &self,
        error: &dyn std::error::Error,
        template: &str,
        values: Vec<FieldValue>,
    ) {
        self.log(
            LogLevel::Error,
            EventId::default(),
            template,
            values,
            Some(error),
        );
    }

    /// Log a critical event carrying an error payload
    pub fn critical_with(
        &self,
        error: &dyn std::error::Error,
        template: &str,
        values: Vec<FieldValue>,
    ) {
        self.log(
            LogLevel::Critical,
            EventId::default(),
            template,
            values,
            Some(error),
        );
    }
}

/// Two loggers are equal when they are the same cached handle: same
/// category string and same dispatcher.
impl PartialEq for Logger {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.category, &other.category)
            && Arc::ptr_eq(&self.dispatcher, &other.dispatcher)
    }
}

impl Eq for Logger {}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MemoryProvider;

    fn logger_with_memory() -> (Logger, MemoryProvider) {
        let dispatcher = Arc::new(Dispatcher::new(LogLevel::Info));
        let provider = MemoryProvider::new("memory");
        dispatcher
            .register_provider(Box::new(provider.clone()))
            .unwrap();
        let logger = Logger::new(Arc::from("App.Worker"), dispatcher);
        (logger, provider)
    }

    #[test]
    fn test_write_below_threshold_is_noop() {
        let (logger, memory) = logger_with_memory();
        logger.debug("invisible", vec![]);
        assert!(memory.writes().is_empty());
    }

    #[test]
    fn test_write_builds_one_record() {
        let (logger, memory) = logger_with_memory();
        logger.warn("Task {Id} failed", vec![FieldValue::from(42)]);

        let writes = memory.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].category, "App.Worker");
        assert_eq!(writes[0].level, LogLevel::Warn);
        assert_eq!(writes[0].message(), "Task 42 failed");
    }

    #[test]
    fn test_off_level_write_is_noop() {
        let (logger, memory) = logger_with_memory();
        logger.log(LogLevel::Off, EventId::default(), "nothing", vec![], None);
        assert!(memory.writes().is_empty());
    }

    #[test]
    fn test_error_payload_attached() {
        let (logger, memory) = logger_with_memory();
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        logger.error_with(&io, "Unexpected error", vec![]);

        let writes = memory.writes();
        assert_eq!(writes[0].error.as_ref().unwrap().message, "boom");
    }

    #[test]
    fn test_scope_chain_attached_to_events() {
        let (logger, memory) = logger_with_memory();
        let _outer = logger.begin_scope("Order {Id}", vec![FieldValue::from(655321)]);
        let _inner = logger.begin_scope("Main", vec![]);
        logger.info("inside", vec![]);

        let writes = memory.writes();
        let scopes: Vec<&str> = writes[0].scopes.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(scopes, vec!["Main", "Order 655321"]);
    }

    #[test]
    fn test_begin_scope_notifies_sinks() {
        let (logger, memory) = logger_with_memory();
        let _scope = logger.begin_scope("Request {Id}", vec![FieldValue::from(7)]);
        let scopes = memory.scopes();
        assert_eq!(scopes.len(), 1);
        assert_eq!(scopes[0].scope.text, "Request 7");
        assert_eq!(scopes[0].category, "App.Worker");
    }
}
