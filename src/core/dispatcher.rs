//! Event dispatcher and provider registry
//!
//! The dispatcher owns the registered providers and the active filter rule
//! set. Both are read-mostly: readers grab an `Arc` snapshot and work
//! against it, while registration, removal, and reconfiguration publish a
//! replacement snapshot atomically. A dispatch in flight therefore sees
//! entirely the pre- or post-change state, never a mix.

use super::config::FilterConfig;
use super::error::{DispatchError, Result};
use super::event::EventRecord;
use super::filter::{FilterRule, FilterRuleSet};
use super::log_level::LogLevel;
use super::metrics::DispatchMetrics;
use super::provider::{Provider, ProviderEntry, ProviderState};
use super::scope::ScopePayload;
use parking_lot::RwLock;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type ProviderSnapshot = Arc<Vec<Arc<ProviderEntry>>>;

pub struct Dispatcher {
    providers: RwLock<ProviderSnapshot>,
    filters: RwLock<Arc<FilterRuleSet>>,
    terminal: AtomicBool,
    shutdown_write_reported: AtomicBool,
    metrics: DispatchMetrics,
}

impl Dispatcher {
    pub fn new(default_level: LogLevel) -> Self {
        Self {
            providers: RwLock::new(Arc::new(Vec::new())),
            filters: RwLock::new(Arc::new(FilterRuleSet::empty(default_level))),
            terminal: AtomicBool::new(false),
            shutdown_write_reported: AtomicBool::new(false),
            metrics: DispatchMetrics::new(),
        }
    }

    fn provider_snapshot(&self) -> ProviderSnapshot {
        Arc::clone(&self.providers.read())
    }

    fn filter_snapshot(&self) -> Arc<FilterRuleSet> {
        Arc::clone(&self.filters.read())
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal.load(Ordering::Acquire)
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    /// Whether at least one registered provider would accept an event in
    /// `category` at `level`. Builds nothing; this is the hot pre-check
    /// behind `Logger::enabled`.
    pub fn is_enabled(&self, category: &str, level: LogLevel) -> bool {
        if level == LogLevel::Off || self.is_terminal() {
            return false;
        }
        let filters = self.filter_snapshot();
        self.provider_snapshot().iter().any(|entry| {
            entry.state() != ProviderState::Disposed
                && filters.evaluate(entry.name(), category, level)
        })
    }

    /// Fan an event out to every provider whose filter passes.
    ///
    /// Each sink invocation is isolated: an `Err` or a panic from one
    /// provider is counted, reported on stderr at most once per provider,
    /// and never prevents delivery to the rest nor reaches the caller.
    pub fn dispatch(&self, record: &EventRecord) {
        if self.is_terminal() {
            self.metrics.record_dropped_after_shutdown();
            if !self.shutdown_write_reported.swap(true, Ordering::Relaxed) {
                eprintln!("[DISPATCH WARNING] Event dispatched after shutdown; dropping.");
            }
            return;
        }

        let filters = self.filter_snapshot();
        let providers = self.provider_snapshot();
        self.metrics.record_dispatched();

        for entry in providers.iter() {
            if !filters.evaluate(entry.name(), &record.category, record.level) {
                continue;
            }
            let Some(sink) = entry.sink_for(&record.category) else {
                continue;
            };

            match catch_unwind(AssertUnwindSafe(|| sink.write(record))) {
                Ok(Ok(())) => {
                    self.metrics.record_delivery();
                }
                Ok(Err(error)) => {
                    self.metrics.record_provider_fault();
                    entry.report_fault_once(&format!("sink write failed: {}", error));
                }
                Err(_) => {
                    self.metrics.record_provider_fault();
                    entry.report_fault_once("sink write panicked");
                }
            }
        }
    }

    /// Offer an opening scope to every active provider's sink for the
    /// category. Scope notifications are not level-filtered; providers that
    /// don't track scopes ignore them.
    pub fn notify_begin_scope(&self, category: &str, payload: &ScopePayload) {
        if self.is_terminal() {
            return;
        }
        for entry in self.provider_snapshot().iter() {
            let Some(sink) = entry.sink_for(category) else {
                continue;
            };
            if catch_unwind(AssertUnwindSafe(|| sink.begin_scope(payload))).is_err() {
                self.metrics.record_provider_fault();
                entry.report_fault_once("sink panicked in begin_scope");
            }
        }
    }

    /// Register a provider. Fails if the pipeline is shut down, the name is
    /// empty, or the name is already taken.
    pub fn register_provider(&self, provider: Box<dyn Provider>) -> Result<()> {
        if self.is_terminal() {
            return Err(DispatchError::FactoryStopped);
        }
        if provider.name().is_empty() {
            return Err(DispatchError::config(
                "Provider",
                "provider name must be non-empty",
            ));
        }

        let mut providers = self.providers.write();
        if providers.iter().any(|e| e.name() == provider.name()) {
            return Err(DispatchError::duplicate_provider(provider.name()));
        }

        let entry = Arc::new(ProviderEntry::new(provider));
        entry.activate();

        let mut next: Vec<Arc<ProviderEntry>> = providers.iter().cloned().collect();
        next.push(entry);
        *providers = Arc::new(next);
        Ok(())
    }

    /// Remove and dispose the named provider. Returns false when no such
    /// provider is registered.
    pub fn remove_provider(&self, name: &str) -> bool {
        let removed = {
            let mut providers = self.providers.write();
            let Some(index) = providers.iter().position(|e| e.name() == name) else {
                return false;
            };
            let mut next: Vec<Arc<ProviderEntry>> = providers.iter().cloned().collect();
            let removed = next.remove(index);
            *providers = Arc::new(next);
            removed
        };
        self.dispose_entry(&removed);
        true
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.provider_snapshot()
            .iter()
            .map(|e| e.name().to_string())
            .collect()
    }

    /// Swap in a new rule set built from explicit rules.
    ///
    /// Rules naming an unregistered provider are configuration errors; on
    /// `Err` the previously active rules remain in force.
    pub fn apply_filters(
        &self,
        rules: Vec<FilterRule>,
        default_level: Option<LogLevel>,
    ) -> Result<()> {
        let registered = self.provider_names();
        for rule in &rules {
            if let Some(provider) = &rule.provider {
                if !registered.iter().any(|name| name == provider) {
                    return Err(DispatchError::unknown_provider(provider.as_str()));
                }
            }
        }

        let default_level = default_level.unwrap_or_else(|| self.filter_snapshot().default_level());
        *self.filters.write() = Arc::new(FilterRuleSet::build(rules, Some(default_level)));
        Ok(())
    }

    /// Swap in a new rule set from a consumed configuration mapping.
    pub fn apply_config(&self, config: &FilterConfig) -> Result<()> {
        let (rules, default_level) = config.to_rules()?;
        self.apply_filters(rules, default_level)
    }

    /// Change only the fallback minimum level, keeping the current rules.
    pub fn set_default_level(&self, level: LogLevel) {
        let mut filters = self.filters.write();
        let next = filters.with_default_level(level);
        *filters = Arc::new(next);
    }

    /// Dispose every provider in registration order, then go terminal.
    /// Idempotent; once terminal, dispatch and scope notifications become
    /// silent no-ops and registration fails.
    pub fn shutdown(&self) {
        if self.terminal.swap(true, Ordering::AcqRel) {
            return;
        }
        for entry in self.provider_snapshot().iter() {
            self.dispose_entry(entry);
        }
    }

    fn dispose_entry(&self, entry: &ProviderEntry) {
        if !entry.begin_dispose() {
            return;
        }
        if !entry.run_dispose() {
            self.metrics.record_provider_fault();
            entry.report_fault_once("panicked during dispose");
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::EventId;
    use crate::core::provider::Sink;
    use crate::core::template::MessageTemplate;
    use parking_lot::Mutex;

    struct VecSink {
        written: Arc<Mutex<Vec<String>>>,
    }

    impl Sink for VecSink {
        fn write(&self, record: &EventRecord) -> Result<()> {
            self.written.lock().push(record.message());
            Ok(())
        }
    }

    struct VecProvider {
        name: String,
        written: Arc<Mutex<Vec<String>>>,
    }

    impl VecProvider {
        fn new(name: &str) -> (Self, Arc<Mutex<Vec<String>>>) {
            let written = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    name: name.to_string(),
                    written: Arc::clone(&written),
                },
                written,
            )
        }
    }

    impl Provider for VecProvider {
        fn name(&self) -> &str {
            &self.name
        }

        fn create_sink(&self, _category: &str) -> Arc<dyn Sink> {
            Arc::new(VecSink {
                written: Arc::clone(&self.written),
            })
        }
    }

    fn record(category: &str, level: LogLevel, text: &str) -> EventRecord {
        let template = MessageTemplate::parse(text);
        let args = template.bind(vec![]);
        EventRecord::new(level, EventId::default(), category, template, args)
    }

    #[test]
    fn test_dispatch_fans_out_to_passing_providers() {
        let dispatcher = Dispatcher::new(LogLevel::Info);
        let (p1, w1) = VecProvider::new("one");
        let (p2, w2) = VecProvider::new("two");
        dispatcher.register_provider(Box::new(p1)).unwrap();
        dispatcher.register_provider(Box::new(p2)).unwrap();

        dispatcher.dispatch(&record("App", LogLevel::Warn, "hello"));

        assert_eq!(w1.lock().len(), 1);
        assert_eq!(w2.lock().len(), 1);
        assert_eq!(dispatcher.metrics().deliveries(), 2);
    }

    #[test]
    fn test_per_provider_filtering() {
        let dispatcher = Dispatcher::new(LogLevel::Info);
        let (p1, w1) = VecProvider::new("console");
        let (p2, w2) = VecProvider::new("file");
        dispatcher.register_provider(Box::new(p1)).unwrap();
        dispatcher.register_provider(Box::new(p2)).unwrap();
        dispatcher
            .apply_filters(
                vec![
                    FilterRule::for_provider("console", "", LogLevel::Info),
                    FilterRule::for_provider("file", "", LogLevel::Debug),
                ],
                None,
            )
            .unwrap();

        dispatcher.dispatch(&record("App", LogLevel::Debug, "debug detail"));

        assert_eq!(w1.lock().len(), 0, "console rejects Debug");
        assert_eq!(w2.lock().len(), 1, "file accepts Debug");
    }

    #[test]
    fn test_duplicate_provider_rejected() {
        let dispatcher = Dispatcher::new(LogLevel::Info);
        let (p1, _) = VecProvider::new("dup");
        let (p2, _) = VecProvider::new("dup");
        dispatcher.register_provider(Box::new(p1)).unwrap();
        let err = dispatcher.register_provider(Box::new(p2)).unwrap_err();
        assert!(matches!(err, DispatchError::DuplicateProvider { .. }));
    }

    #[test]
    fn test_unknown_provider_in_rules_keeps_previous_config() {
        let dispatcher = Dispatcher::new(LogLevel::Info);
        let (p1, _) = VecProvider::new("real");
        dispatcher.register_provider(Box::new(p1)).unwrap();

        dispatcher
            .apply_filters(vec![FilterRule::new("App", LogLevel::Error)], None)
            .unwrap();

        let err = dispatcher
            .apply_filters(
                vec![FilterRule::for_provider("ghost", "App", LogLevel::Trace)],
                None,
            )
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownProvider { .. }));

        // Previous rules still in force.
        assert!(!dispatcher.is_enabled("App", LogLevel::Warn));
        assert!(dispatcher.is_enabled("App", LogLevel::Error));
    }

    #[test]
    fn test_dispatch_after_shutdown_is_silent() {
        let dispatcher = Dispatcher::new(LogLevel::Info);
        let (p1, w1) = VecProvider::new("one");
        dispatcher.register_provider(Box::new(p1)).unwrap();

        dispatcher.shutdown();
        dispatcher.shutdown();

        dispatcher.dispatch(&record("App", LogLevel::Error, "too late"));
        assert_eq!(w1.lock().len(), 0);
        assert_eq!(dispatcher.metrics().dropped_after_shutdown(), 1);
        assert!(!dispatcher.is_enabled("App", LogLevel::Error));
    }

    #[test]
    fn test_register_after_shutdown_is_error() {
        let dispatcher = Dispatcher::new(LogLevel::Info);
        dispatcher.shutdown();
        let (p1, _) = VecProvider::new("late");
        let err = dispatcher.register_provider(Box::new(p1)).unwrap_err();
        assert!(matches!(err, DispatchError::FactoryStopped));
    }

    #[test]
    fn test_remove_provider_disposes_and_unregisters() {
        let dispatcher = Dispatcher::new(LogLevel::Info);
        let (p1, w1) = VecProvider::new("gone");
        dispatcher.register_provider(Box::new(p1)).unwrap();

        assert!(dispatcher.remove_provider("gone"));
        assert!(!dispatcher.remove_provider("gone"));

        dispatcher.dispatch(&record("App", LogLevel::Error, "after removal"));
        assert_eq!(w1.lock().len(), 0);
    }

    #[test]
    fn test_faulting_sink_does_not_stop_others() {
        struct FailingSink;
        impl Sink for FailingSink {
            fn write(&self, _record: &EventRecord) -> Result<()> {
                Err(DispatchError::sink_write("failing", "always fails"))
            }
        }
        struct FailingProvider;
        impl Provider for FailingProvider {
            fn name(&self) -> &str {
                "failing"
            }
            fn create_sink(&self, _category: &str) -> Arc<dyn Sink> {
                Arc::new(FailingSink)
            }
        }

        let dispatcher = Dispatcher::new(LogLevel::Info);
        dispatcher.register_provider(Box::new(FailingProvider)).unwrap();
        let (p2, w2) = VecProvider::new("healthy");
        dispatcher.register_provider(Box::new(p2)).unwrap();

        dispatcher.dispatch(&record("App", LogLevel::Info, "one event"));

        assert_eq!(w2.lock().len(), 1);
        assert_eq!(dispatcher.metrics().provider_faults(), 1);
        assert_eq!(dispatcher.metrics().deliveries(), 1);
    }

    #[test]
    fn test_panicking_sink_does_not_stop_others() {
        struct PanickingSink;
        impl Sink for PanickingSink {
            fn write(&self, _record: &EventRecord) -> Result<()> {
                panic!("sink exploded");
            }
        }
        struct PanickingProvider;
        impl Provider for PanickingProvider {
            fn name(&self) -> &str {
                "panicking"
            }
            fn create_sink(&self, _category: &str) -> Arc<dyn Sink> {
                Arc::new(PanickingSink)
            }
        }

        let dispatcher = Dispatcher::new(LogLevel::Info);
        dispatcher
            .register_provider(Box::new(PanickingProvider))
            .unwrap();
        let (p2, w2) = VecProvider::new("healthy");
        dispatcher.register_provider(Box::new(p2)).unwrap();

        dispatcher.dispatch(&record("App", LogLevel::Info, "one event"));

        assert_eq!(w2.lock().len(), 1);
        assert_eq!(dispatcher.metrics().provider_faults(), 1);
    }

    #[test]
    fn test_is_enabled_requires_a_passing_provider() {
        let dispatcher = Dispatcher::new(LogLevel::Info);
        assert!(
            !dispatcher.is_enabled("App", LogLevel::Critical),
            "no providers registered"
        );

        let (p1, _) = VecProvider::new("one");
        dispatcher.register_provider(Box::new(p1)).unwrap();
        assert!(dispatcher.is_enabled("App", LogLevel::Info));
        assert!(!dispatcher.is_enabled("App", LogLevel::Debug));
    }

    #[test]
    fn test_set_default_level_keeps_rules() {
        let dispatcher = Dispatcher::new(LogLevel::Info);
        let (p1, _) = VecProvider::new("one");
        dispatcher.register_provider(Box::new(p1)).unwrap();
        dispatcher
            .apply_filters(vec![FilterRule::new("Quiet", LogLevel::Error)], None)
            .unwrap();

        dispatcher.set_default_level(LogLevel::Trace);

        assert!(dispatcher.is_enabled("App", LogLevel::Trace));
        assert!(!dispatcher.is_enabled("Quiet", LogLevel::Warn));
    }
}
