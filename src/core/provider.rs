//! Provider and sink contracts, plus the registry entry bookkeeping

use super::error::Result;
use super::event::EventRecord;
use super::scope::ScopePayload;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Per-category writer created by a provider.
///
/// Sinks own their internal synchronization: the dispatcher may call
/// `write` from many threads at once.
pub trait Sink: Send + Sync {
    fn write(&self, record: &EventRecord) -> Result<()>;

    /// Called when a scope opens in this sink's category. Providers without
    /// scope support ignore this.
    fn begin_scope(&self, _scope: &ScopePayload) {}
}

/// A pluggable logging backend.
///
/// Providers have a stable name (unique within one pipeline), create one
/// sink per category, and are disposed exactly once when removed or when
/// the pipeline shuts down.
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    fn create_sink(&self, category: &str) -> Arc<dyn Sink>;

    /// Release backend resources. Guaranteed to be called at most once per
    /// registration; implementations may still guard internally since the
    /// same object can also be dropped.
    fn dispose(&self) {}
}

/// Registry lifecycle of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ProviderState {
    Registered = 0,
    Active = 1,
    Disposed = 2,
}

impl ProviderState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ProviderState::Registered,
            1 => ProviderState::Active,
            _ => ProviderState::Disposed,
        }
    }
}

/// Registry bookkeeping around a registered provider: its lifecycle state,
/// the per-category sink cache, and the once-only diagnostic flags.
pub(crate) struct ProviderEntry {
    provider: Box<dyn Provider>,
    name: String,
    state: AtomicU8,
    sinks: RwLock<HashMap<String, Arc<dyn Sink>>>,
    fault_reported: AtomicBool,
    disposed_write_reported: AtomicBool,
}

impl ProviderEntry {
    pub(crate) fn new(provider: Box<dyn Provider>) -> Self {
        let name = provider.name().to_string();
        Self {
            provider,
            name,
            state: AtomicU8::new(ProviderState::Registered as u8),
            sinks: RwLock::new(HashMap::new()),
            fault_reported: AtomicBool::new(false),
            disposed_write_reported: AtomicBool::new(false),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn state(&self) -> ProviderState {
        ProviderState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn activate(&self) {
        self.state
            .store(ProviderState::Active as u8, Ordering::Release);
    }

    /// Transition to `Disposed`. Returns false when already disposed, which
    /// makes disposal idempotent for both `remove_provider` and repeated
    /// shutdowns.
    pub(crate) fn begin_dispose(&self) -> bool {
        let previous = self
            .state
            .swap(ProviderState::Disposed as u8, Ordering::AcqRel);
        if previous == ProviderState::Disposed as u8 {
            return false;
        }
        self.sinks.write().clear();
        true
    }

    /// Run the provider's own dispose. Returns false if it panicked.
    pub(crate) fn run_dispose(&self) -> bool {
        catch_unwind(AssertUnwindSafe(|| self.provider.dispose())).is_ok()
    }

    /// The cached sink for a category, created on first use. Returns `None`
    /// once the provider is disposed (the write is silently dropped) or if
    /// sink creation itself panics.
    pub(crate) fn sink_for(&self, category: &str) -> Option<Arc<dyn Sink>> {
        if self.state() == ProviderState::Disposed {
            if !self.disposed_write_reported.swap(true, Ordering::Relaxed) {
                eprintln!(
                    "[DISPATCH WARNING] Provider '{}' received a write after dispose; dropping.",
                    self.name
                );
            }
            return None;
        }

        if let Some(sink) = self.sinks.read().get(category) {
            return Some(Arc::clone(sink));
        }

        let mut sinks = self.sinks.write();
        if let Some(sink) = sinks.get(category) {
            return Some(Arc::clone(sink));
        }

        match catch_unwind(AssertUnwindSafe(|| self.provider.create_sink(category))) {
            Ok(sink) => {
                sinks.insert(category.to_string(), Arc::clone(&sink));
                Some(sink)
            }
            Err(_) => {
                self.report_fault_once("panicked while creating a sink");
                None
            }
        }
    }

    /// Emit the stderr diagnostic for this provider at most once; faults are
    /// still counted individually in the dispatch metrics.
    pub(crate) fn report_fault_once(&self, what: &str) {
        if !self.fault_reported.swap(true, Ordering::Relaxed) {
            eprintln!(
                "[DISPATCH ERROR] Provider '{}' {}. Other providers continue to function.",
                self.name, what
            );
        }
    }
}
