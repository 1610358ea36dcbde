//! Dispatch metrics for observability
//!
//! Counters for monitoring pipeline health: how many events were fanned
//! out, how many individual deliveries succeeded, and how often providers
//! faulted or writes arrived after shutdown.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for dispatcher observability
///
/// # Example
///
/// ```
/// use rust_log_dispatch::DispatchMetrics;
///
/// let metrics = DispatchMetrics::new();
/// metrics.record_dispatched();
/// metrics.record_delivery();
/// assert_eq!(metrics.events_dispatched(), 1);
/// assert_eq!(metrics.deliveries(), 1);
/// ```
#[derive(Debug)]
pub struct DispatchMetrics {
    /// Events accepted for fan-out while the dispatcher was active
    events_dispatched: AtomicU64,

    /// Successful per-provider sink writes
    deliveries: AtomicU64,

    /// Sink writes or disposals that errored or panicked
    provider_faults: AtomicU64,

    /// Dispatch calls silently dropped after shutdown
    dropped_after_shutdown: AtomicU64,
}

impl DispatchMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            events_dispatched: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            provider_faults: AtomicU64::new(0),
            dropped_after_shutdown: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn events_dispatched(&self) -> u64 {
        self.events_dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn deliveries(&self) -> u64 {
        self.deliveries.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn provider_faults(&self) -> u64 {
        self.provider_faults.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_after_shutdown(&self) -> u64 {
        self.dropped_after_shutdown.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.events_dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivery(&self) -> u64 {
        self.deliveries.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_provider_fault(&self) -> u64 {
        self.provider_faults.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped_after_shutdown(&self) -> u64 {
        self.dropped_after_shutdown.fetch_add(1, Ordering::Relaxed)
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.events_dispatched.store(0, Ordering::Relaxed);
        self.deliveries.store(0, Ordering::Relaxed);
        self.provider_faults.store(0, Ordering::Relaxed);
        self.dropped_after_shutdown.store(0, Ordering::Relaxed);
    }
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DispatchMetrics {
    /// Create a snapshot of the current counter values
    fn clone(&self) -> Self {
        Self {
            events_dispatched: AtomicU64::new(self.events_dispatched()),
            deliveries: AtomicU64::new(self.deliveries()),
            provider_faults: AtomicU64::new(self.provider_faults()),
            dropped_after_shutdown: AtomicU64::new(self.dropped_after_shutdown()),
        }
    }
}
