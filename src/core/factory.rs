//! Logging pipeline lifecycle
//!
//! A `LoggerFactory` owns one complete pipeline: the dispatcher, its
//! providers, and the logger cache. Pipelines are plain values rather than
//! process-wide ambient state, so tests and embedded hosts can run several
//! independently in one process.

use super::config::FilterConfig;
use super::dispatcher::Dispatcher;
use super::error::Result;
use super::filter::FilterRule;
use super::log_level::LogLevel;
use super::logger::Logger;
use super::metrics::DispatchMetrics;
use super::provider::Provider;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

pub struct LoggerFactory {
    dispatcher: Arc<Dispatcher>,
    loggers: RwLock<HashMap<String, Logger>>,
}

impl LoggerFactory {
    /// A factory with no providers and the standard `Info` default level.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_level(LogLevel::Info)
    }

    #[must_use]
    pub fn with_default_level(level: LogLevel) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher::new(level)),
            loggers: RwLock::new(HashMap::new()),
        }
    }

    /// Create a builder for LoggerFactory
    ///
    /// # Example
    /// ```
    /// use rust_log_dispatch::prelude::*;
    ///
    /// let factory = LoggerFactory::builder()
    ///     .default_level(LogLevel::Debug)
    ///     .provider(MemoryProvider::new("memory"))
    ///     .build()
    ///     .unwrap();
    /// ```
    #[must_use]
    pub fn builder() -> LoggerFactoryBuilder {
        LoggerFactoryBuilder::new()
    }

    /// The logger for a category, cached for the lifetime of the factory:
    /// the same category always returns the same handle.
    ///
    /// # Panics
    ///
    /// Panics if `category` is empty or whitespace. This is a contract
    /// violation by the caller, unlike provider faults and filter misses
    /// which are never surfaced.
    pub fn create_logger(&self, category: &str) -> Logger {
        assert!(
            !category.trim().is_empty(),
            "logger category must be a non-empty string"
        );

        if let Some(logger) = self.loggers.read().get(category) {
            return logger.clone();
        }

        let mut loggers = self.loggers.write();
        loggers
            .entry(category.to_string())
            .or_insert_with(|| {
                Logger::new(Arc::from(category), Arc::clone(&self.dispatcher))
            })
            .clone()
    }

    /// Register a provider with the pipeline.
    pub fn add_provider(&self, provider: Box<dyn Provider>) -> Result<()> {
        self.dispatcher.register_provider(provider)
    }

    /// Remove and dispose the named provider. Returns false when not found.
    pub fn remove_provider(&self, name: &str) -> bool {
        self.dispatcher.remove_provider(name)
    }

    /// Replace the active filter rules. On `Err` the previous rules stay.
    pub fn apply_filters(
        &self,
        rules: Vec<FilterRule>,
        default_level: Option<LogLevel>,
    ) -> Result<()> {
        self.dispatcher.apply_filters(rules, default_level)
    }

    /// Replace the active filter rules from a configuration mapping.
    pub fn apply_config(&self, config: &FilterConfig) -> Result<()> {
        self.dispatcher.apply_config(config)
    }

    pub fn set_default_level(&self, level: LogLevel) {
        self.dispatcher.set_default_level(level);
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        self.dispatcher.metrics()
    }

    /// Dispose all providers in registration order and stop the pipeline.
    /// Idempotent; loggers keep working as silent no-ops afterwards.
    pub fn shutdown(&self) {
        self.dispatcher.shutdown();
    }
}

impl Default for LoggerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LoggerFactory {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Builder for constructing a LoggerFactory with a fluent API
///
/// # Example
/// ```
/// use rust_log_dispatch::prelude::*;
///
/// let factory = LoggerFactory::builder()
///     .default_level(LogLevel::Trace)
///     .provider(MemoryProvider::new("memory"))
///     .filters(FilterConfig::new().with_switch("Vendor", "Warning"))
///     .build()
///     .unwrap();
/// ```
pub struct LoggerFactoryBuilder {
    default_level: LogLevel,
    providers: Vec<Box<dyn Provider>>,
    config: Option<FilterConfig>,
}

impl LoggerFactoryBuilder {
    pub fn new() -> Self {
        Self {
            default_level: LogLevel::Info,
            providers: Vec::new(),
            config: None,
        }
    }

    /// Set the fallback minimum level used when no filter rule matches
    #[must_use = "builder methods return a new value"]
    pub fn default_level(mut self, level: LogLevel) -> Self {
        self.default_level = level;
        self
    }

    /// Add a provider
    #[must_use = "builder methods return a new value"]
    pub fn provider<P: Provider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Set the initial filter configuration
    #[must_use = "builder methods return a new value"]
    pub fn filters(mut self, config: FilterConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the factory, registering providers before the filter
    /// configuration is applied so provider-qualified rules validate.
    pub fn build(self) -> Result<LoggerFactory> {
        let factory = LoggerFactory::with_default_level(self.default_level);
        for provider in self.providers {
            factory.add_provider(provider)?;
        }
        if let Some(config) = self.config {
            factory.apply_config(&config)?;
        }
        Ok(factory)
    }
}

impl Default for LoggerFactoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
