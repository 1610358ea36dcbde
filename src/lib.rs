//! # Rust Log Dispatch
//!
//! A pluggable structured-logging core: a central dispatcher fans log
//! events out to independently-configured providers, applying hierarchical
//! category/level filtering and carrying nested logical scopes on each
//! event.
//!
//! ## Features
//!
//! - **Pluggable Providers**: any backend implementing the `Provider` and
//!   `Sink` contracts can receive events
//! - **Hierarchical Filtering**: longest-prefix category rules, per
//!   provider, swappable at runtime
//! - **Fault Isolation**: a failing or panicking sink never stalls other
//!   providers or the logging caller
//! - **Nested Scopes**: per-thread logical scopes snapshotted onto every
//!   event

pub mod core;
pub mod macros;
pub mod providers;

pub mod prelude {
    pub use crate::core::{
        DispatchError, DispatchMetrics, Dispatcher, ErrorDetails, EventId, EventRecord,
        FieldValue, FilterConfig, FilterRule, FilterRuleSet, Logger, LoggerFactory,
        LoggerFactoryBuilder, LogLevel, MessageTemplate, NamedArg, Provider, ProviderState,
        Result, ScopeGuard, ScopePayload, Sink,
    };
    pub use crate::providers::MemoryProvider;

    #[cfg(feature = "console")]
    pub use crate::providers::ConsoleProvider;
}

pub use crate::core::{
    DispatchError, DispatchMetrics, Dispatcher, ErrorDetails, EventId, EventRecord, FieldValue,
    FilterConfig, FilterRule, FilterRuleSet, Logger, LoggerFactory, LoggerFactoryBuilder,
    LogLevel, MessageTemplate, NamedArg, Provider, ProviderState, Result, ScopeGuard,
    ScopePayload, Sink,
};
pub use crate::providers::MemoryProvider;

#[cfg(feature = "console")]
pub use crate::providers::ConsoleProvider;
