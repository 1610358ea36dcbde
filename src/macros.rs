//! Logging macros for ergonomic event writing
//!
//! The macros check whether the level is enabled before evaluating any
//! argument expressions, so a write that every provider filters out costs
//! one filter lookup and nothing else.
//!
//! # Examples
//!
//! ```
//! use rust_log_dispatch::prelude::*;
//! use rust_log_dispatch::info;
//!
//! let factory = LoggerFactory::builder()
//!     .provider(MemoryProvider::new("memory"))
//!     .build()
//!     .unwrap();
//! let logger = factory.create_logger("App");
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With template arguments
//! let port = 8080;
//! info!(logger, "Server listening on {Port}", port);
//! ```

/// Log an event at an explicit level.
///
/// Arguments after the template are bound positionally to its placeholders
/// and are not evaluated unless some provider accepts the level.
///
/// # Examples
///
/// ```
/// # use rust_log_dispatch::prelude::*;
/// # let factory = LoggerFactory::new();
/// # let logger = factory.create_logger("App");
/// use rust_log_dispatch::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {Code}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $template:expr $(, $arg:expr)* $(,)?) => {{
        let level = $level;
        if $logger.enabled(level) {
            $logger.log(
                level,
                $crate::EventId::default(),
                $template,
                vec![$($crate::FieldValue::from($arg)),*],
                None,
            );
        }
    }};
}

/// Log a trace-level event.
///
/// # Examples
///
/// ```
/// # use rust_log_dispatch::prelude::*;
/// # let factory = LoggerFactory::with_default_level(LogLevel::Trace);
/// # let logger = factory.create_logger("App");
/// use rust_log_dispatch::trace;
/// trace!(logger, "Entering {Function}", "calculate");
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($rest)+)
    };
}

/// Log a debug-level event.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($rest)+)
    };
}

/// Log an info-level event.
///
/// # Examples
///
/// ```
/// # use rust_log_dispatch::prelude::*;
/// # let factory = LoggerFactory::new();
/// # let logger = factory.create_logger("App");
/// use rust_log_dispatch::info;
/// info!(logger, "Processing {Count} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($rest)+)
    };
}

/// Log a warning-level event.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($rest)+)
    };
}

/// Log an error-level event.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($rest)+)
    };
}

/// Log a critical-level event.
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($rest)+)
    };
}
