//! Provider implementations

pub mod memory;

#[cfg(feature = "console")]
pub mod console;

pub use memory::{CapturedScope, MemoryProvider};

#[cfg(feature = "console")]
pub use console::{ConsoleProvider, TimestampFormat};
