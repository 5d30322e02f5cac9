#![forbid(unsafe_code)]

//! Core: normalized input events, timer scheduling, event sources, and logging.

pub mod event;
pub mod event_source;
pub mod logging;
pub mod scheduler;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, info, trace, warn};
