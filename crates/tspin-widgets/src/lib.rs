#![forbid(unsafe_code)]

//! Numeric spinner control.
//!
//! Layered leaf first:
//!
//! - [`value`]: clamping, rounding, formatting, and text validation
//! - [`notifier`]: deferred, coalesced change notification
//! - [`engine`]: delayed-start auto-repeat with grace cancellation
//! - [`adapter`]: normalized events to control intents
//! - [`touchspin`]: the control that owns all of the above
//!
//! Hosts connect through [`binding::Binding`] and drive time through a
//! [`tspin_core::scheduler::Scheduler`].

pub mod adapter;
pub mod binding;
pub mod config;
pub mod engine;
pub mod error;
pub mod notifier;
pub mod touchspin;
pub mod value;

pub use adapter::{InputAdapter, Intent, StepSource};
pub use binding::{Binding, DetachedBinding, MemoryBinding, SpinChange};
pub use config::{SpinConfig, SpinOptions};
pub use engine::{EngineState, SessionId, SpinEngine, SpinTimer, StopOutcome};
pub use error::{ConfigError, SpinError};
pub use notifier::ChangeNotifier;
pub use touchspin::TouchSpin;
pub use value::{SpinDirection, TextValue, ValueModel, ValueState};
