#![forbid(unsafe_code)]

//! tspin public facade crate.
//!
//! This crate provides the stable surface area for hosts embedding a numeric
//! spinner. It re-exports the common types from the internal crates and
//! offers a lightweight prelude.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use tspin_core::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, LegacyWheelDelta, Modifiers, PointerEvent,
    SpinButton, WheelDirection,
};
#[cfg(not(target_arch = "wasm32"))]
pub use tspin_core::event_source::CrosstermEventSource;
pub use tspin_core::event_source::{EventSource, QueueEventSource};
pub use tspin_core::scheduler::{
    Fired, MonotonicScheduler, ScheduleError, Scheduler, TimerToken, VirtualScheduler,
};

// --- Widget re-exports -----------------------------------------------------

pub use tspin_widgets::{
    Binding, ConfigError, DetachedBinding, MemoryBinding, SpinChange, SpinConfig, SpinDirection,
    SpinError, SpinOptions, SpinTimer, StopOutcome, TouchSpin,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for tspin hosts.
#[derive(Debug)]
pub enum Error {
    /// I/O failure while reading input or drawing.
    Io(std::io::Error),
    /// The control rejected its configuration or could not arm a timer.
    Spin(SpinError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Spin(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Spin(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<SpinError> for Error {
    fn from(err: SpinError) -> Self {
        Self::Spin(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Spin(SpinError::Config(err))
    }
}

/// Standard result type for tspin hosts.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Binding, Error, Event, EventSource, KeyCode, KeyEvent, MemoryBinding, Result, Scheduler,
        SpinButton, SpinDirection, SpinOptions, TouchSpin, VirtualScheduler,
    };

    pub use crate::{core, widgets};
}

pub use tspin_core as core;
pub use tspin_widgets as widgets;
