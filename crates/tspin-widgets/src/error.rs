#![forbid(unsafe_code)]

//! Error types for spinner controls.

use std::fmt;

use tspin_core::scheduler::ScheduleError;

/// A host configuration that cannot drive a control.
///
/// Raised while resolving options, before any control exists; a control is
/// never constructed from a partially valid configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required option was absent from both the defaults and overrides.
    MissingField(&'static str),
    /// A numeric option was NaN or infinite.
    NonFinite {
        /// Option name.
        field: &'static str,
    },
    /// `min` is greater than `max`.
    InvertedRange {
        /// Configured lower bound.
        min: f64,
        /// Configured upper bound.
        max: f64,
    },
    /// No number with `decimals` fractional digits lies in `[min, max]`.
    NoValueAtPrecision {
        /// Configured lower bound.
        min: f64,
        /// Configured upper bound.
        max: f64,
        /// Configured precision.
        decimals: u32,
    },
    /// `step` is zero or negative.
    NonPositiveStep(f64),
    /// `decimals` is negative.
    NegativeDecimals(i64),
    /// `decimals` exceeds what an `f64` can represent.
    DecimalsOutOfRange(i64),
    /// An interval option is negative.
    NegativeInterval {
        /// Option name.
        field: &'static str,
        /// Configured value in milliseconds.
        ms: f64,
    },
    /// An interval option does not fit in a [`std::time::Duration`].
    IntervalOutOfRange {
        /// Option name.
        field: &'static str,
        /// Configured value in milliseconds.
        ms: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing spin option `{field}`"),
            Self::NonFinite { field } => write!(f, "spin option `{field}` must be finite"),
            Self::InvertedRange { min, max } => {
                write!(f, "spin range is inverted: min {min} > max {max}")
            }
            Self::NoValueAtPrecision { min, max, decimals } => write!(
                f,
                "spin range {min}..={max} holds no value with {decimals} decimals"
            ),
            Self::NonPositiveStep(step) => write!(f, "spin step must be positive, got {step}"),
            Self::NegativeDecimals(decimals) => {
                write!(f, "spin decimals must not be negative, got {decimals}")
            }
            Self::DecimalsOutOfRange(decimals) => write!(
                f,
                "spin decimals {decimals} exceeds the maximum of {}",
                crate::config::MAX_DECIMALS
            ),
            Self::NegativeInterval { field, ms } => {
                write!(f, "spin option `{field}` must not be negative, got {ms}ms")
            }
            Self::IntervalOutOfRange { field, ms } => {
                write!(f, "spin option `{field}` is out of range: {ms}ms")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failure of a control operation.
#[derive(Debug, Clone, PartialEq)]
pub enum SpinError {
    /// The control's configuration was rejected.
    Config(ConfigError),
    /// A delay, repeat, or notification timer could not be armed.
    Schedule(ScheduleError),
}

impl fmt::Display for SpinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid spin configuration: {err}"),
            Self::Schedule(err) => write!(f, "spin timer scheduling failed: {err}"),
        }
    }
}

impl std::error::Error for SpinError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Schedule(err) => Some(err),
        }
    }
}

impl From<ConfigError> for SpinError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<ScheduleError> for SpinError {
    fn from(err: ScheduleError) -> Self {
        Self::Schedule(err)
    }
}
