#![forbid(unsafe_code)]

//! Spinner configuration.
//!
//! Hosts describe a control with two layers of [`SpinOptions`]: host-wide
//! defaults and per-instance overrides. [`SpinOptions::overlay`] merges the
//! layers field by field (instance wins) and [`SpinOptions::resolve`]
//! validates the result into an immutable [`SpinConfig`].
//!
//! Resolution fails fast. A field missing from both layers is a
//! [`ConfigError::MissingField`]; this layer never fills gaps on its own.
//! Hosts wanting the stock behavior start from [`SpinOptions::standard`].
//!
//! # Example
//!
//! ```rust
//! use tspin_widgets::config::SpinOptions;
//!
//! let config = SpinOptions::standard()
//!     .overlay(&SpinOptions::new().max(10.0).decimals(1))
//!     .resolve()
//!     .unwrap();
//! assert_eq!(config.max(), 10.0);
//! assert_eq!(config.decimals(), 1);
//! ```

use std::time::Duration;

use crate::error::ConfigError;
use crate::value::{grid_ceil, grid_floor};

/// Highest supported rounding precision.
///
/// An `f64` carries roughly 15 significant decimal digits; beyond that the
/// scaling used for rounding stops being exact.
pub const MAX_DECIMALS: u32 = 15;

/// One layer of spinner options.
///
/// Every field is optional so layers can be merged; intervals are in
/// milliseconds as hosts usually write them.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct SpinOptions {
    /// Lower bound.
    pub min: Option<f64>,
    /// Upper bound.
    pub max: Option<f64>,
    /// Amount added or removed per step.
    pub step: Option<f64>,
    /// Digits kept after the decimal point.
    pub decimals: Option<i64>,
    /// Milliseconds between auto-repeat steps.
    pub step_interval: Option<f64>,
    /// Milliseconds a trigger must be held before auto-repeat starts.
    pub step_interval_delay: Option<f64>,
    /// Buttons are stacked vertically; swaps which button increments.
    pub vertical_buttons: Option<bool>,
    /// Wheel gestures step the value while focused.
    pub mousewheel: Option<bool>,
}

impl SpinOptions {
    /// An empty layer (every field unset).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock host defaults: `0..=100`, step 1, no decimals, 100 ms
    /// repeat after a 500 ms hold, horizontal buttons, wheel enabled.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            min: Some(0.0),
            max: Some(100.0),
            step: Some(1.0),
            decimals: Some(0),
            step_interval: Some(100.0),
            step_interval_delay: Some(500.0),
            vertical_buttons: Some(false),
            mousewheel: Some(true),
        }
    }

    /// Set the lower bound.
    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the upper bound.
    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Set the step size.
    #[must_use]
    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Set the rounding precision.
    #[must_use]
    pub fn decimals(mut self, decimals: i64) -> Self {
        self.decimals = Some(decimals);
        self
    }

    /// Set the repeat interval in milliseconds.
    #[must_use]
    pub fn step_interval(mut self, ms: f64) -> Self {
        self.step_interval = Some(ms);
        self
    }

    /// Set the hold delay before repeating, in milliseconds.
    #[must_use]
    pub fn step_interval_delay(mut self, ms: f64) -> Self {
        self.step_interval_delay = Some(ms);
        self
    }

    /// Enable or disable the vertical button layout.
    #[must_use]
    pub fn vertical_buttons(mut self, vertical: bool) -> Self {
        self.vertical_buttons = Some(vertical);
        self
    }

    /// Enable or disable wheel stepping.
    #[must_use]
    pub fn mousewheel(mut self, enabled: bool) -> Self {
        self.mousewheel = Some(enabled);
        self
    }

    /// Merge `overrides` on top of `self`; set fields in `overrides` win.
    #[must_use]
    pub fn overlay(&self, overrides: &SpinOptions) -> SpinOptions {
        SpinOptions {
            min: overrides.min.or(self.min),
            max: overrides.max.or(self.max),
            step: overrides.step.or(self.step),
            decimals: overrides.decimals.or(self.decimals),
            step_interval: overrides.step_interval.or(self.step_interval),
            step_interval_delay: overrides.step_interval_delay.or(self.step_interval_delay),
            vertical_buttons: overrides.vertical_buttons.or(self.vertical_buttons),
            mousewheel: overrides.mousewheel.or(self.mousewheel),
        }
    }

    /// Validate this layer into a [`SpinConfig`].
    pub fn resolve(&self) -> Result<SpinConfig, ConfigError> {
        let min = finite(required(self.min, "min")?, "min")?;
        let max = finite(required(self.max, "max")?, "max")?;
        if min > max {
            return Err(ConfigError::InvertedRange { min, max });
        }

        let step = finite(required(self.step, "step")?, "step")?;
        if step <= 0.0 {
            return Err(ConfigError::NonPositiveStep(step));
        }

        let decimals = required(self.decimals, "decimals")?;
        if decimals < 0 {
            return Err(ConfigError::NegativeDecimals(decimals));
        }
        let decimals = u32::try_from(decimals)
            .ok()
            .filter(|d| *d <= MAX_DECIMALS)
            .ok_or(ConfigError::DecimalsOutOfRange(decimals))?;

        let lowest = grid_ceil(min, decimals);
        let highest = grid_floor(max, decimals);
        if lowest > highest {
            return Err(ConfigError::NoValueAtPrecision { min, max, decimals });
        }

        let step_interval = interval(self.step_interval, "stepInterval")?;
        let step_interval_delay = interval(self.step_interval_delay, "stepIntervalDelay")?;

        Ok(SpinConfig {
            min,
            max,
            lowest,
            highest,
            step,
            decimals,
            step_interval,
            step_interval_delay,
            vertical_buttons: required(self.vertical_buttons, "verticalButtons")?,
            mousewheel: required(self.mousewheel, "mousewheel")?,
        })
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ConfigError> {
    value.ok_or(ConfigError::MissingField(field))
}

fn finite(value: f64, field: &'static str) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

fn interval(ms: Option<f64>, field: &'static str) -> Result<Duration, ConfigError> {
    let ms = finite(required(ms, field)?, field)?;
    if ms < 0.0 {
        return Err(ConfigError::NegativeInterval { field, ms });
    }
    Duration::try_from_secs_f64(ms / 1000.0)
        .map_err(|_| ConfigError::IntervalOutOfRange { field, ms })
}

fn duration_ms(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}

/// Validated, immutable configuration of one control.
///
/// Invariants: `min <= lowest_value() <= highest_value() <= max`,
/// `step > 0`, `decimals <= MAX_DECIMALS`, all numbers finite.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinConfig {
    min: f64,
    max: f64,
    lowest: f64,
    highest: f64,
    step: f64,
    decimals: u32,
    step_interval: Duration,
    step_interval_delay: Duration,
    vertical_buttons: bool,
    mousewheel: bool,
}

impl SpinConfig {
    /// Overlay `overrides` on `defaults` and resolve.
    pub fn merged(defaults: &SpinOptions, overrides: &SpinOptions) -> Result<Self, ConfigError> {
        defaults.overlay(overrides).resolve()
    }

    /// Lower bound.
    #[inline]
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    #[inline]
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Smallest value representable with `decimals` digits that is not
    /// below `min`.
    #[inline]
    #[must_use]
    pub fn lowest_value(&self) -> f64 {
        self.lowest
    }

    /// Largest value representable with `decimals` digits that is not
    /// above `max`.
    #[inline]
    #[must_use]
    pub fn highest_value(&self) -> f64 {
        self.highest
    }

    /// Step size.
    #[inline]
    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Rounding precision.
    #[inline]
    #[must_use]
    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Period between auto-repeat steps.
    #[inline]
    #[must_use]
    pub fn step_interval(&self) -> Duration {
        self.step_interval
    }

    /// Hold time before auto-repeat starts.
    #[inline]
    #[must_use]
    pub fn step_interval_delay(&self) -> Duration {
        self.step_interval_delay
    }

    /// Whether the buttons are stacked vertically.
    #[inline]
    #[must_use]
    pub fn vertical_buttons(&self) -> bool {
        self.vertical_buttons
    }

    /// Whether wheel gestures step the value.
    #[inline]
    #[must_use]
    pub fn mousewheel(&self) -> bool {
        self.mousewheel
    }

    /// Express this configuration as a fully populated option layer.
    #[must_use]
    pub fn to_options(&self) -> SpinOptions {
        SpinOptions {
            min: Some(self.min),
            max: Some(self.max),
            step: Some(self.step),
            decimals: Some(i64::from(self.decimals)),
            step_interval: Some(duration_ms(self.step_interval)),
            step_interval_delay: Some(duration_ms(self.step_interval_delay)),
            vertical_buttons: Some(self.vertical_buttons),
            mousewheel: Some(self.mousewheel),
        }
    }
}
