#![forbid(unsafe_code)]

//! Numeric value model: validation, clamping, rounding, and formatting.
//!
//! [`ValueModel`] is pure. It holds a [`SpinConfig`] and turns raw numbers
//! and raw text into in-range, rounded values and their display strings.
//! [`ValueState`] is the per-control mutable part: the displayed text, the
//! last text known to be valid, and focus.
//!
//! # Invariants
//!
//! 1. `clamp_and_round` output is always within `[min, max]`
//! 2. `format` output always has exactly `decimals` fractional digits
//! 3. `resolve_on_blur` never fails; malformed text falls back to the last
//!    valid text, then to `min`
//! 4. `format(clamp_and_round(x))` validates back to the same number
//!
//! Bounds with more fractional digits than `decimals` are rounded inward:
//! with `max = 10.556` and two decimals the highest committed value is
//! `10.55`, never a `10.56` that would sit above the bound.

use crate::config::SpinConfig;

/// Classification of a piece of typed text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextValue {
    /// Nothing meaningful was typed (empty or whitespace only).
    Empty,
    /// Text that is not a plain signed decimal number.
    Malformed,
    /// A well-formed number.
    Valid(f64),
}

/// Direction of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpinDirection {
    /// Add `step`.
    Increase,
    /// Subtract `step`.
    Decrease,
}

impl SpinDirection {
    /// The opposite direction.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Increase => Self::Decrease,
            Self::Decrease => Self::Increase,
        }
    }

    /// `+1.0` or `-1.0`.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Increase => 1.0,
            Self::Decrease => -1.0,
        }
    }

    /// Short lowercase name, for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
        }
    }
}

/// Pure numeric logic for one control.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueModel {
    config: SpinConfig,
}

impl ValueModel {
    /// Create a model for `config`.
    #[must_use]
    pub fn new(config: SpinConfig) -> Self {
        Self { config }
    }

    /// The configuration this model enforces.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SpinConfig {
        &self.config
    }

    /// Round `raw` to `decimals` digits (half away from zero), then clamp
    /// into `[min, max]`.
    ///
    /// The result is exactly the number its [`format`](Self::format)ted
    /// text parses back to. NaN is treated as `min`.
    #[must_use]
    pub fn clamp_and_round(&self, raw: f64) -> f64 {
        if raw.is_nan() {
            return self.config.lowest_value();
        }
        let decimals = self.config.decimals();
        let rounded = round_to(raw, decimals)
            .clamp(self.config.lowest_value(), self.config.highest_value());
        canonical(rounded, decimals)
    }

    /// Classify typed text.
    ///
    /// Accepted syntax: an optional leading `-`, then either digits, or
    /// optional digits followed by `.` and at least one digit (`"5"`,
    /// `"-0.25"`, `".5"`). `"5."`, `"+5"`, `"1e3"` and surrounding spaces are
    /// malformed.
    #[must_use]
    pub fn validate_text(&self, text: &str) -> TextValue {
        validate_text(text)
    }

    /// Resolve the text left in the field when it loses focus.
    ///
    /// - empty: the lowest committable value (`min`, rounded inward)
    /// - malformed: the number in `previous_valid_text`, or the lowest
    ///   committable value when that is empty or itself unusable
    /// - valid: [`clamp_and_round`](Self::clamp_and_round) of the number
    #[must_use]
    pub fn resolve_on_blur(&self, text: &str, previous_valid_text: &str) -> f64 {
        match validate_text(text) {
            TextValue::Empty => self.config.lowest_value(),
            TextValue::Malformed => match validate_text(previous_valid_text) {
                TextValue::Valid(previous) => self.clamp_and_round(previous),
                TextValue::Empty | TextValue::Malformed => self.config.lowest_value(),
            },
            TextValue::Valid(value) => self.clamp_and_round(value),
        }
    }

    /// Fixed-point rendering with exactly `decimals` fractional digits.
    ///
    /// Negative zero renders as `0`.
    #[must_use]
    pub fn format(&self, value: f64) -> String {
        let value = if value == 0.0 { 0.0 } else { value };
        format!("{:.*}", self.config.decimals() as usize, value)
    }

    /// `current + delta`, saturating at the bounds.
    #[must_use]
    pub fn step(&self, current: f64, delta: f64) -> f64 {
        let next = current + delta;
        if next.is_nan() {
            return self.config.min();
        }
        next.clamp(self.config.min(), self.config.max())
    }

    /// One step of the configured size in `direction`.
    #[must_use]
    pub fn step_in(&self, current: f64, direction: SpinDirection) -> f64 {
        self.step(current, direction.sign() * self.config.step())
    }
}

/// Scaled magnitude from which every `f64` already sits on the decimal grid
/// and survives a format/parse round trip unchanged.
const EXACT_SCALED: f64 = 9_007_199_254_740_992.0; // 2^53

fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10_f64.powi(decimals as i32);
    let scaled = value * scale;
    if !scaled.is_finite() || scaled.abs() >= EXACT_SCALED {
        return value;
    }
    scaled.round() / scale
}

/// The number that `value` rendered with `decimals` digits parses back to.
fn canonical(value: f64, decimals: u32) -> f64 {
    let parsed = format!("{:.*}", decimals as usize, value)
        .parse::<f64>()
        .unwrap_or(value);
    // Normalizes -0.0.
    parsed + 0.0
}

/// Smallest committable value at `decimals` digits that is not below `min`.
pub(crate) fn grid_ceil(min: f64, decimals: u32) -> f64 {
    let scale = 10_f64.powi(decimals as i32);
    let scaled = min * scale;
    if !scaled.is_finite() || scaled.abs() >= EXACT_SCALED {
        return canonical(min, decimals);
    }
    let mut units = scaled.floor() - 1.0;
    loop {
        let candidate = canonical(units / scale, decimals);
        if candidate >= min {
            return candidate;
        }
        units += 1.0;
    }
}

/// Largest committable value at `decimals` digits that is not above `max`.
pub(crate) fn grid_floor(max: f64, decimals: u32) -> f64 {
    let scale = 10_f64.powi(decimals as i32);
    let scaled = max * scale;
    if !scaled.is_finite() || scaled.abs() >= EXACT_SCALED {
        return canonical(max, decimals);
    }
    let mut units = scaled.ceil() + 1.0;
    loop {
        let candidate = canonical(units / scale, decimals);
        if candidate <= max {
            return candidate;
        }
        units -= 1.0;
    }
}

fn validate_text(text: &str) -> TextValue {
    if text.trim().is_empty() {
        return TextValue::Empty;
    }
    if !is_signed_decimal(text) {
        return TextValue::Malformed;
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => TextValue::Valid(value),
        _ => TextValue::Malformed,
    }
}

fn is_signed_decimal(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    match frac_part {
        None => !int_part.is_empty() && all_digits(int_part),
        Some(frac) => !frac.is_empty() && all_digits(frac) && all_digits(int_part),
    }
}

/// Mutable per-control value state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueState {
    /// Text shown in the field; authoritative while the user types.
    pub current_text: String,
    /// Last committed text, used when the typed text is malformed.
    pub previous_valid_text: String,
    /// Whether the field has focus (gates wheel input).
    pub is_focused: bool,
}

impl ValueState {
    /// State displaying `text` as the committed value.
    #[must_use]
    pub fn committed(text: String) -> Self {
        Self {
            previous_valid_text: text.clone(),
            current_text: text,
            is_focused: false,
        }
    }

    /// Whether the field holds uncommitted edits.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.current_text != self.previous_valid_text
    }
}
