//! Property-based invariant tests for the value model and the spin engine.
//!
//! Value model (1–5):
//! 1. `step` output stays within `[min, max]` for any current value and delta.
//! 2. `format(clamp_and_round(x))` validates back to the same number,
//!    even when the bounds carry more digits than `decimals`.
//! 3. `clamp_and_round` is idempotent.
//! 4. `resolve_on_blur` is in range for arbitrary text.
//! 5. Formatted text has exactly `decimals` fractional digits.
//!
//! Control (6–8):
//! 6. Arbitrary event sequences keep the committed value in range, and the
//!    host only ever receives the number the field displays.
//! 7. A tap shorter than the hold delay steps exactly once.
//! 8. Disposal leaves no timer armed.

use std::time::Duration;

use proptest::prelude::*;
use tspin_core::event::{Event, KeyCode, KeyEvent, PointerEvent, SpinButton, WheelDirection};
use tspin_core::scheduler::{Scheduler, VirtualScheduler};
use tspin_widgets::binding::MemoryBinding;
use tspin_widgets::config::{SpinConfig, SpinOptions, MAX_DECIMALS};
use tspin_widgets::engine::SpinTimer;
use tspin_widgets::touchspin::TouchSpin;
use tspin_widgets::value::{TextValue, ValueModel};

// ── Strategies ────────────────────────────────────────────────────────────

/// Any valid configuration, including bounds with more fractional digits
/// than `decimals`.
fn config_strategy() -> impl Strategy<Value = SpinConfig> {
    (
        0..=i64::from(MAX_DECIMALS),
        prop_oneof![-10_000.0f64..=10_000.0, -1.0f64..=1.0],
        prop_oneof![0.0f64..=10_000.0, 0.0f64..=0.5, Just(0.0)],
        prop_oneof![0.001f64..=100.0, Just(1.0)],
    )
        .prop_filter_map("no value at this precision", |(decimals, lo, span, step)| {
            SpinOptions::standard()
                .decimals(decimals)
                .min(lo)
                .max(lo + span)
                .step(step)
                .resolve()
                .ok()
        })
}

fn raw_value() -> impl Strategy<Value = f64> {
    prop_oneof![
        -1.0e12f64..=1.0e12,
        -1_000.0f64..=1_000.0,
        Just(0.0),
        Just(-0.0),
    ]
}

#[derive(Debug, Clone)]
enum Op {
    Press(SpinButton),
    Release,
    Key(KeyCode),
    Wheel(WheelDirection),
    Focus(bool),
    Input(String),
    Advance(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop_oneof![Just(SpinButton::Up), Just(SpinButton::Down)].prop_map(Op::Press),
        Just(Op::Release),
        prop_oneof![Just(KeyCode::Up), Just(KeyCode::Down)].prop_map(Op::Key),
        prop_oneof![Just(WheelDirection::Up), Just(WheelDirection::Down)].prop_map(Op::Wheel),
        any::<bool>().prop_map(Op::Focus),
        "[-0-9.a]{0,6}".prop_map(Op::Input),
        (0u64..=1_500).prop_map(Op::Advance),
    ]
}

fn event_for(op: &Op) -> Option<Event> {
    match op {
        Op::Press(button) => Some(Event::Pointer(PointerEvent::Down(*button))),
        Op::Release => Some(Event::Pointer(PointerEvent::Up)),
        Op::Key(code) => Some(Event::Key(KeyEvent::new(*code))),
        Op::Wheel(direction) => Some(Event::Wheel(*direction)),
        Op::Focus(focused) => Some(Event::Focus(*focused)),
        Op::Input(text) => Some(Event::Input(text.clone())),
        Op::Advance(_) => None,
    }
}

// ═════════════════════════════════════════════════════════════════════════
// VALUE MODEL INVARIANTS
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn step_saturates_within_bounds(
        config in config_strategy(),
        current in raw_value(),
        delta in raw_value(),
    ) {
        let model = ValueModel::new(config.clone());
        let next = model.step(current, delta);
        prop_assert!(
            (config.min()..=config.max()).contains(&next),
            "{} not in [{}, {}]", next, config.min(), config.max()
        );
    }

    #[test]
    fn format_round_trips_through_validation(
        config in config_strategy(),
        raw in raw_value(),
    ) {
        let model = ValueModel::new(config);
        let value = model.clamp_and_round(raw);
        let text = model.format(value);
        prop_assert_eq!(model.validate_text(&text), TextValue::Valid(value), "text {}", text);
    }

    #[test]
    fn clamp_and_round_is_idempotent(
        config in config_strategy(),
        raw in raw_value(),
    ) {
        let model = ValueModel::new(config);
        let once = model.clamp_and_round(raw);
        prop_assert_eq!(model.clamp_and_round(once), once);
    }

    #[test]
    fn blur_resolution_is_in_range(
        config in config_strategy(),
        text in "\\PC{0,12}",
        previous in "[-0-9.]{0,6}",
    ) {
        let model = ValueModel::new(config.clone());
        let value = model.resolve_on_blur(&text, &previous);
        prop_assert!((config.min()..=config.max()).contains(&value));
    }

    #[test]
    fn formatted_text_has_exact_decimals(
        config in config_strategy(),
        raw in raw_value(),
    ) {
        let model = ValueModel::new(config.clone());
        let text = model.format(model.clamp_and_round(raw));
        let fractional = text.split_once('.').map_or(0, |(_, frac)| frac.len());
        prop_assert_eq!(fractional, config.decimals() as usize);
        // A minus sign only ever precedes a non-zero digit somewhere.
        prop_assert!(!text.starts_with('-') || text.bytes().any(|b| (b'1'..=b'9').contains(&b)));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// CONTROL INVARIANTS
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn event_sequences_keep_value_in_range(
        config in config_strategy(),
        ops in proptest::collection::vec(op_strategy(), 1..=40),
    ) {
        let binding = MemoryBinding::new();
        let model = ValueModel::new(config.clone());
        let mut spin = TouchSpin::with_config(
            config.clone(),
            VirtualScheduler::<SpinTimer>::new(),
            binding.clone(),
        );

        for op in &ops {
            match event_for(op) {
                Some(event) => {
                    spin.handle_event(&event).unwrap();
                }
                None => {
                    if let Op::Advance(n) = op {
                        spin.advance(Duration::from_millis(*n)).unwrap();
                    }
                }
            }
            let value = spin.value();
            prop_assert!((config.min()..=config.max()).contains(&value));
            prop_assert_eq!(model.validate_text(&model.format(value)), TextValue::Valid(value));
            if let Some(&last) = binding.log().pushes.last() {
                prop_assert_eq!(last, value, "host holds a value other than the committed one");
            }
        }
        for pushed in binding.log().pushes {
            prop_assert!((config.min()..=config.max()).contains(&pushed));
            prop_assert_eq!(
                model.validate_text(&model.format(pushed)),
                TextValue::Valid(pushed),
                "pushed {} is not the number its text shows", pushed
            );
        }

        spin.dispose();
        prop_assert_eq!(spin.scheduler().pending(), 0);
    }

    #[test]
    fn tap_shorter_than_delay_steps_once(
        delay in 1u64..=2_000,
        interval in 0u64..=500,
        held_fraction in 0.0f64..1.0,
    ) {
        let held = ((delay as f64) * held_fraction) as u64;
        let config = SpinOptions::standard()
            .max(1_000_000.0)
            .step_interval_delay(delay as f64)
            .step_interval(interval as f64)
            .resolve()
            .unwrap();
        let binding = MemoryBinding::new();
        let mut spin =
            TouchSpin::with_config(config, VirtualScheduler::<SpinTimer>::new(), binding.clone());

        spin.handle_event(&Event::Pointer(PointerEvent::Down(SpinButton::Up))).unwrap();
        spin.advance(Duration::from_millis(held)).unwrap();
        spin.handle_event(&Event::Pointer(PointerEvent::Up)).unwrap();
        spin.advance(Duration::from_millis(delay * 4 + 1_000)).unwrap();

        prop_assert_eq!(binding.log().pushes, vec![1.0]);
        prop_assert_eq!(spin.scheduler().pending(), 0);
    }
}
