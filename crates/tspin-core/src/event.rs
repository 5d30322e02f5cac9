#![forbid(unsafe_code)]

//! Canonical input event types for spinner controls.
//!
//! Hosts translate whatever their platform delivers (terminal escape
//! sequences, browser DOM events, GUI toolkit callbacks) into the small
//! [`Event`] vocabulary defined here. Controls never see platform-specific
//! fields: wheel deltas arrive already reduced to a [`WheelDirection`],
//! and pointer events arrive already hit-tested against a [`SpinButton`].
//!
//! # Design Notes
//!
//! - `KeyEventKind` defaults to `Press` when the platform cannot report it
//! - `SpinButton` names the *physical* button role; whether the `Up` button
//!   increases or decreases the value is decided by the control's
//!   configuration, not here
//! - Two decoders live in this module: [`Event::from_crossterm`] for
//!   terminals and [`WheelDirection::from_legacy_delta`] for browser-style
//!   wheel payloads

use bitflags::bitflags;
#[cfg(not(target_arch = "wasm32"))]
use crossterm::event as cte;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// A pointer (mouse or touch) event on one of the trigger buttons.
    Pointer(PointerEvent),

    /// A wheel gesture, normalized to a direction.
    Wheel(WheelDirection),

    /// Focus gained or lost.
    ///
    /// `true` = focus gained, `false` = focus lost (blur).
    Focus(bool),

    /// The user committed the typed text (for example by pressing Enter).
    Commit,

    /// The host text field changed; carries the raw, unvalidated text.
    Input(String),
}

impl Event {
    /// Convert a Crossterm event into an [`Event`].
    ///
    /// `hit_test` maps a terminal cell `(column, row)` to the trigger button
    /// drawn there, if any. Events with no meaning for a spinner (resize,
    /// paste, plain mouse motion) map to `None`.
    #[must_use]
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_crossterm<F>(event: cte::Event, hit_test: F) -> Option<Self>
    where
        F: Fn(u16, u16) -> Option<SpinButton>,
    {
        map_crossterm_event_internal(event, hit_test)
    }
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Shorthand for a key release.
    #[must_use]
    pub const fn release(code: KeyCode) -> Self {
        Self::new(code).with_kind(KeyEventKind::Release)
    }

    /// Whether this is one of the two vertical arrow keys.
    #[must_use]
    pub const fn is_vertical_arrow(&self) -> bool {
        matches!(self.code, KeyCode::Up | KeyCode::Down)
    }
}

/// Key codes for keyboard events.
///
/// Only the keys a spinner reacts to get their own variant; everything
/// else a platform reports is carried as [`KeyCode::Char`] or dropped by
/// the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Tab key.
    Tab,

    /// Backspace key.
    Backspace,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,

    /// Page Up key.
    PageUp,

    /// Page Down key.
    PageDown,
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (platform auto-repeat).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// One of the two trigger buttons of a spinner.
///
/// This is the button's *position*, not its effect: with vertically
/// stacked buttons the control may map `Up` to a decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpinButton {
    /// The button drawn as "up" / "+".
    Up,

    /// The button drawn as "down" / "-".
    Down,
}

/// A pointer (mouse or touch) event, already hit-tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEvent {
    /// Pointer pressed on a trigger button.
    Down(SpinButton),

    /// Pointer released (anywhere).
    Up,

    /// Pointer left the pressed button while still held.
    Leave,
}

/// Wheel gesture reduced to a single direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WheelDirection {
    /// Wheel rolled away from the user.
    Up,

    /// Wheel rolled toward the user.
    Down,
}

/// Raw wheel fields as reported by browser-style event payloads.
///
/// Different engines fill different fields, with opposite sign
/// conventions: `wheel_delta` is positive when rolling up, while
/// `wheel_delta_y` and `detail` are positive when rolling down.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LegacyWheelDelta {
    /// `wheelDelta`: positive = up.
    pub wheel_delta: f64,
    /// `wheelDeltaY`: positive = down.
    pub wheel_delta_y: f64,
    /// `detail` (DOMMouseScroll): positive = down.
    pub detail: f64,
}

impl WheelDirection {
    /// Decode legacy wheel fields into a direction.
    ///
    /// The first non-zero field among `wheel_delta`, `-wheel_delta_y`,
    /// `-detail` decides; a negative value means [`WheelDirection::Down`].
    /// Returns `None` when every field is zero or not a number.
    #[must_use]
    pub fn from_legacy_delta(delta: LegacyWheelDelta) -> Option<Self> {
        [delta.wheel_delta, -delta.wheel_delta_y, -delta.detail]
            .into_iter()
            .find(|d| *d != 0.0 && !d.is_nan())
            .map(|d| if d < 0.0 { Self::Down } else { Self::Up })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn map_crossterm_event_internal<F>(event: cte::Event, hit_test: F) -> Option<Event>
where
    F: Fn(u16, u16) -> Option<SpinButton>,
{
    match event {
        cte::Event::Key(key) => map_key_event(key),
        cte::Event::Mouse(mouse) => map_mouse_event(mouse, hit_test),
        cte::Event::FocusGained => Some(Event::Focus(true)),
        cte::Event::FocusLost => Some(Event::Focus(false)),
        cte::Event::Resize(..) | cte::Event::Paste(_) => None,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn map_key_event(event: cte::KeyEvent) -> Option<Event> {
    let kind = map_key_kind(event.kind);
    if event.code == cte::KeyCode::Enter && kind == KeyEventKind::Press {
        return Some(Event::Commit);
    }
    let code = map_key_code(event.code)?;
    Some(Event::Key(KeyEvent {
        code,
        modifiers: map_modifiers(event.modifiers),
        kind,
    }))
}

#[cfg(not(target_arch = "wasm32"))]
fn map_key_kind(kind: cte::KeyEventKind) -> KeyEventKind {
    match kind {
        cte::KeyEventKind::Press => KeyEventKind::Press,
        cte::KeyEventKind::Repeat => KeyEventKind::Repeat,
        cte::KeyEventKind::Release => KeyEventKind::Release,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn map_key_code(code: cte::KeyCode) -> Option<KeyCode> {
    match code {
        cte::KeyCode::Char(c) => Some(KeyCode::Char(c)),
        cte::KeyCode::Enter => Some(KeyCode::Enter),
        cte::KeyCode::Esc => Some(KeyCode::Escape),
        cte::KeyCode::Tab => Some(KeyCode::Tab),
        cte::KeyCode::Backspace => Some(KeyCode::Backspace),
        cte::KeyCode::Up => Some(KeyCode::Up),
        cte::KeyCode::Down => Some(KeyCode::Down),
        cte::KeyCode::Left => Some(KeyCode::Left),
        cte::KeyCode::Right => Some(KeyCode::Right),
        cte::KeyCode::PageUp => Some(KeyCode::PageUp),
        cte::KeyCode::PageDown => Some(KeyCode::PageDown),
        _ => None,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn map_modifiers(modifiers: cte::KeyModifiers) -> Modifiers {
    let mut mapped = Modifiers::NONE;
    if modifiers.contains(cte::KeyModifiers::SHIFT) {
        mapped |= Modifiers::SHIFT;
    }
    if modifiers.contains(cte::KeyModifiers::ALT) {
        mapped |= Modifiers::ALT;
    }
    if modifiers.contains(cte::KeyModifiers::CONTROL) {
        mapped |= Modifiers::CTRL;
    }
    if modifiers.contains(cte::KeyModifiers::SUPER)
        || modifiers.contains(cte::KeyModifiers::HYPER)
        || modifiers.contains(cte::KeyModifiers::META)
    {
        mapped |= Modifiers::SUPER;
    }
    mapped
}

#[cfg(not(target_arch = "wasm32"))]
fn map_mouse_event<F>(event: cte::MouseEvent, hit_test: F) -> Option<Event>
where
    F: Fn(u16, u16) -> Option<SpinButton>,
{
    let hit = || hit_test(event.column, event.row);
    let pointer = match event.kind {
        cte::MouseEventKind::ScrollUp => return Some(Event::Wheel(WheelDirection::Up)),
        cte::MouseEventKind::ScrollDown => return Some(Event::Wheel(WheelDirection::Down)),
        cte::MouseEventKind::Down(cte::MouseButton::Left) => PointerEvent::Down(hit()?),
        cte::MouseEventKind::Up(cte::MouseButton::Left) => PointerEvent::Up,
        // Terminals report no "leave"; a held drag off every button is one.
        cte::MouseEventKind::Drag(cte::MouseButton::Left) if hit().is_none() => {
            PointerEvent::Leave
        }
        _ => return None,
    };
    Some(Event::Pointer(pointer))
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crossterm::event as ct_event;

    fn buttons(col: u16, row: u16) -> Option<SpinButton> {
        match (col, row) {
            (0, 0) => Some(SpinButton::Down),
            (10, 0) => Some(SpinButton::Up),
            _ => None,
        }
    }

    fn mouse(kind: ct_event::MouseEventKind, column: u16, row: u16) -> ct_event::Event {
        ct_event::Event::Mouse(ct_event::MouseEvent {
            kind,
            column,
            row,
            modifiers: ct_event::KeyModifiers::NONE,
        })
    }

    fn key(code: ct_event::KeyCode, kind: ct_event::KeyEventKind) -> ct_event::Event {
        ct_event::Event::Key(ct_event::KeyEvent {
            code,
            modifiers: ct_event::KeyModifiers::NONE,
            kind,
            state: ct_event::KeyEventState::NONE,
        })
    }

    #[test]
    fn key_event_builders() {
        let press = KeyEvent::new(KeyCode::Up);
        assert_eq!(press.kind, KeyEventKind::Press);
        assert!(press.is_vertical_arrow());

        let release = KeyEvent::release(KeyCode::Down);
        assert_eq!(release.kind, KeyEventKind::Release);
        assert!(release.is_vertical_arrow());

        assert!(!KeyEvent::new(KeyCode::Left).is_vertical_arrow());
    }

    #[test]
    fn modifiers_default() {
        assert_eq!(Modifiers::default(), Modifiers::NONE);
        let event = KeyEvent::new(KeyCode::Up).with_modifiers(Modifiers::CTRL | Modifiers::SHIFT);
        assert!(event.modifiers.contains(Modifiers::CTRL));
        assert!(!event.modifiers.contains(Modifiers::ALT));
    }

    // -- Legacy wheel decoding --

    #[test]
    fn legacy_wheel_delta_positive_is_up() {
        let delta = LegacyWheelDelta {
            wheel_delta: 120.0,
            ..Default::default()
        };
        assert_eq!(WheelDirection::from_legacy_delta(delta), Some(WheelDirection::Up));
    }

    #[test]
    fn legacy_wheel_delta_y_is_inverted() {
        let delta = LegacyWheelDelta {
            wheel_delta_y: 120.0,
            ..Default::default()
        };
        assert_eq!(
            WheelDirection::from_legacy_delta(delta),
            Some(WheelDirection::Down)
        );
    }

    #[test]
    fn legacy_detail_is_inverted() {
        let down = LegacyWheelDelta {
            detail: 3.0,
            ..Default::default()
        };
        let up = LegacyWheelDelta {
            detail: -3.0,
            ..Default::default()
        };
        assert_eq!(WheelDirection::from_legacy_delta(down), Some(WheelDirection::Down));
        assert_eq!(WheelDirection::from_legacy_delta(up), Some(WheelDirection::Up));
    }

    #[test]
    fn legacy_first_nonzero_field_wins() {
        let delta = LegacyWheelDelta {
            wheel_delta: -120.0,
            wheel_delta_y: -120.0,
            detail: -3.0,
        };
        assert_eq!(
            WheelDirection::from_legacy_delta(delta),
            Some(WheelDirection::Down)
        );
    }

    #[test]
    fn legacy_all_zero_is_none() {
        assert_eq!(WheelDirection::from_legacy_delta(LegacyWheelDelta::default()), None);
        let nan = LegacyWheelDelta {
            wheel_delta: f64::NAN,
            ..Default::default()
        };
        assert_eq!(WheelDirection::from_legacy_delta(nan), None);
    }

    // -- Crossterm mapping tests --

    #[test]
    fn map_modifiers_super_variants() {
        assert!(map_modifiers(ct_event::KeyModifiers::SUPER).contains(Modifiers::SUPER));
        assert!(map_modifiers(ct_event::KeyModifiers::HYPER).contains(Modifiers::SUPER));
        assert!(map_modifiers(ct_event::KeyModifiers::META).contains(Modifiers::SUPER));
    }

    #[test]
    fn map_arrow_keys_keep_kind() {
        let mapped = Event::from_crossterm(
            key(ct_event::KeyCode::Up, ct_event::KeyEventKind::Repeat),
            buttons,
        );
        assert_eq!(
            mapped,
            Some(Event::Key(
                KeyEvent::new(KeyCode::Up).with_kind(KeyEventKind::Repeat)
            ))
        );

        let released = Event::from_crossterm(
            key(ct_event::KeyCode::Down, ct_event::KeyEventKind::Release),
            buttons,
        );
        assert_eq!(released, Some(Event::Key(KeyEvent::release(KeyCode::Down))));
    }

    #[test]
    fn map_enter_press_is_commit() {
        let mapped = Event::from_crossterm(
            key(ct_event::KeyCode::Enter, ct_event::KeyEventKind::Press),
            buttons,
        );
        assert_eq!(mapped, Some(Event::Commit));
    }

    #[test]
    fn map_unsupported_key_is_none() {
        let mapped = Event::from_crossterm(
            key(ct_event::KeyCode::F(5), ct_event::KeyEventKind::Press),
            buttons,
        );
        assert_eq!(mapped, None);
    }

    #[test]
    fn map_scroll_to_wheel() {
        assert_eq!(
            Event::from_crossterm(mouse(ct_event::MouseEventKind::ScrollUp, 3, 3), buttons),
            Some(Event::Wheel(WheelDirection::Up))
        );
        assert_eq!(
            Event::from_crossterm(mouse(ct_event::MouseEventKind::ScrollDown, 3, 3), buttons),
            Some(Event::Wheel(WheelDirection::Down))
        );
        assert_eq!(
            Event::from_crossterm(mouse(ct_event::MouseEventKind::ScrollLeft, 3, 3), buttons),
            None
        );
    }

    #[test]
    fn map_left_press_on_button() {
        let down = mouse(
            ct_event::MouseEventKind::Down(ct_event::MouseButton::Left),
            10,
            0,
        );
        assert_eq!(
            Event::from_crossterm(down, buttons),
            Some(Event::Pointer(PointerEvent::Down(SpinButton::Up)))
        );
    }

    #[test]
    fn map_left_press_off_button_is_none() {
        let down = mouse(
            ct_event::MouseEventKind::Down(ct_event::MouseButton::Left),
            5,
            0,
        );
        assert_eq!(Event::from_crossterm(down, buttons), None);
    }

    #[test]
    fn map_right_press_is_ignored() {
        let down = mouse(
            ct_event::MouseEventKind::Down(ct_event::MouseButton::Right),
            10,
            0,
        );
        assert_eq!(Event::from_crossterm(down, buttons), None);
    }

    #[test]
    fn map_release_anywhere_is_pointer_up() {
        let up = mouse(
            ct_event::MouseEventKind::Up(ct_event::MouseButton::Left),
            40,
            9,
        );
        assert_eq!(
            Event::from_crossterm(up, buttons),
            Some(Event::Pointer(PointerEvent::Up))
        );
    }

    #[test]
    fn map_drag_off_button_is_leave() {
        let on = mouse(
            ct_event::MouseEventKind::Drag(ct_event::MouseButton::Left),
            0,
            0,
        );
        let off = mouse(
            ct_event::MouseEventKind::Drag(ct_event::MouseButton::Left),
            4,
            2,
        );
        assert_eq!(Event::from_crossterm(on, buttons), None);
        assert_eq!(
            Event::from_crossterm(off, buttons),
            Some(Event::Pointer(PointerEvent::Leave))
        );
    }

    #[test]
    fn map_focus_and_ignored_events() {
        assert_eq!(
            Event::from_crossterm(ct_event::Event::FocusGained, buttons),
            Some(Event::Focus(true))
        );
        assert_eq!(
            Event::from_crossterm(ct_event::Event::FocusLost, buttons),
            Some(Event::Focus(false))
        );
        assert_eq!(
            Event::from_crossterm(ct_event::Event::Resize(80, 24), buttons),
            None
        );
        assert_eq!(
            Event::from_crossterm(ct_event::Event::Paste("12".into()), buttons),
            None
        );
    }
}
