#![forbid(unsafe_code)]

//! Event → intent mapping.
//!
//! [`InputAdapter`] decides what a normalized [`Event`] means for a spinner
//! without touching any state. The control executes the resulting
//! [`Intent`] and reports [`Intent::suppresses_default`] back to the host.
//!
//! | Event                          | Intent                               |
//! |--------------------------------|--------------------------------------|
//! | `Up`/`Down` press or repeat    | `Step` (default suppressed)          |
//! | `Up`/`Down` release            | `StopSpin`                           |
//! | pointer down on a button       | `StartSpin` (flipped when vertical)  |
//! | pointer up / leave             | `StopSpin`                           |
//! | wheel, enabled and focused     | `Step` (default suppressed)          |
//! | focus gained / lost            | `Focus` / `Blur`                     |
//! | commit                         | `Commit`                             |
//! | input                          | `Edit`                               |

use tspin_core::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, PointerEvent, SpinButton, WheelDirection,
};

use crate::config::SpinConfig;
use crate::value::SpinDirection;

/// What produced a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSource {
    /// An arrow key press or platform key repeat.
    Key,
    /// One wheel notch.
    Wheel,
}

/// The action an event asks the control to take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Nothing to do.
    Ignore,
    /// Begin a held spin.
    StartSpin(SpinDirection),
    /// Release the held spin.
    StopSpin,
    /// One step with no auto-repeat.
    Step {
        /// Step direction.
        direction: SpinDirection,
        /// Originating input.
        source: StepSource,
    },
    /// The field gained focus.
    Focus,
    /// The field lost focus; resolve the typed text.
    Blur,
    /// Resolve the typed text without changing focus.
    Commit,
    /// Replace the typed text.
    Edit(String),
}

impl Intent {
    /// Whether the host must suppress the event's default action.
    #[must_use]
    pub fn suppresses_default(&self) -> bool {
        matches!(self, Self::Step { .. })
    }
}

/// Stateless translator configured from a [`SpinConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputAdapter {
    vertical_buttons: bool,
    mousewheel: bool,
}

impl InputAdapter {
    /// Adapter honoring `config`'s button layout and wheel switch.
    #[must_use]
    pub fn new(config: &SpinConfig) -> Self {
        Self {
            vertical_buttons: config.vertical_buttons(),
            mousewheel: config.mousewheel(),
        }
    }

    /// Translate `event` given whether the control currently has focus.
    #[must_use]
    pub fn translate(&self, event: &Event, focused: bool) -> Intent {
        match event {
            Event::Key(key) => self.translate_key(key),
            Event::Pointer(PointerEvent::Down(button)) => {
                Intent::StartSpin(self.button_direction(*button))
            }
            Event::Pointer(PointerEvent::Up | PointerEvent::Leave) => Intent::StopSpin,
            Event::Wheel(direction) => {
                if !self.mousewheel || !focused {
                    return Intent::Ignore;
                }
                Intent::Step {
                    direction: wheel_direction(*direction),
                    source: StepSource::Wheel,
                }
            }
            Event::Focus(true) => Intent::Focus,
            Event::Focus(false) => Intent::Blur,
            Event::Commit => Intent::Commit,
            Event::Input(text) => Intent::Edit(text.clone()),
        }
    }

    /// Direction a press on `button` spins in.
    ///
    /// With vertical buttons the up button decrements and the down button
    /// increments.
    #[must_use]
    pub fn button_direction(&self, button: SpinButton) -> SpinDirection {
        let direction = match button {
            SpinButton::Up => SpinDirection::Increase,
            SpinButton::Down => SpinDirection::Decrease,
        };
        if self.vertical_buttons {
            direction.reversed()
        } else {
            direction
        }
    }

    fn translate_key(&self, key: &KeyEvent) -> Intent {
        let direction = match key.code {
            KeyCode::Up => SpinDirection::Increase,
            KeyCode::Down => SpinDirection::Decrease,
            _ => return Intent::Ignore,
        };
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => Intent::Step {
                direction,
                source: StepSource::Key,
            },
            KeyEventKind::Release => Intent::StopSpin,
        }
    }
}

fn wheel_direction(direction: WheelDirection) -> SpinDirection {
    match direction {
        WheelDirection::Up => SpinDirection::Increase,
        WheelDirection::Down => SpinDirection::Decrease,
    }
}
