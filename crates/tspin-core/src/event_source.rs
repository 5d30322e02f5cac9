#![forbid(unsafe_code)]

//! Event sources: where normalized [`Event`]s come from.
//!
//! A control never reads platform input itself. The host owns an
//! [`EventSource`], waits on it for at most the time until the next timer
//! deadline, and forwards whatever it yields to the control.

use std::collections::VecDeque;
use std::time::Duration;

use crate::event::Event;
#[cfg(not(target_arch = "wasm32"))]
use crate::event::SpinButton;

/// A source of normalized input events.
pub trait EventSource {
    /// Error produced by the underlying platform.
    type Error;

    /// Wait up to `timeout` for the next event.
    ///
    /// Returns `Ok(None)` on timeout, or when the platform produced an
    /// event that has no spinner meaning.
    fn next_event(&mut self, timeout: Duration) -> Result<Option<Event>, Self::Error>;
}

/// Host-driven event source backed by a queue.
///
/// Used by headless hosts and tests: the host pushes events, the loop pops
/// them. `next_event` never blocks.
#[derive(Debug, Clone, Default)]
pub struct QueueEventSource {
    queue: VecDeque<Event>,
}

impl QueueEventSource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for delivery.
    pub fn push(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no events are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Extend<Event> for QueueEventSource {
    fn extend<I: IntoIterator<Item = Event>>(&mut self, iter: I) {
        self.queue.extend(iter);
    }
}

impl EventSource for QueueEventSource {
    type Error = std::convert::Infallible;

    fn next_event(&mut self, _timeout: Duration) -> Result<Option<Event>, Self::Error> {
        Ok(self.queue.pop_front())
    }
}

/// Terminal event source reading from crossterm.
///
/// `hit_test` maps a cell to the trigger button drawn there; see
/// [`Event::from_crossterm`].
#[cfg(not(target_arch = "wasm32"))]
pub struct CrosstermEventSource<F> {
    hit_test: F,
}

#[cfg(not(target_arch = "wasm32"))]
impl<F> CrosstermEventSource<F>
where
    F: Fn(u16, u16) -> Option<SpinButton>,
{
    /// Create a source using `hit_test` to resolve pointer positions.
    pub fn new(hit_test: F) -> Self {
        Self { hit_test }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl<F> std::fmt::Debug for CrosstermEventSource<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrosstermEventSource").finish_non_exhaustive()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl<F> EventSource for CrosstermEventSource<F>
where
    F: Fn(u16, u16) -> Option<SpinButton>,
{
    type Error = std::io::Error;

    fn next_event(&mut self, timeout: Duration) -> Result<Option<Event>, Self::Error> {
        if !crossterm::event::poll(timeout)? {
            return Ok(None);
        }
        let raw = crossterm::event::read()?;
        Ok(Event::from_crossterm(raw, &self.hit_test))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{KeyCode, KeyEvent, WheelDirection};

    #[test]
    fn queue_source_is_fifo() {
        let mut source = QueueEventSource::new();
        assert!(source.is_empty());

        source.push(Event::Focus(true));
        source.extend([
            Event::Wheel(WheelDirection::Up),
            Event::Key(KeyEvent::new(KeyCode::Down)),
        ]);
        assert_eq!(source.len(), 3);

        let timeout = Duration::from_millis(10);
        assert_eq!(source.next_event(timeout), Ok(Some(Event::Focus(true))));
        assert_eq!(
            source.next_event(timeout),
            Ok(Some(Event::Wheel(WheelDirection::Up)))
        );
        assert_eq!(
            source.next_event(timeout),
            Ok(Some(Event::Key(KeyEvent::new(KeyCode::Down))))
        );
        assert_eq!(source.next_event(timeout), Ok(None));
    }
}
