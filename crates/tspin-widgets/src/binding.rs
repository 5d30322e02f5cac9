#![forbid(unsafe_code)]

//! Host value binding.
//!
//! A control is connected to the outside world through a [`Binding`]: the
//! host form or state system it reads its initial value from, pushes
//! committed values to, and optionally receives change callbacks through.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Payload of a change callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinChange {
    /// The committed numeric value.
    pub value: f64,
}

/// Two-way connection between a control and its host.
pub trait Binding {
    /// The host's current value, or `None` when the host field is empty.
    ///
    /// Read once when the control is constructed.
    fn external_value(&self) -> Option<f64>;

    /// Push a value the user committed.
    ///
    /// Never called for values that came from the host itself.
    fn set_external_value(&mut self, value: f64);

    /// Deferred change notification. The default ignores it.
    fn on_change(&mut self, change: SpinChange) {
        let _ = change;
    }
}

/// A binding to nothing: starts empty, discards pushes and notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetachedBinding;

impl Binding for DetachedBinding {
    fn external_value(&self) -> Option<f64> {
        None
    }

    fn set_external_value(&mut self, _value: f64) {}
}

/// Everything a [`MemoryBinding`] has seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingLog {
    /// Current host-side value.
    pub value: Option<f64>,
    /// Every value the control pushed, in order.
    pub pushes: Vec<f64>,
    /// Every change notification delivered, in order.
    pub changes: Vec<SpinChange>,
}

type ChangeCallback = Box<dyn FnMut(SpinChange)>;

struct Shared {
    log: BindingLog,
    on_change: Option<ChangeCallback>,
}

/// In-memory host binding with a cloneable handle.
///
/// The control owns one clone; the host keeps another to inspect what the
/// control pushed and to pre-seed the initial value.
///
/// # Example
///
/// ```rust
/// use tspin_widgets::binding::{Binding, MemoryBinding};
///
/// let binding = MemoryBinding::with_value(7.0);
/// let mut control_side = binding.clone();
/// control_side.set_external_value(8.0);
/// assert_eq!(binding.value(), Some(8.0));
/// assert_eq!(binding.log().pushes, vec![8.0]);
/// ```
#[derive(Clone)]
pub struct MemoryBinding {
    shared: Rc<RefCell<Shared>>,
}

impl MemoryBinding {
    /// An empty binding.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                log: BindingLog::default(),
                on_change: None,
            })),
        }
    }

    /// A binding whose host value starts as `value`.
    #[must_use]
    pub fn with_value(value: f64) -> Self {
        let binding = Self::new();
        binding.shared.borrow_mut().log.value = Some(value);
        binding
    }

    /// Register the host's change callback, replacing any previous one.
    #[must_use]
    pub fn with_callback<F>(self, callback: F) -> Self
    where
        F: FnMut(SpinChange) + 'static,
    {
        self.shared.borrow_mut().on_change = Some(Box::new(callback));
        self
    }

    /// Current host-side value.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.shared.borrow().log.value
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn log(&self) -> BindingLog {
        self.shared.borrow().log.clone()
    }
}

impl Default for MemoryBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.shared.borrow();
        f.debug_struct("MemoryBinding")
            .field("log", &shared.log)
            .field("has_callback", &shared.on_change.is_some())
            .finish()
    }
}

impl Binding for MemoryBinding {
    fn external_value(&self) -> Option<f64> {
        self.value()
    }

    fn set_external_value(&mut self, value: f64) {
        let mut shared = self.shared.borrow_mut();
        shared.log.value = Some(value);
        shared.log.pushes.push(value);
    }

    fn on_change(&mut self, change: SpinChange) {
        // Take the callback out so it may freely inspect this binding.
        let callback = {
            let mut shared = self.shared.borrow_mut();
            shared.log.changes.push(change);
            shared.on_change.take()
        };
        if let Some(mut callback) = callback {
            callback(change);
            let mut shared = self.shared.borrow_mut();
            if shared.on_change.is_none() {
                shared.on_change = Some(callback);
            }
        }
    }
}
