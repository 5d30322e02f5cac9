#![forbid(unsafe_code)]

//! The spinner control.
//!
//! [`TouchSpin`] owns everything one numeric spinner needs: its value state,
//! spin engine, change notifier, scheduler, and host binding. The host feeds
//! it normalized events and pumps its scheduler; the control calls back into
//! the binding.
//!
//! # Value pipeline
//!
//! Every user-originated change is clamped and rounded, formatted, stored
//! as both the displayed and the last committed text, and then, only if the
//! committed text actually changed, pushed to the binding and announced
//! through a deferred notification. Values set by the host take the same
//! path minus the push and the notification.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use tspin_core::event::{Event, PointerEvent, SpinButton};
//! use tspin_core::scheduler::VirtualScheduler;
//! use tspin_widgets::binding::MemoryBinding;
//! use tspin_widgets::config::SpinOptions;
//! use tspin_widgets::engine::SpinTimer;
//! use tspin_widgets::touchspin::TouchSpin;
//!
//! let binding = MemoryBinding::with_value(5.0);
//! let mut spin = TouchSpin::new(
//!     SpinOptions::standard(),
//!     SpinOptions::new().max(10.0),
//!     VirtualScheduler::<SpinTimer>::new(),
//!     binding.clone(),
//! )
//! .unwrap();
//!
//! spin.handle_event(&Event::Pointer(PointerEvent::Down(SpinButton::Up))).unwrap();
//! assert_eq!(spin.text(), "6");
//!
//! spin.advance(Duration::from_millis(700)).unwrap();
//! spin.handle_event(&Event::Pointer(PointerEvent::Up)).unwrap();
//! assert_eq!(spin.text(), "8");
//! assert_eq!(binding.value(), Some(8.0));
//! ```

use std::time::Duration;

use tspin_core::event::Event;
use tspin_core::scheduler::{Fired, Scheduler, VirtualScheduler};
use tspin_core::{debug, debug_span, trace, warn};

use crate::adapter::{InputAdapter, Intent};
use crate::binding::Binding;
use crate::config::{SpinConfig, SpinOptions};
use crate::engine::{EngineState, SpinEngine, SpinTimer, StopOutcome};
use crate::error::SpinError;
use crate::notifier::ChangeNotifier;
use crate::value::{SpinDirection, TextValue, ValueModel, ValueState};

/// A numeric spinner bound to a host.
#[derive(Debug)]
pub struct TouchSpin<S: Scheduler<SpinTimer>, B: Binding> {
    defaults: SpinOptions,
    overrides: SpinOptions,
    model: ValueModel,
    adapter: InputAdapter,
    state: ValueState,
    engine: SpinEngine,
    notifier: ChangeNotifier,
    scheduler: S,
    binding: B,
    disposed: bool,
}

impl<S: Scheduler<SpinTimer>, B: Binding> TouchSpin<S, B> {
    /// Build a control from host defaults and per-instance overrides.
    ///
    /// Fails with [`SpinError::Config`] when the merged options are
    /// incomplete or invalid. The initial value is read from `binding`
    /// (empty means `min`) and is neither pushed back nor announced.
    pub fn new(
        defaults: SpinOptions,
        overrides: SpinOptions,
        scheduler: S,
        binding: B,
    ) -> Result<Self, SpinError> {
        let config = SpinConfig::merged(&defaults, &overrides)?;
        Ok(Self::build(defaults, overrides, config, scheduler, binding))
    }

    /// Build a control from an already resolved configuration.
    #[must_use]
    pub fn with_config(config: SpinConfig, scheduler: S, binding: B) -> Self {
        Self::build(config.to_options(), SpinOptions::new(), config, scheduler, binding)
    }

    fn build(
        defaults: SpinOptions,
        overrides: SpinOptions,
        config: SpinConfig,
        scheduler: S,
        binding: B,
    ) -> Self {
        let mut spin = Self {
            defaults,
            overrides,
            adapter: InputAdapter::new(&config),
            engine: SpinEngine::new(&config),
            model: ValueModel::new(config),
            state: ValueState::default(),
            notifier: ChangeNotifier::new(),
            scheduler,
            binding,
            disposed: false,
        };
        let initial = spin
            .binding
            .external_value()
            .unwrap_or_else(|| spin.model.config().min());
        spin.store(initial);
        debug!(text = %spin.state.current_text, "touchspin created");
        spin
    }

    // --- Accessors ---

    /// Text currently displayed, including uncommitted edits.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.state.current_text
    }

    /// Last committed value.
    #[must_use]
    pub fn value(&self) -> f64 {
        match self.model.validate_text(&self.state.previous_valid_text) {
            TextValue::Valid(value) => value,
            TextValue::Empty | TextValue::Malformed => self.model.config().lowest_value(),
        }
    }

    /// Value and focus state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &ValueState {
        &self.state
    }

    /// Whether the field has focus.
    #[inline]
    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.state.is_focused
    }

    /// Whether a trigger is held.
    #[inline]
    #[must_use]
    pub fn is_spinning(&self) -> bool {
        self.engine.is_spinning()
    }

    /// Spin engine state, including a pending grace cancel.
    #[must_use]
    pub fn engine_state(&self) -> EngineState {
        self.engine.state()
    }

    /// Effective configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SpinConfig {
        self.model.config()
    }

    /// The owned scheduler.
    #[inline]
    #[must_use]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Mutable access to the owned scheduler.
    #[inline]
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// The host binding.
    #[inline]
    #[must_use]
    pub fn binding(&self) -> &B {
        &self.binding
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // --- Input ---

    /// Apply a normalized input event.
    ///
    /// Returns `true` when the host must suppress the event's default action
    /// (arrow keys, accepted wheel notches). A disposed control ignores
    /// every event.
    pub fn handle_event(&mut self, event: &Event) -> Result<bool, SpinError> {
        let _span = debug_span!("touchspin_event", focused = self.state.is_focused).entered();
        if self.disposed {
            debug!("event ignored by disposed touchspin");
            return Ok(false);
        }
        let intent = self.adapter.translate(event, self.state.is_focused);
        trace!(?intent, "event translated");
        let suppress = intent.suppresses_default();
        match intent {
            Intent::Ignore => {}
            Intent::StartSpin(direction) => self.start_spin(direction)?,
            Intent::StopSpin => {
                self.stop_spin()?;
            }
            Intent::Step { direction, .. } => self.step(direction)?,
            Intent::Focus => self.focus(),
            Intent::Blur => self.blur()?,
            Intent::Commit => self.commit()?,
            Intent::Edit(text) => self.set_text(text),
        }
        Ok(suppress)
    }

    /// Begin a held spin in `direction`.
    ///
    /// The typed text is settled first, then any live session is stopped,
    /// then the new session starts with one immediate step.
    pub fn start_spin(&mut self, direction: SpinDirection) -> Result<(), SpinError> {
        self.settle()?;
        if self.engine.is_spinning() {
            self.engine.stop_spin(&mut self.scheduler)?;
        }
        self.engine.start_spin(direction, &mut self.scheduler)?;
        self.step(direction)
    }

    /// Release the held spin. Idempotent.
    pub fn stop_spin(&mut self) -> Result<StopOutcome, SpinError> {
        Ok(self.engine.stop_spin(&mut self.scheduler)?)
    }

    /// One step from the current value.
    ///
    /// Malformed typed text steps from the last committed value.
    pub fn step(&mut self, direction: SpinDirection) -> Result<(), SpinError> {
        let current = self.current_value();
        let next = self.model.step_in(current, direction);
        self.commit_value(next)
    }

    /// Mark the field focused.
    pub fn focus(&mut self) {
        self.state.is_focused = true;
    }

    /// Drop focus and resolve the typed text.
    pub fn blur(&mut self) -> Result<(), SpinError> {
        self.state.is_focused = false;
        self.settle()
    }

    /// Resolve the typed text, keeping focus.
    pub fn commit(&mut self) -> Result<(), SpinError> {
        self.settle()
    }

    /// Replace the displayed text without validating it.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.state.current_text = text.into();
    }

    /// Host-originated value. Stored like any other value, but never pushed
    /// back to the binding and never announced.
    pub fn set_external_value(&mut self, value: f64) {
        self.store(value);
    }

    /// Replace the per-instance overrides and re-merge them over the host
    /// defaults.
    ///
    /// The committed value is re-clamped and re-rounded as a host set. On
    /// error the control keeps its previous configuration.
    pub fn set_options(&mut self, overrides: SpinOptions) -> Result<(), SpinError> {
        let config = SpinConfig::merged(&self.defaults, &overrides)?;
        let committed = self.value();
        self.overrides = overrides;
        self.adapter = InputAdapter::new(&config);
        self.engine.set_timing(&config);
        self.model = ValueModel::new(config);
        self.store(committed);
        debug!(text = %self.state.current_text, "touchspin options updated");
        Ok(())
    }

    /// The per-instance overrides in effect.
    #[must_use]
    pub fn overrides(&self) -> &SpinOptions {
        &self.overrides
    }

    // --- Timers ---

    /// React to one fired timer.
    pub fn on_timer(&mut self, fired: Fired<SpinTimer>) -> Result<(), SpinError> {
        if self.disposed {
            return Ok(());
        }
        match fired.payload {
            SpinTimer::Notify => {
                if let Some(change) = self.notifier.on_fired(fired.token) {
                    trace!(value = change.value, "change delivered");
                    self.binding.on_change(change);
                }
            }
            timer => {
                let step = self
                    .engine
                    .on_timer(fired.token, timer, &mut self.scheduler)?;
                if let Some(direction) = step {
                    self.step(direction)?;
                }
            }
        }
        Ok(())
    }

    /// Handle every timer that is due now. Returns how many fired.
    pub fn pump(&mut self) -> Result<usize, SpinError> {
        let mut fired_count = 0;
        while let Some(fired) = self.scheduler.pop_due() {
            self.on_timer(fired)?;
            fired_count += 1;
        }
        Ok(fired_count)
    }

    /// Cancel every live timer and pending notification.
    ///
    /// Idempotent. Runs automatically on drop.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.engine.cancel_all(&mut self.scheduler);
        self.notifier.cancel(&mut self.scheduler);
        self.disposed = true;
        debug!("touchspin disposed");
    }

    // --- Value pipeline ---

    /// Value the typed text currently stands for.
    fn current_value(&self) -> f64 {
        self.model
            .resolve_on_blur(&self.state.current_text, &self.state.previous_valid_text)
    }

    fn settle(&mut self) -> Result<(), SpinError> {
        if self.model.validate_text(&self.state.current_text) == TextValue::Malformed {
            warn!(
                text = %self.state.current_text,
                fallback = %self.state.previous_valid_text,
                "malformed input replaced by last valid value"
            );
        }
        let value = self.current_value();
        self.commit_value(value)
    }

    /// Clamp, round, format and store. Returns the stored value and whether
    /// the committed text changed.
    fn store(&mut self, raw: f64) -> (f64, bool) {
        let value = self.model.clamp_and_round(raw);
        let text = self.model.format(value);
        let changed = text != self.state.previous_valid_text;
        self.state.current_text.clone_from(&text);
        self.state.previous_valid_text = text;
        (value, changed)
    }

    fn commit_value(&mut self, raw: f64) -> Result<(), SpinError> {
        let (value, changed) = self.store(raw);
        if !changed {
            return Ok(());
        }
        trace!(value, text = %self.state.current_text, "value changed");
        self.binding.set_external_value(value);
        self.notifier.notify(value, &mut self.scheduler)?;
        Ok(())
    }
}

impl<B: Binding> TouchSpin<VirtualScheduler<SpinTimer>, B> {
    /// Move the virtual clock forward by `dt`, handling every timer that
    /// falls due on the way at its own deadline. Returns how many fired.
    pub fn advance(&mut self, dt: Duration) -> Result<usize, SpinError> {
        let target = self.scheduler.now().saturating_add(dt);
        let mut fired_count = 0;
        while let Some(fired) = self.scheduler.pop_due_until(target) {
            self.on_timer(fired)?;
            fired_count += 1;
        }
        self.scheduler.set_now(target);
        Ok(fired_count)
    }
}

impl<S: Scheduler<SpinTimer>, B: Binding> Drop for TouchSpin<S, B> {
    fn drop(&mut self) {
        self.dispose();
    }
}
