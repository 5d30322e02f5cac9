#![forbid(unsafe_code)]

//! Auto-repeat spin engine.
//!
//! A spin session starts with one immediate step (performed by the caller),
//! then waits `step_interval_delay` before repeating every `step_interval`.
//!
//! # State Machine
//!
//! ```text
//!            start_spin                 stop_spin (repeat phase begun)
//!   Idle ──────────────────▶ Spinning ─────────────────────────────────▶ Idle
//!     ▲                        │
//!     │                        │ stop_spin (still inside the delay)
//!     │                        ▼
//!     └──── GraceCancel ─── Draining
//! ```
//!
//! # Grace cancel
//!
//! Releasing a trigger before the delay has elapsed does not cancel the
//! session's timers on the spot. A `GraceCancel` timer is armed for the
//! remaining part of the delay and tears the session down when it fires.
//! Because the grace timer is armed after the delay timer and shares its
//! deadline, the delay timer always fires first, and the repeat timer it
//! arms is cancelled before its first tick. A fast tap therefore yields
//! exactly the one immediate step.
//!
//! # Invariants
//!
//! 1. At most one session is alive: either spinning or draining, never both
//! 2. `stop_spin` on an idle engine is a no-op
//! 3. A draining session never produces a step
//! 4. Timers from an older session never act on a newer one

use std::fmt;
use std::time::Duration;

use tspin_core::scheduler::{ScheduleError, Scheduler, TimerToken};
use tspin_core::{debug, trace};

use crate::config::SpinConfig;
use crate::value::SpinDirection;

/// Identifies one spin session for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Raw id.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spin#{}", self.0)
    }
}

/// Payload carried by every timer a control arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpinTimer {
    /// The hold delay of a session elapsed; start repeating.
    RepeatDelay(SessionId),
    /// One auto-repeat tick.
    Repeat(SessionId),
    /// Deferred teardown of a session released during its delay.
    GraceCancel(SessionId),
    /// Deliver the pending change notification.
    Notify,
}

/// A live spin session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinSession {
    id: SessionId,
    direction: SpinDirection,
    started_at: Duration,
    hold_delay: Duration,
    interval: Duration,
    delay_timer: Option<TimerToken>,
    repeat_timer: Option<TimerToken>,
    grace_timer: Option<TimerToken>,
}

impl SpinSession {
    /// Session id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Direction every step of this session takes.
    #[inline]
    #[must_use]
    pub fn direction(&self) -> SpinDirection {
        self.direction
    }

    /// Scheduler time the session started at.
    #[inline]
    #[must_use]
    pub fn started_at(&self) -> Duration {
        self.started_at
    }

    /// Whether the repeat timer is armed.
    #[must_use]
    pub fn is_repeating(&self) -> bool {
        self.repeat_timer.is_some()
    }

    fn cancel_timers<S: Scheduler<SpinTimer>>(&mut self, scheduler: &mut S) {
        for token in [
            self.delay_timer.take(),
            self.repeat_timer.take(),
            self.grace_timer.take(),
        ]
        .into_iter()
        .flatten()
        {
            scheduler.cancel(token);
        }
    }
}

/// Coarse engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No session.
    Idle,
    /// A trigger is held.
    Spinning,
    /// Released during the delay; waiting for the grace cancel.
    Draining,
}

/// How a `stop_spin` call took effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Nothing was spinning.
    Idle,
    /// The repeat phase had begun; all timers were cancelled.
    Immediate,
    /// Released inside the delay; teardown fires after `remaining`.
    GraceCancel {
        /// Time until the grace cancel fires.
        remaining: Duration,
    },
}

/// Drives delayed-start auto-repeat for one control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinEngine {
    hold_delay: Duration,
    interval: Duration,
    active: Option<SpinSession>,
    draining: Option<SpinSession>,
    next_id: u64,
}

impl SpinEngine {
    /// Engine with the timing of `config`.
    #[must_use]
    pub fn new(config: &SpinConfig) -> Self {
        Self {
            hold_delay: config.step_interval_delay(),
            interval: config.step_interval(),
            active: None,
            draining: None,
            next_id: 1,
        }
    }

    /// Adopt the timing of `config` for sessions started from now on.
    pub fn set_timing(&mut self, config: &SpinConfig) {
        self.hold_delay = config.step_interval_delay();
        self.interval = config.step_interval();
    }

    /// Current coarse state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        match (&self.active, &self.draining) {
            (Some(_), _) => EngineState::Spinning,
            (None, Some(_)) => EngineState::Draining,
            (None, None) => EngineState::Idle,
        }
    }

    /// Whether a trigger is currently held.
    #[inline]
    #[must_use]
    pub fn is_spinning(&self) -> bool {
        self.active.is_some()
    }

    /// The held session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&SpinSession> {
        self.active.as_ref()
    }

    /// Begin a session in `direction` and arm its delay timer.
    ///
    /// The caller performs the immediate first step. Callers stop a held
    /// session before starting another; if one is still held its timers are
    /// cancelled and it is replaced. A draining session is torn down at once.
    pub fn start_spin<S>(
        &mut self,
        direction: SpinDirection,
        scheduler: &mut S,
    ) -> Result<SessionId, ScheduleError>
    where
        S: Scheduler<SpinTimer>,
    {
        if let Some(mut replaced) = self.active.take() {
            debug!(session = %replaced.id, "spin replaced while held");
            replaced.cancel_timers(scheduler);
        }
        if let Some(mut draining) = self.draining.take() {
            draining.cancel_timers(scheduler);
        }

        let id = SessionId(self.next_id);
        self.next_id += 1;
        let delay_timer = scheduler.after(self.hold_delay, SpinTimer::RepeatDelay(id))?;
        let started_at = scheduler.now();
        debug!(
            session = %id,
            direction = direction.as_str(),
            delay_ms = self.hold_delay.as_millis() as u64,
            "spin started"
        );
        self.active = Some(SpinSession {
            id,
            direction,
            started_at,
            hold_delay: self.hold_delay,
            interval: self.interval,
            delay_timer: Some(delay_timer),
            repeat_timer: None,
            grace_timer: None,
        });
        Ok(id)
    }

    /// Release the held session.
    ///
    /// Once the repeat phase has begun (`now - started_at > delay`) every
    /// timer is cancelled immediately. Otherwise a grace cancel is armed for
    /// the remaining delay. Calling this while idle does nothing.
    ///
    /// If the grace timer cannot be armed the session is cancelled
    /// immediately before the error is returned.
    pub fn stop_spin<S>(&mut self, scheduler: &mut S) -> Result<StopOutcome, ScheduleError>
    where
        S: Scheduler<SpinTimer>,
    {
        let Some(mut session) = self.active.take() else {
            return Ok(StopOutcome::Idle);
        };
        let elapsed = scheduler.now().saturating_sub(session.started_at);
        if elapsed > session.hold_delay {
            session.cancel_timers(scheduler);
            debug!(session = %session.id, policy = "immediate", "spin stopped");
            return Ok(StopOutcome::Immediate);
        }

        let remaining = session.hold_delay - elapsed;
        match scheduler.after(remaining, SpinTimer::GraceCancel(session.id)) {
            Ok(token) => {
                session.grace_timer = Some(token);
                debug!(
                    session = %session.id,
                    policy = "grace",
                    remaining_ms = remaining.as_millis() as u64,
                    "spin stopped"
                );
                if let Some(mut previous) = self.draining.replace(session) {
                    previous.cancel_timers(scheduler);
                }
                Ok(StopOutcome::GraceCancel { remaining })
            }
            Err(err) => {
                session.cancel_timers(scheduler);
                Err(err)
            }
        }
    }

    /// React to a fired timer.
    ///
    /// Returns the direction to step in for a repeat tick of the held
    /// session. Notification timers and stale tokens yield `None`.
    pub fn on_timer<S>(
        &mut self,
        token: TimerToken,
        timer: SpinTimer,
        scheduler: &mut S,
    ) -> Result<Option<SpinDirection>, ScheduleError>
    where
        S: Scheduler<SpinTimer>,
    {
        match timer {
            SpinTimer::RepeatDelay(id) => {
                let Some(session) = self.session_mut(id) else {
                    return Ok(None);
                };
                if session.delay_timer != Some(token) {
                    return Ok(None);
                }
                session.delay_timer = None;
                let repeat = scheduler.every(session.interval, SpinTimer::Repeat(id))?;
                session.repeat_timer = Some(repeat);
                trace!(session = %id, "repeat phase begun");
                Ok(None)
            }
            SpinTimer::Repeat(id) => match &self.active {
                Some(session) if session.id == id && session.repeat_timer == Some(token) => {
                    trace!(session = %id, direction = session.direction.as_str(), "repeat tick");
                    Ok(Some(session.direction))
                }
                _ => Ok(None),
            },
            SpinTimer::GraceCancel(id) => {
                if let Some(mut session) = self.draining.take_if(|s| s.id == id) {
                    session.grace_timer = None;
                    session.cancel_timers(scheduler);
                    debug!(session = %id, "grace cancel completed");
                }
                Ok(None)
            }
            SpinTimer::Notify => Ok(None),
        }
    }

    /// Cancel every timer of every session. Used on teardown.
    pub fn cancel_all<S: Scheduler<SpinTimer>>(&mut self, scheduler: &mut S) {
        for mut session in [self.active.take(), self.draining.take()]
            .into_iter()
            .flatten()
        {
            session.cancel_timers(scheduler);
        }
    }

    fn session_mut(&mut self, id: SessionId) -> Option<&mut SpinSession> {
        [self.active.as_mut(), self.draining.as_mut()]
            .into_iter()
            .flatten()
            .find(|session| session.id == id)
    }
}
