#![forbid(unsafe_code)]

//! Single-threaded timer scheduling.
//!
//! Controls need three timer operations: a one-shot delay, a repeating
//! interval, and cancellation. Instead of storing callbacks, every timer
//! carries a typed payload `T`. When a timer comes due the host hands the
//! [`Fired`] record back to whoever armed it, so no closure ever needs to
//! capture the control it belongs to.
//!
//! # How it works
//!
//! 1. The owner arms a timer with [`Scheduler::after`] or [`Scheduler::every`]
//!    and keeps the returned [`TimerToken`].
//! 2. The host loop calls [`Scheduler::pop_due`] until it returns `None` and
//!    routes each [`Fired`] back to the owner.
//! 3. Repeating timers re-arm themselves by their period; one-shot timers
//!    are forgotten once popped. See [Missed ticks](#missed-ticks) for what
//!    happens when the host falls behind.
//! 4. [`Scheduler::cancel`] is idempotent: cancelling a fired, cancelled, or
//!    unknown token is a no-op that returns `false`.
//!
//! # Ordering
//!
//! Timers fire in deadline order. Timers sharing a deadline fire in the
//! order they were (re-)armed.
//!
//! # Missed ticks
//!
//! [`VirtualScheduler`] catches up: when the clock jumps past several periods
//! of a repeating timer, every missed deadline fires in turn, which keeps
//! simulated runs exact. [`MonotonicScheduler`] skips: after a stalled host
//! loop a repeating timer fires once and re-arms on the next period boundary
//! after the current time, so a late host never sees a burst of repeats.
//!
//! Two implementations are provided: [`VirtualScheduler`] with a manually
//! advanced clock for deterministic hosts and tests, and
//! [`MonotonicScheduler`] backed by [`std::time::Instant`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::{Duration, Instant};

/// Smallest period a repeating timer may have.
///
/// A zero period would re-arm at the same instant forever and starve the
/// host loop, so shorter periods are raised to this.
pub const MIN_REPEAT_PERIOD: Duration = Duration::from_millis(1);

/// Opaque handle to an armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    /// Raw numeric id, for logging.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// A timer that came due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    /// Token returned when the timer was armed.
    pub token: TimerToken,
    /// Scheduled deadline (scheduler time) this firing was due at.
    pub deadline: Duration,
    /// Payload given when the timer was armed.
    pub payload: T,
}

/// Failure to arm a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// `now + delay` does not fit in a [`Duration`].
    DeadlineOverflow {
        /// Scheduler time when arming was attempted.
        now: Duration,
        /// Requested delay or period.
        delay: Duration,
    },
    /// The scheduler was closed and accepts no new timers.
    Closed,
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeadlineOverflow { now, delay } => write!(
                f,
                "timer deadline overflows: now={now:?} delay={delay:?}"
            ),
            Self::Closed => write!(f, "scheduler is closed"),
        }
    }
}

impl std::error::Error for ScheduleError {}

/// Timer capability used by controls.
pub trait Scheduler<T: Clone> {
    /// Current scheduler time, measured from the scheduler's origin.
    fn now(&self) -> Duration;

    /// Arm a one-shot timer firing `delay` from now.
    fn after(&mut self, delay: Duration, payload: T) -> Result<TimerToken, ScheduleError>;

    /// Arm a repeating timer firing every `period`, first at `now + period`.
    fn every(&mut self, period: Duration, payload: T) -> Result<TimerToken, ScheduleError>;

    /// Cancel a timer. Returns `true` if the timer was still armed.
    fn cancel(&mut self, token: TimerToken) -> bool;

    /// Pop the earliest timer whose deadline is at or before [`now`](Self::now).
    fn pop_due(&mut self) -> Option<Fired<T>>;

    /// Deadline of the earliest armed timer, if any.
    fn next_deadline(&self) -> Option<Duration>;

    /// Number of armed timers.
    fn pending(&self) -> usize;
}

// ---------------------------------------------------------------------------
// Timer queue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct TimerEntry<T> {
    key: (Duration, u64),
    period: Option<Duration>,
    payload: T,
}

/// What a repeating timer does with periods that elapsed before it was
/// popped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissedTicks {
    /// Fire once per missed deadline.
    CatchUp,
    /// Fire once, then re-arm on the first period boundary after `now`.
    Skip,
}

/// Deadline-ordered timer storage shared by both schedulers.
#[derive(Debug, Clone)]
struct TimerQueue<T> {
    order: BTreeMap<(Duration, u64), TimerToken>,
    entries: HashMap<TimerToken, TimerEntry<T>>,
    next_token: u64,
    next_seq: u64,
    missed: MissedTicks,
    closed: bool,
}

impl<T: Clone> TimerQueue<T> {
    fn new(missed: MissedTicks) -> Self {
        Self {
            order: BTreeMap::new(),
            entries: HashMap::new(),
            next_token: 1,
            next_seq: 0,
            missed,
            closed: false,
        }
    }

    fn arm(
        &mut self,
        now: Duration,
        delay: Duration,
        period: Option<Duration>,
        payload: T,
    ) -> Result<TimerToken, ScheduleError> {
        if self.closed {
            return Err(ScheduleError::Closed);
        }
        let deadline = now
            .checked_add(delay)
            .ok_or(ScheduleError::DeadlineOverflow { now, delay })?;
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        let key = self.next_key(deadline);
        self.order.insert(key, token);
        self.entries.insert(
            token,
            TimerEntry {
                key,
                period,
                payload,
            },
        );
        Ok(token)
    }

    fn next_key(&mut self, deadline: Duration) -> (Duration, u64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        (deadline, seq)
    }

    fn cancel(&mut self, token: TimerToken) -> bool {
        match self.entries.remove(&token) {
            Some(entry) => {
                self.order.remove(&entry.key);
                true
            }
            None => false,
        }
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.order.keys().next().map(|(deadline, _)| *deadline)
    }

    fn pop_due(&mut self, until: Duration) -> Option<Fired<T>> {
        let (&key, &token) = self.order.iter().next()?;
        if key.0 > until {
            return None;
        }
        self.order.remove(&key);
        let period = self.entries.get(&token)?.period;
        match period {
            Some(period) => {
                // Re-arm relative to the missed deadline so ticks never drift.
                let next = match self.missed {
                    MissedTicks::CatchUp => key.0.saturating_add(period),
                    MissedTicks::Skip => next_boundary_after(key.0, period, until),
                };
                let next_key = self.next_key(next);
                let entry = self.entries.get_mut(&token)?;
                entry.key = next_key;
                self.order.insert(next_key, token);
                Some(Fired {
                    token,
                    deadline: key.0,
                    payload: entry.payload.clone(),
                })
            }
            None => {
                let entry = self.entries.remove(&token)?;
                Some(Fired {
                    token,
                    deadline: key.0,
                    payload: entry.payload,
                })
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// First `deadline + k * period` (`k >= 1`) strictly after `now`.
fn next_boundary_after(deadline: Duration, period: Duration, now: Duration) -> Duration {
    let behind = now.saturating_sub(deadline).as_nanos();
    let periods = behind / period.as_nanos().max(1) + 1;
    let offset = period
        .as_nanos()
        .saturating_mul(periods)
        .min(u128::from(u64::MAX));
    deadline.saturating_add(Duration::from_nanos(offset as u64))
}

// ---------------------------------------------------------------------------
// VirtualScheduler
// ---------------------------------------------------------------------------

/// Scheduler with a manually advanced clock.
///
/// Nothing happens unless the host moves time. Use
/// [`pop_due_until`](VirtualScheduler::pop_due_until) to walk timers one at a
/// time; it moves the clock to each fired deadline so that timers armed by
/// a handler are measured from the instant the handler ran.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tspin_core::scheduler::{Scheduler, VirtualScheduler};
///
/// let mut sched = VirtualScheduler::new();
/// let token = sched.after(Duration::from_millis(500), "delay").unwrap();
/// assert!(sched.pop_due().is_none());
///
/// sched.advance(Duration::from_millis(500));
/// let fired = sched.pop_due().unwrap();
/// assert_eq!(fired.token, token);
/// assert_eq!(fired.payload, "delay");
/// ```
#[derive(Debug, Clone)]
pub struct VirtualScheduler<T> {
    now: Duration,
    queue: TimerQueue<T>,
}

impl<T: Clone> Default for VirtualScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> VirtualScheduler<T> {
    /// Create a scheduler whose clock starts at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            queue: TimerQueue::new(MissedTicks::CatchUp),
        }
    }

    /// Move the clock forward by `dt` without firing anything.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Set the clock. Time never moves backwards; earlier values are ignored.
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Pop the earliest timer due at or before `target`, moving the clock to
    /// its deadline.
    ///
    /// Once this returns `None` the caller should [`set_now`](Self::set_now)
    /// to `target`.
    pub fn pop_due_until(&mut self, target: Duration) -> Option<Fired<T>> {
        let fired = self.queue.pop_due(target)?;
        self.set_now(fired.deadline);
        Some(fired)
    }

    /// Refuse every future `after`/`every` with [`ScheduleError::Closed`].
    ///
    /// Timers already armed stay armed and can still be cancelled.
    pub fn close(&mut self) {
        self.queue.closed = true;
    }

    /// Whether [`close`](Self::close) was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.queue.closed
    }
}

impl<T: Clone> Scheduler<T> for VirtualScheduler<T> {
    fn now(&self) -> Duration {
        self.now
    }

    fn after(&mut self, delay: Duration, payload: T) -> Result<TimerToken, ScheduleError> {
        self.queue.arm(self.now, delay, None, payload)
    }

    fn every(&mut self, period: Duration, payload: T) -> Result<TimerToken, ScheduleError> {
        let period = period.max(MIN_REPEAT_PERIOD);
        self.queue.arm(self.now, period, Some(period), payload)
    }

    fn cancel(&mut self, token: TimerToken) -> bool {
        self.queue.cancel(token)
    }

    fn pop_due(&mut self) -> Option<Fired<T>> {
        self.queue.pop_due(self.now)
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.queue.next_deadline()
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}

// ---------------------------------------------------------------------------
// MonotonicScheduler
// ---------------------------------------------------------------------------

/// Scheduler driven by the wall clock.
///
/// Time is measured from construction. Hosts typically wait on their input
/// source for at most `next_deadline() - now()` and then drain
/// [`pop_due`](Scheduler::pop_due).
#[derive(Debug, Clone)]
pub struct MonotonicScheduler<T> {
    origin: Instant,
    queue: TimerQueue<T>,
}

impl<T: Clone> Default for MonotonicScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> MonotonicScheduler<T> {
    /// Create a scheduler whose origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            queue: TimerQueue::new(MissedTicks::Skip),
        }
    }

    /// Time left until the earliest timer is due, zero if one is overdue.
    #[must_use]
    pub fn time_until_next(&self) -> Option<Duration> {
        self.queue
            .next_deadline()
            .map(|deadline| deadline.saturating_sub(self.now()))
    }
}

impl<T: Clone> Scheduler<T> for MonotonicScheduler<T> {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn after(&mut self, delay: Duration, payload: T) -> Result<TimerToken, ScheduleError> {
        let now = self.now();
        self.queue.arm(now, delay, None, payload)
    }

    fn every(&mut self, period: Duration, payload: T) -> Result<TimerToken, ScheduleError> {
        let now = self.now();
        let period = period.max(MIN_REPEAT_PERIOD);
        self.queue.arm(now, period, Some(period), payload)
    }

    fn cancel(&mut self, token: TimerToken) -> bool {
        self.queue.cancel(token)
    }

    fn pop_due(&mut self) -> Option<Fired<T>> {
        let now = self.now();
        self.queue.pop_due(now)
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.queue.next_deadline()
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
