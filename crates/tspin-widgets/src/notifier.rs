#![forbid(unsafe_code)]

//! Deferred change notification.
//!
//! A committed value is announced to the host on a later scheduler tick,
//! never inside the call that produced it. Changes made before the pending
//! notification is delivered are coalesced: the host receives one callback
//! carrying the latest value.

use std::time::Duration;

use tspin_core::scheduler::{ScheduleError, Scheduler, TimerToken};

use crate::binding::SpinChange;
use crate::engine::SpinTimer;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
    token: TimerToken,
    value: f64,
}

/// Debounces "value changed" callbacks onto the next scheduler tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeNotifier {
    pending: Option<Pending>,
}

impl ChangeNotifier {
    /// Create an idle notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a notification for `value`.
    ///
    /// If one is already pending its value is replaced and no new timer is
    /// armed.
    pub fn notify<S>(&mut self, value: f64, scheduler: &mut S) -> Result<(), ScheduleError>
    where
        S: Scheduler<SpinTimer>,
    {
        if let Some(pending) = &mut self.pending {
            pending.value = value;
            return Ok(());
        }
        let token = scheduler.after(Duration::ZERO, SpinTimer::Notify)?;
        self.pending = Some(Pending { token, value });
        Ok(())
    }

    /// Claim the change for a fired notification timer.
    ///
    /// Returns `None` for tokens this notifier no longer owns.
    pub fn on_fired(&mut self, token: TimerToken) -> Option<SpinChange> {
        match self.pending {
            Some(pending) if pending.token == token => {
                self.pending = None;
                Some(SpinChange {
                    value: pending.value,
                })
            }
            _ => None,
        }
    }

    /// Drop the pending notification, if any. Returns whether one existed.
    pub fn cancel<S>(&mut self, scheduler: &mut S) -> bool
    where
        S: Scheduler<SpinTimer>,
    {
        match self.pending.take() {
            Some(pending) => {
                scheduler.cancel(pending.token);
                true
            }
            None => false,
        }
    }

    /// Whether a notification is waiting to be delivered.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Value the pending notification will carry.
    #[must_use]
    pub fn pending_value(&self) -> Option<f64> {
        self.pending.map(|pending| pending.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tspin_core::scheduler::VirtualScheduler;

    #[test]
    fn notification_is_deferred() {
        let mut sched = VirtualScheduler::new();
        let mut notifier = ChangeNotifier::new();

        notifier.notify(3.0, &mut sched).unwrap();
        assert!(notifier.is_pending());
        assert_eq!(sched.pending(), 1);

        let fired = sched.pop_due().unwrap();
        assert_eq!(fired.payload, SpinTimer::Notify);
        assert_eq!(notifier.on_fired(fired.token), Some(SpinChange { value: 3.0 }));
        assert!(!notifier.is_pending());
    }

    #[test]
    fn changes_within_a_tick_coalesce() {
        let mut sched = VirtualScheduler::new();
        let mut notifier = ChangeNotifier::new();

        notifier.notify(1.0, &mut sched).unwrap();
        notifier.notify(2.0, &mut sched).unwrap();
        notifier.notify(3.0, &mut sched).unwrap();
        assert_eq!(sched.pending(), 1);
        assert_eq!(notifier.pending_value(), Some(3.0));

        let fired = sched.pop_due().unwrap();
        assert_eq!(notifier.on_fired(fired.token), Some(SpinChange { value: 3.0 }));
        assert!(sched.pop_due().is_none());
    }

    #[test]
    fn stale_token_is_ignored() {
        let mut sched = VirtualScheduler::new();
        let mut notifier = ChangeNotifier::new();
        let other = sched.after(Duration::ZERO, SpinTimer::Notify).unwrap();

        notifier.notify(1.0, &mut sched).unwrap();
        assert_eq!(notifier.on_fired(other), None);
        assert!(notifier.is_pending());
    }

    #[test]
    fn cancel_disarms_timer() {
        let mut sched = VirtualScheduler::new();
        let mut notifier = ChangeNotifier::new();

        notifier.notify(1.0, &mut sched).unwrap();
        assert!(notifier.cancel(&mut sched));
        assert!(!notifier.cancel(&mut sched));
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn schedule_failure_propagates() {
        let mut sched = VirtualScheduler::new();
        sched.close();
        let mut notifier = ChangeNotifier::new();
        assert_eq!(notifier.notify(1.0, &mut sched), Err(ScheduleError::Closed));
        assert!(!notifier.is_pending());
    }
}
