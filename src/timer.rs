//! Virtual-clock timer queue for delayed popover shows.
//!
//! Timers are keyed to the instance they would show and carry an absolute
//! fire time in virtual milliseconds. Cancellation marks the entry and the
//! next sweep drops it, so a leave before the delay elapses reliably wins
//! over the pending show.

use std::collections::VecDeque;

use crate::popover::InstanceId;

#[derive(Debug)]
struct PendingShow {
    /// Monotonic id, used to keep firing order stable among equal deadlines.
    id: u64,
    /// Absolute virtual time at which to fire, in ms.
    fire_at: u64,
    instance: InstanceId,
    cancelled: bool,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: VecDeque<PendingShow>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a show for `instance` at `fire_at`. An instance has at most
    /// one live timer; scheduling again supersedes the earlier one.
    pub fn schedule(&mut self, instance: InstanceId, fire_at: u64) {
        self.cancel(instance);
        self.next_id += 1;
        self.timers.push_back(PendingShow {
            id: self.next_id,
            fire_at,
            instance,
            cancelled: false,
        });
    }

    /// Cancel any pending show for `instance`.
    pub fn cancel(&mut self, instance: InstanceId) {
        for timer in &mut self.timers {
            if timer.instance == instance {
                timer.cancelled = true;
            }
        }
    }

    /// Instances whose timers are due at `now`, ordered by fire time then
    /// scheduling order. Cancelled entries are dropped along the way.
    pub fn take_due(&mut self, now: u64) -> Vec<InstanceId> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.timers.len() {
            if self.timers[i].cancelled {
                self.timers.remove(i);
                continue;
            }
            if self.timers[i].fire_at <= now {
                if let Some(timer) = self.timers.remove(i) {
                    due.push((timer.fire_at, timer.id, timer.instance));
                }
                continue;
            }
            i += 1;
        }
        due.sort_by_key(|(fire_at, id, _)| (*fire_at, *id));
        due.into_iter().map(|(_, _, instance)| instance).collect()
    }

    /// Whether `instance` has a live (un-cancelled) pending show.
    pub fn has_pending(&self, instance: InstanceId) -> bool {
        self.timers
            .iter()
            .any(|t| t.instance == instance && !t.cancelled)
    }

    /// Fire time of the earliest live timer, if any.
    pub fn next_fire_at(&self) -> Option<u64> {
        self.timers
            .iter()
            .filter(|t| !t.cancelled)
            .map(|t| t.fire_at)
            .min()
    }
}
