//! Poll loop and preview settle timer.
//!
//! Timers are plain data owned by the coordinator and fired from
//! `Coordinator::tick`. At most one poll and one settle timer exist; starting
//! a new one replaces the old in the same step, so a replaced timer can never
//! fire. Deadlines are fixed lazily on the first tick after scheduling.

use std::time::{Duration, Instant};

/// Identifies one scheduled timer. Never reused within a coordinator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// How the poll loop decides the loaded track has finished.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EndPolicy {
    /// Catalog tracks: finished once the position reaches the duration.
    ReachedDuration,
    /// Foreign previews: finished `margin` before the reported end, since
    /// preview streams do not reliably report their end.
    PreviewMargin(Duration),
}

#[derive(Debug)]
struct Scheduled {
    handle: TimerHandle,
    interval: Duration,
    due: Option<Instant>,
}

impl Scheduled {
    /// Arms the deadline on first sight; reports whether it has passed.
    fn is_due(&mut self, now: Instant) -> bool {
        match self.due {
            None => {
                self.due = Some(now + self.interval);
                false
            }
            Some(due) => now >= due,
        }
    }
}

#[derive(Debug, Default)]
pub(super) struct Timers {
    next_id: u64,
    poll: Option<(Scheduled, EndPolicy)>,
    settle: Option<Scheduled>,
}

impl Timers {
    fn next_handle(&mut self) -> TimerHandle {
        self.next_id += 1;
        TimerHandle(self.next_id)
    }

    /// Cancel any running poll and start a new one.
    pub(super) fn start_poll(&mut self, policy: EndPolicy, period: Duration) -> TimerHandle {
        let handle = self.next_handle();
        let previous = self.poll.replace((
            Scheduled {
                handle,
                interval: period,
                due: None,
            },
            policy,
        ));
        if let Some((old, _)) = previous {
            log::debug!("poll {:?} replaced by {handle:?}", old.handle);
        }
        handle
    }

    pub(super) fn schedule_settle(&mut self, delay: Duration) -> TimerHandle {
        let handle = self.next_handle();
        self.settle = Some(Scheduled {
            handle,
            interval: delay,
            due: None,
        });
        handle
    }

    pub(super) fn cancel_all(&mut self) {
        if let Some((old, _)) = self.poll.take() {
            log::debug!("poll {:?} cancelled", old.handle);
        }
        self.settle = None;
    }

    pub(super) fn poll_handle(&self) -> Option<TimerHandle> {
        self.poll.as_ref().map(|(s, _)| s.handle)
    }

    pub(super) fn poll_policy(&self) -> Option<EndPolicy> {
        self.poll.as_ref().map(|(_, p)| *p)
    }

    pub(super) fn settle_pending(&self) -> bool {
        self.settle.is_some()
    }

    /// Take the settle timer if its delay has elapsed.
    pub(super) fn settle_due(&mut self, now: Instant) -> Option<TimerHandle> {
        let settle = self.settle.as_mut()?;
        if !settle.is_due(now) {
            return None;
        }
        self.settle.take().map(|s| s.handle)
    }

    /// Report the poll as due at most once per call and schedule the next run
    /// a full period after `now`, so a late tick never bursts.
    pub(super) fn poll_due(&mut self, now: Instant) -> Option<(TimerHandle, EndPolicy)> {
        let (scheduled, policy) = self.poll.as_mut()?;
        if !scheduled.is_due(now) {
            return None;
        }
        scheduled.due = Some(now + scheduled.interval);
        Some((scheduled.handle, *policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(100);

    #[test]
    fn poll_arms_on_first_tick_and_fires_each_period() {
        let mut timers = Timers::default();
        let t0 = Instant::now();
        let h = timers.start_poll(EndPolicy::ReachedDuration, PERIOD);

        assert_eq!(timers.poll_due(t0), None);
        assert_eq!(timers.poll_due(t0 + Duration::from_millis(50)), None);
        assert_eq!(
            timers.poll_due(t0 + PERIOD),
            Some((h, EndPolicy::ReachedDuration))
        );
        assert_eq!(timers.poll_due(t0 + Duration::from_millis(150)), None);
        assert!(timers.poll_due(t0 + Duration::from_millis(200)).is_some());
    }

    #[test]
    fn late_tick_fires_once_without_catching_up() {
        let mut timers = Timers::default();
        let t0 = Instant::now();
        timers.start_poll(EndPolicy::ReachedDuration, PERIOD);
        timers.poll_due(t0);

        let late = t0 + Duration::from_secs(5);
        assert!(timers.poll_due(late).is_some());
        assert!(timers.poll_due(late).is_none());
    }

    #[test]
    fn restarting_replaces_the_previous_poll() {
        let mut timers = Timers::default();
        let t0 = Instant::now();
        let first = timers.start_poll(EndPolicy::ReachedDuration, PERIOD);
        timers.poll_due(t0);

        let margin = EndPolicy::PreviewMargin(Duration::from_millis(500));
        let second = timers.start_poll(margin, PERIOD);
        assert_ne!(first, second);
        assert_eq!(timers.poll_handle(), Some(second));

        // The new poll re-arms from scratch; the old deadline is gone.
        assert_eq!(timers.poll_due(t0 + PERIOD), None);
        assert_eq!(timers.poll_due(t0 + PERIOD * 2), Some((second, margin)));
    }

    #[test]
    fn cancel_all_drops_poll_and_settle() {
        let mut timers = Timers::default();
        let t0 = Instant::now();
        timers.start_poll(EndPolicy::ReachedDuration, PERIOD);
        timers.schedule_settle(PERIOD);
        timers.cancel_all();

        assert!(timers.poll_handle().is_none());
        assert!(!timers.settle_pending());
        assert!(timers.poll_due(t0 + PERIOD * 10).is_none());
        assert!(timers.settle_due(t0 + PERIOD * 10).is_none());
    }

    #[test]
    fn settle_fires_once_after_delay() {
        let mut timers = Timers::default();
        let t0 = Instant::now();
        let h = timers.schedule_settle(PERIOD);

        assert_eq!(timers.settle_due(t0), None);
        assert_eq!(timers.settle_due(t0 + PERIOD), Some(h));
        assert_eq!(timers.settle_due(t0 + PERIOD * 2), None);
    }
}
