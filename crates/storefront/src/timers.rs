//! One-shot deferred UI effects.
//!
//! The cart has exactly two delayed effects: putting an add-to-cart button's
//! label back, and hiding the cart modal once the panel has slid out. They
//! are queued as data on a virtual clock that the host advances from its
//! event loop, which keeps them cancellable and testable without a runtime.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::document::NodeRef;

/// Handle for cancelling a scheduled effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// An effect to apply once its delay has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredEffect {
    /// Put `label` back on a control that was temporarily relabelled.
    RestoreLabel { node: NodeRef, label: String },
    /// Hide the cart modal after the close animation.
    HideModal,
}

/// Queue of pending effects ordered by due time.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    // Ties on due time fire in scheduling order because ids increase.
    pending: BTreeMap<(Duration, TimerId), DeferredEffect>,
}

impl TimerQueue {
    /// An empty queue at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the queue's clock.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Number of effects waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// How long until the next effect is due, if any.
    #[must_use]
    pub fn next_due_in(&self) -> Option<Duration> {
        self.pending
            .keys()
            .next()
            .map(|(due, _)| due.saturating_sub(self.now))
    }

    /// Run `effect` once `delay` has elapsed.
    pub fn schedule(&mut self, delay: Duration, effect: DeferredEffect) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending
            .insert((self.now.saturating_add(delay), id), effect);
        id
    }

    /// Drop a pending effect. Returns `false` if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let key = self.pending.keys().find(|(_, timer)| *timer == id).copied();
        key.is_some_and(|key| self.pending.remove(&key).is_some())
    }

    /// Move the clock forward by `elapsed` and take every effect now due.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<DeferredEffect> {
        self.now = self.now.saturating_add(elapsed);
        let mut due = Vec::new();
        while let Some(entry) = self.pending.first_entry() {
            if entry.key().0 > self.now {
                break;
            }
            due.push(entry.remove());
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restore(raw: u64) -> DeferredEffect {
        DeferredEffect::RestoreLabel {
            node: NodeRef::new(raw),
            label: "Add to Cart".to_string(),
        }
    }

    #[test]
    fn test_effect_fires_after_delay() {
        let mut timers = TimerQueue::new();
        timers.schedule(Duration::from_millis(300), DeferredEffect::HideModal);

        assert!(timers.advance(Duration::from_millis(299)).is_empty());
        assert_eq!(
            timers.advance(Duration::from_millis(1)),
            vec![DeferredEffect::HideModal]
        );
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_effects_fire_in_due_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(Duration::from_millis(1000), restore(1));
        timers.schedule(Duration::from_millis(300), DeferredEffect::HideModal);
        timers.schedule(Duration::from_millis(1000), restore(2));

        assert_eq!(
            timers.advance(Duration::from_secs(5)),
            vec![DeferredEffect::HideModal, restore(1), restore(2)]
        );
    }

    #[test]
    fn test_cancel() {
        let mut timers = TimerQueue::new();
        let id = timers.schedule(Duration::from_millis(300), DeferredEffect::HideModal);

        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(timers.advance(Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn test_overlapping_timers_both_fire() {
        let mut timers = TimerQueue::new();
        timers.schedule(Duration::from_millis(1000), restore(1));
        timers.advance(Duration::from_millis(500));
        timers.schedule(Duration::from_millis(1000), restore(1));

        assert_eq!(timers.advance(Duration::from_millis(500)), vec![restore(1)]);
        assert_eq!(timers.next_due_in(), Some(Duration::from_millis(500)));
        assert_eq!(timers.advance(Duration::from_millis(500)), vec![restore(1)]);
        assert_eq!(timers.now(), Duration::from_millis(1500));
    }
}
