//! Virtual-clock timers.
//!
//! The engine never reads the wall clock. The host advances time with
//! [`Scheduler::next_due`]/[`Scheduler::advance_to`] from whatever main loop it runs, and every
//! timer can be cancelled through the id returned when it was armed.

use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct Timer<T> {
    id: TimerId,
    task: T,
    repeat_ms: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_seq: u64,
    // Keyed by (due time, arming order) so equal deadlines fire first-armed first.
    queue: BTreeMap<(u64, u64), Timer<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Scheduler {
            now_ms: 0,
            next_seq: 0,
            queue: BTreeMap::new(),
        }
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn schedule_once(&mut self, delay_ms: u64, task: T) -> TimerId {
        self.arm(delay_ms, task, None)
    }

    pub fn schedule_repeating(&mut self, interval_ms: u64, task: T) -> TimerId {
        self.arm(interval_ms, task, Some(interval_ms.max(1)))
    }

    fn arm(&mut self, delay_ms: u64, task: T, repeat_ms: Option<u64>) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = TimerId(seq);
        let due = self.now_ms.saturating_add(delay_ms);
        self.queue.insert(
            (due, seq),
            Timer {
                id,
                task,
                repeat_ms,
            },
        );
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let key = self
            .queue
            .iter()
            .find(|(_, timer)| timer.id == id)
            .map(|(key, _)| *key);
        match key {
            Some(key) => self.queue.remove(&key).is_some(),
            None => false,
        }
    }

    /// Drops every timer whose task matches `predicate`.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.queue.len();
        self.queue.retain(|_, timer| !predicate(&timer.task));
        before - self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Pops the earliest timer due at or before `until_ms`, moving the clock to its deadline.
    ///
    /// Repeating timers are re-armed one interval after the deadline they just hit.
    pub fn next_due(&mut self, until_ms: u64) -> Option<(TimerId, T)> {
        let (&(due, seq), _) = self.queue.first_key_value()?;
        if due > until_ms {
            return None;
        }
        let timer = self.queue.remove(&(due, seq))?;
        self.now_ms = self.now_ms.max(due);
        if let Some(interval) = timer.repeat_ms {
            self.queue.insert(
                (due.saturating_add(interval), seq),
                Timer {
                    id: timer.id,
                    task: timer.task.clone(),
                    repeat_ms: timer.repeat_ms,
                },
            );
        }
        Some((timer.id, timer.task))
    }

    /// Moves the clock forward without firing anything; call after draining [`Self::next_due`].
    pub fn advance_to(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}
