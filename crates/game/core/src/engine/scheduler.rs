//! Tick-driven task scheduler.
//!
//! Deferred work is stored as plain data and handed back by [`Scheduler::due`]
//! for the caller to run. Nothing executes inside the scheduler, so a task
//! body can freely schedule or cancel other tasks.
use std::collections::{BTreeMap, BTreeSet};

use crate::state::Tick;

/// Cancelable handle returned for every scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskHandle(u64);

#[derive(Clone, Copy, Debug)]
struct Entry<T> {
    due: Tick,
    period: Option<u64>,
    task: T,
}

#[derive(Clone, Debug)]
pub struct Scheduler<T> {
    next_handle: u64,
    entries: BTreeMap<TaskHandle, Entry<T>>,
    queue: BTreeSet<(Tick, TaskHandle)>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            next_handle: 0,
            entries: BTreeMap::new(),
            queue: BTreeSet::new(),
        }
    }
}

impl<T: Copy> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `task` once, `after` ticks from `now`.
    pub fn schedule(&mut self, now: Tick, after: u64, task: T) -> TaskHandle {
        self.insert(now + after, None, task)
    }

    /// Runs `task` every `every` ticks, first at `now + every`.
    pub fn schedule_periodic(&mut self, now: Tick, every: u64, task: T) -> TaskHandle {
        let every = every.max(1);
        self.insert(now + every, Some(every), task)
    }

    /// Returns `false` when the handle already fired (one-shot) or was
    /// canceled before.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.entries.remove(&handle) {
            Some(entry) => {
                self.queue.remove(&(entry.due, handle));
                true
            }
            None => false,
        }
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Drains every task due at or before `now`, in due order.
    ///
    /// One-shot tasks are forgotten; periodic tasks are re-armed strictly
    /// after `now` so each fires at most once per drain.
    pub fn due(&mut self, now: Tick) -> Vec<(TaskHandle, T)> {
        let mut fired = Vec::new();
        while let Some(&(due, handle)) = self.queue.first() {
            if due > now {
                break;
            }
            self.queue.pop_first();
            let Some(entry) = self.entries.get_mut(&handle) else {
                continue;
            };
            fired.push((handle, entry.task));
            if let Some(period) = entry.period {
                let next = (due + period).max(now + 1);
                entry.due = next;
                self.queue.insert((next, handle));
            } else {
                self.entries.remove(&handle);
            }
        }
        fired
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.queue.clear();
    }

    fn insert(&mut self, due: Tick, period: Option<u64>, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.insert(handle, Entry { due, period, task });
        self.queue.insert((due, handle));
        handle
    }
}
