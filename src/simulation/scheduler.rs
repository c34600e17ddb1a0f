//! Discrete-event scheduler
//!
//! A single-threaded priority queue of pending continuations keyed by
//! `(due, sequence)`. The sequence number is assigned at insertion, so entries
//! due at the same minute run in the order they were scheduled. The clock only
//! moves when an entry is dispatched.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use thiserror::Error;
use tracing::{debug, trace};

use super::time_manager::SimMinutes;

/// Errors raised by the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulingError {
    /// A continuation was scheduled with a negative delay
    #[error("invalid delay: {delay} minutes (must not be negative)")]
    InvalidDelay {
        /// The rejected delay
        delay: i64,
    },

    /// A continuation was scheduled before the current clock
    #[error("cannot schedule at minute {requested}: clock is already at {now}")]
    InPast {
        /// Requested absolute time
        requested: SimMinutes,
        /// Clock at the time of the request
        now: SimMinutes,
    },
}

/// Stopping condition for [`Scheduler::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunUntil {
    /// Stop before dispatching anything due at or after this minute
    Time(SimMinutes),
    /// Run until nothing is pending
    QueueEmpty,
}

/// Outcome of a [`Scheduler::run`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Continuations dispatched during the call
    pub dispatched: u64,
    /// Clock when the call returned
    pub final_time: SimMinutes,
    /// Continuations still pending (abandoned if the run is over)
    pub pending: usize,
}

#[derive(Debug)]
struct ScheduledEntry<P> {
    due: SimMinutes,
    sequence: u64,
    process: P,
}

impl<P> PartialEq for ScheduledEntry<P> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.sequence == other.sequence
    }
}

impl<P> Eq for ScheduledEntry<P> {}

impl<P> PartialOrd for ScheduledEntry<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P> Ord for ScheduledEntry<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.sequence).cmp(&(other.due, other.sequence))
    }
}

/// Priority queue of pending processes and the simulated clock
#[derive(Debug)]
pub struct Scheduler<P> {
    now: SimMinutes,
    next_sequence: u64,
    queue: BinaryHeap<Reverse<ScheduledEntry<P>>>,
}

impl<P> Default for Scheduler<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Scheduler<P> {
    /// Create an empty scheduler at minute 0
    pub fn new() -> Self {
        Self {
            now: 0,
            next_sequence: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// Current simulated time
    pub fn now(&self) -> SimMinutes {
        self.now
    }

    /// Number of pending continuations
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Due time of the earliest pending continuation
    pub fn peek_due(&self) -> Option<SimMinutes> {
        self.queue.peek().map(|Reverse(entry)| entry.due)
    }

    /// Enqueue `process` to run `delay` minutes from now
    pub fn schedule_after(&mut self, delay: i64, process: P) -> Result<(), SchedulingError> {
        let delay = u64::try_from(delay).map_err(|_| SchedulingError::InvalidDelay { delay })?;
        self.push(self.now.saturating_add(delay), process);
        Ok(())
    }

    /// Enqueue `process` to run at an absolute minute
    pub fn schedule_at(&mut self, due: SimMinutes, process: P) -> Result<(), SchedulingError> {
        if due < self.now {
            return Err(SchedulingError::InPast {
                requested: due,
                now: self.now,
            });
        }
        self.push(due, process);
        Ok(())
    }

    fn push(&mut self, due: SimMinutes, process: P) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        trace!(due, sequence, "scheduled continuation");
        self.queue.push(Reverse(ScheduledEntry {
            due,
            sequence,
            process,
        }));
    }

    /// Dispatch pending continuations in `(due, sequence)` order
    ///
    /// `dispatch` receives the scheduler so it can enqueue follow-up work. An
    /// error from `dispatch` stops the run immediately and is returned; the
    /// clock stays at the failing entry's due time.
    pub fn run<E, F>(&mut self, until: RunUntil, mut dispatch: F) -> Result<RunSummary, E>
    where
        F: FnMut(&mut Self, P) -> Result<(), E>,
    {
        let mut dispatched = 0;

        while let Some(due) = self.peek_due() {
            if let RunUntil::Time(horizon) = until {
                if due >= horizon {
                    break;
                }
            }

            let Some(Reverse(entry)) = self.queue.pop() else {
                break;
            };
            self.now = entry.due;
            dispatched += 1;
            dispatch(self, entry.process)?;
        }

        debug!(
            dispatched,
            now = self.now,
            pending = self.queue.len(),
            "scheduler run finished"
        );

        Ok(RunSummary {
            dispatched,
            final_time: self.now,
            pending: self.queue.len(),
        })
    }
}
