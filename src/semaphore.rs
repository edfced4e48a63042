//! Counting semaphore with FIFO waiters, built on [`TriggerQueue`].

use crate::entity::TriggerQueue;
use crate::process::{ProcessId, Simulation, Step};

/// Result of a semaphore acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The resource was acquired.
    Done,
    /// The resource was not acquired and the caller did not block.
    NotDone,
    /// [`Semaphore::try_get`] found no resources available.
    WouldBlock,
}

/// A counting semaphore. Waiters queue up FIFO and are woken in the order
/// they arrived; waking a waiter never passes through the user-visible
/// `triggered` flag, since semaphore handoffs are not trigger events.
#[derive(Debug)]
pub struct Semaphore {
    available: u32,
    total: u32,
    ceiling: bool,
    num_waiting: u32,
    waiters: TriggerQueue,
}

impl Semaphore {
    /// `resources` is the initial (and, with a ceiling, maximum) count.
    pub fn new(sim: &mut Simulation, resources: u32, ceiling: bool) -> Self {
        Semaphore {
            available: resources,
            total: resources,
            ceiling,
            num_waiting: 0,
            waiters: sim.new_trigger_queue(),
        }
    }

    pub fn available(&self) -> u32 {
        self.available
    }

    pub fn num_waiting(&self) -> u32 {
        self.num_waiting
    }

    /// Acquire one resource, blocking `id` if none are free. Returns a
    /// `Step` when blocking actually occurred; the caller should return it
    /// from its own `Body::step` and resume via
    /// [`Simulation::finish_wait`] next time it is dispatched, then call
    /// [`Semaphore::finish_get`] to confirm acquisition.
    pub fn get(&mut self, sim: &mut Simulation, id: ProcessId) -> Result<Outcome, Step> {
        if self.available > 0 {
            self.available -= 1;
            return Ok(Outcome::Done);
        }
        self.num_waiting += 1;
        sim.queue_insert(&self.waiters, id);
        sim.cancel(id);
        Err(sim.wait(id))
    }

    /// Call after a `get`-induced wait resumes, to complete the
    /// acquisition bookkeeping. Always returns `Done` — the wait only
    /// resolves once a unit has actually been handed to this waiter.
    pub fn finish_get(&self, sim: &mut Simulation, id: ProcessId) -> Outcome {
        sim.finish_wait(id);
        Outcome::Done
    }

    /// Acquire a resource only if one is immediately available; never
    /// blocks.
    pub fn try_get(&mut self) -> Outcome {
        if self.available == 0 {
            Outcome::WouldBlock
        } else {
            self.available -= 1;
            Outcome::Done
        }
    }

    /// Release one resource. If a waiter is queued, hand it straight to
    /// them (without incrementing `available`) and wake them; otherwise
    /// increment `available`, clamped to `total` when a ceiling is set.
    /// Always yields zero time so the caller treats `release` uniformly
    /// as a suspension point, matching the reference implementation.
    pub fn release(&mut self, sim: &mut Simulation, id: ProcessId) -> Step {
        if self.num_waiting > 0 {
            self.num_waiting -= 1;
            sim.queue_trigger_first(&self.waiters, false);
        } else {
            self.available += 1;
            if self.ceiling && self.available > self.total {
                self.available = self.total;
            }
        }
        sim.hold(id, 0.0)
    }
}
