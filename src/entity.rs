//! Wait/trigger/interrupt semantics layered on top of [`process`](crate::process).
//!
//! Every process slot already carries the `waiting`/`triggered`/`interrupted`
//! fields needed here; this module does not introduce a second kind of
//! process. That flattening mirrors the conceptual (not structural)
//! extension the reference implementation describes between `Process` and
//! `Entity`.

use crate::diagnostics;
use crate::list::List;
use crate::process::{ProcessId, Simulation, Step};

/// Why a [`Simulation::wait`]/[`Simulation::wait_for`] suspension ended,
/// reported by [`Simulation::finish_wait`] when the body resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Another entity called `trigger` on this one, or triggered the
    /// queue it was waiting in.
    Triggered,
    /// Another entity called `interrupt` on this one.
    Interrupted,
    /// A `wait_for` timeout elapsed before anything else woke it.
    TimedOut,
}

/// A FIFO queue of entities waiting to be triggered, built on the
/// [`Simulation`]'s shared intrusive list pool.
#[derive(Debug, Clone, Copy)]
pub struct TriggerQueue(pub(crate) List);

impl Simulation {
    /// Allocate a new, empty trigger queue.
    pub fn new_trigger_queue(&mut self) -> TriggerQueue {
        TriggerQueue(self.links.new_list())
    }

    /// Suspend `id` until something resolves its wait (a `trigger`, an
    /// `interrupt`, or — if this suspension came from `wait_for` — a
    /// timeout). The caller should call [`Simulation::finish_wait`] the
    /// next time its body resumes from the returned `Step::Wait`.
    pub fn wait(&mut self, id: ProcessId) -> Step {
        self.cancel(id);
        self.set_waiting(id, true);
        Step::Wait
    }

    /// Like [`Simulation::wait`], but also schedules a timeout after `d`
    /// logical time units. If nothing else resolves the wait first, the
    /// process resumes normally via the scheduler and
    /// [`Simulation::finish_wait`] reports [`WaitOutcome::TimedOut`].
    pub fn wait_for(&mut self, id: ProcessId, d: f64) -> Step {
        let d = if d < 0.0 {
            diagnostics::invalid_argument("wait_for", "negative timeout");
            0.0
        } else {
            d
        };
        self.set_waiting(id, true);
        self.activate_delay(id, d);
        Step::WaitFor(d)
    }

    /// Insert `id` at the back of `queue`, then wait on it. A no-op
    /// (diagnostic only) if `id` is already waiting somewhere.
    pub fn wait_for_trigger(&mut self, id: ProcessId, queue: &TriggerQueue) -> Step {
        self.queue_insert(queue, id);
        self.wait(id)
    }

    /// Call once, upon resuming from a `Step::Wait`/`Step::WaitFor`
    /// suspension, to clear `waiting` and learn why the suspension ended.
    /// Does not clear `triggered`/`interrupted` — use
    /// [`Simulation::clear_flags`] for that.
    pub fn finish_wait(&mut self, id: ProcessId) -> WaitOutcome {
        self.set_waiting(id, false);
        if self.is_interrupted(id) {
            WaitOutcome::Interrupted
        } else if self.is_triggered(id) {
            WaitOutcome::Triggered
        } else {
            WaitOutcome::TimedOut
        }
    }

    fn set_waiting(&mut self, id: ProcessId, waiting: bool) {
        self.slab[id.0].waiting = waiting;
    }

    fn resolve(&mut self, op: &'static str, target: ProcessId, as_trigger: bool) -> bool {
        if self.is_terminated(target) || !self.is_waiting(target) {
            diagnostics::precondition(op, "target is not waiting");
            return false;
        }
        if as_trigger {
            self.slab[target.0].triggered = true;
        } else {
            self.slab[target.0].interrupted = true;
        }
        self.cancel(target);
        self.activate(target);
        true
    }

    /// Set `target.triggered` and schedule it to run now, ahead of
    /// anything else at the current instant. No-op if `target` is
    /// terminated or not waiting. By SIMULA convention the caller should
    /// yield zero time immediately afterward so `target` can actually run.
    pub fn trigger(&mut self, target: ProcessId) -> bool {
        self.resolve("trigger", target, true)
    }

    /// Set `target.interrupted` and schedule it to run now. Returns
    /// whether it was actually delivered. When `immediate` is true, the
    /// caller should yield zero time afterward, same as [`Simulation::trigger`].
    pub fn interrupt(&mut self, target: ProcessId, immediate: bool) -> bool {
        let delivered = self.resolve("interrupt", target, false);
        let _ = immediate;
        delivered
    }

    /// Insert `id` at the back of `queue`. No-op (diagnostic) if `id` is
    /// already a member of it.
    pub fn queue_insert(&mut self, queue: &TriggerQueue, id: ProcessId) {
        if self.links.in_this_list(id, queue.0) {
            diagnostics::precondition("TriggerQueue::insert", "entity already queued");
            return;
        }
        self.links.add_last(queue.0, id);
    }

    /// Remove and return the head of `queue`, without resolving its wait.
    pub fn queue_remove(&mut self, queue: &TriggerQueue) -> Option<ProcessId> {
        let first = self.links.first(queue.0)?;
        self.links.out(first);
        Some(first)
    }

    /// Pop the head of `queue` and trigger it. `set_trigger = false` is
    /// used by [`crate::semaphore::Semaphore`], whose wakeups are not
    /// user-visible trigger events.
    pub fn queue_trigger_first(&mut self, queue: &TriggerQueue, set_trigger: bool) -> Option<ProcessId> {
        let pid = self.queue_remove(queue)?;
        if set_trigger {
            self.slab[pid.0].triggered = true;
        }
        self.cancel(pid);
        self.activate(pid);
        Some(pid)
    }

    /// Trigger every waiter in `queue`, in FIFO order.
    pub fn queue_trigger_all(&mut self, queue: &TriggerQueue) {
        while self.queue_trigger_first(queue, true).is_some() {}
    }

    pub fn queue_is_empty(&self, queue: &TriggerQueue) -> bool {
        self.links.is_empty(queue.0)
    }

    pub fn queue_len(&self, queue: &TriggerQueue) -> usize {
        self.links.cardinal(queue.0)
    }
}
