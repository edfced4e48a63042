//! The event scheduler and the SIMULA-style process state machine.
//!
//! A [`Simulation`] owns a slab of process slots (see `slab::Slab`, used
//! the same way the surrounding ecosystem uses it for other arena-shaped
//! storage) and a priority queue of pending wakeups. There is no
//! process-wide global scheduler: every operator in this module is a
//! method on `Simulation`, and a process is referred to everywhere else by
//! its [`ProcessId`] handle rather than by pointer, so the arena can be
//! freely mutated without fighting the borrow checker over cyclic
//! process/scheduler references.
//!
//! Because Rust has no stable generators, a process body cannot literally
//! block mid-function. Instead each body implements [`Body::step`] as a
//! small hand-rolled state machine: it runs until it wants to suspend,
//! performs the suspension by calling the matching method on `sim`
//! (`sim.hold(..)`, `sim.wait(..)`, ...), and returns the [`Step`] that
//! describes what just happened. The dispatch loop in
//! [`Simulation::dispatch_next`] uses that value only to decide whether the
//! process has terminated; all of the actual scheduling work already
//! happened inside the `sim.*` call the body made.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use slab::Slab;

use crate::diagnostics;
use crate::list::ListPool;

/// Sentinel wakeup time meaning "not scheduled, and no wakeup pending".
pub const NEVER: f64 = -1.0;

/// A stable handle to a process slot inside a [`Simulation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId(pub(crate) usize);

/// What a process body just did, returned from [`Body::step`].
///
/// The dispatcher does not interpret `Hold`/`Wait`/`WaitFor` beyond
/// logging them; the body already performed the corresponding `sim.*`
/// call before returning. `Done` is the one variant the dispatcher acts
/// on, by terminating the process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// The process called `sim.hold(me, d)`.
    Hold(f64),
    /// The process called `sim.wait(me)` or `sim.passivate(me)`.
    Wait,
    /// The process called `sim.wait_for(me, d)`.
    WaitFor(f64),
    /// The process has nothing left to do.
    Done,
}

/// Implemented by user model code: the cooperative state machine driving
/// one simulation process.
pub trait Body {
    /// Advance the process until its next suspension point.
    fn step(&mut self, me: ProcessId, sim: &mut Simulation) -> Step;

    /// Hook invoked by [`Simulation::reset`], mirroring the reference
    /// implementation's per-process reset override. Most bodies have
    /// nothing to do here.
    fn reset(&mut self, _me: ProcessId, _sim: &mut Simulation) {}
}

#[derive(Debug)]
pub(crate) struct Slot {
    body: Option<Box<dyn Body>>,
    pub(crate) wakeup_time: f64,
    priority: i64,
    scheduled_seq: Option<u64>,
    pub(crate) terminated: bool,
    pub(crate) passivated: bool,
    pub(crate) waiting: bool,
    pub(crate) triggered: bool,
    pub(crate) interrupted: bool,
}

impl Slot {
    fn new(body: Box<dyn Body>) -> Self {
        Slot {
            body: Some(body),
            wakeup_time: NEVER,
            priority: 0,
            scheduled_seq: None,
            terminated: false,
            passivated: true,
            waiting: false,
            triggered: false,
            interrupted: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapKey {
    time: f64,
    priority: i64,
    sequence: u64,
}

impl Eq for HeapKey {}

impl PartialOrd for HeapKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .partial_cmp(&other.time)
            .unwrap_or(Ordering::Equal)
            .then(self.priority.cmp(&other.priority))
            .then(self.sequence.cmp(&other.sequence))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    key: HeapKey,
    process: ProcessId,
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

/// Owns the process arena, the ready queue, and the logical clock. Every
/// SIMULA-style operator in this crate is a method here, taking the
/// process it acts on as an explicit [`ProcessId`].
#[derive(Debug)]
pub struct Simulation {
    pub(crate) slab: Slab<Slot>,
    heap: BinaryHeap<Reverse<Entry>>,
    time: f64,
    next_seq: u64,
    current: Option<ProcessId>,
    pub(crate) links: ListPool<ProcessId>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    pub fn new() -> Self {
        Simulation {
            slab: Slab::new(),
            heap: BinaryHeap::new(),
            time: 0.0,
            next_seq: 0,
            current: None,
            links: ListPool::new(),
        }
    }

    /// Register a new process body. The process starts passivated; call
    /// one of the `activate*` methods to bring it onto the ready queue.
    pub fn spawn(&mut self, body: impl Body + 'static) -> ProcessId {
        ProcessId(self.slab.insert(Slot::new(Box::new(body))))
    }

    pub fn current_time(&self) -> f64 {
        self.time
    }

    /// The process presently executing inside a `Body::step` call, if any.
    pub fn current(&self) -> Option<ProcessId> {
        self.current
    }

    pub fn is_terminated(&self, id: ProcessId) -> bool {
        self.slab[id.0].terminated
    }

    pub fn is_passivated(&self, id: ProcessId) -> bool {
        self.slab[id.0].passivated
    }

    pub fn is_waiting(&self, id: ProcessId) -> bool {
        self.slab[id.0].waiting
    }

    pub fn is_triggered(&self, id: ProcessId) -> bool {
        self.slab[id.0].triggered
    }

    pub fn is_interrupted(&self, id: ProcessId) -> bool {
        self.slab[id.0].interrupted
    }

    pub fn wakeup_time(&self, id: ProcessId) -> f64 {
        self.slab[id.0].wakeup_time
    }

    /// A process is idle precisely when it holds no live entry on the
    /// ready queue.
    pub fn is_idle(&self, id: ProcessId) -> bool {
        self.slab[id.0].scheduled_seq.is_none()
    }

    pub fn is_scheduled(&self, id: ProcessId) -> bool {
        !self.is_idle(id)
    }

    /// Clear `triggered` and `interrupted`. Does not affect `waiting`.
    pub fn clear_flags(&mut self, id: ProcessId) {
        let slot = &mut self.slab[id.0];
        slot.triggered = false;
        slot.interrupted = false;
    }

    fn next_sequence(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn enqueue(&mut self, id: ProcessId, time: f64, priority: i64) {
        let seq = self.next_sequence();
        let slot = &mut self.slab[id.0];
        slot.scheduled_seq = Some(seq);
        slot.wakeup_time = time;
        slot.priority = priority;
        slot.passivated = false;
        self.heap.push(Reverse(Entry {
            key: HeapKey {
                time,
                priority,
                sequence: seq,
            },
            process: id,
        }));
    }

    fn activate_with(&mut self, id: ProcessId, time: f64, priority: i64) {
        if self.slab[id.0].terminated {
            diagnostics::precondition("activate", "process is terminated");
            return;
        }
        if self.is_scheduled(id) {
            return;
        }
        self.enqueue(id, time, priority);
    }

    /// Schedule `id` to run as soon as the driver next dispatches, ahead
    /// of anything else at the current instant.
    pub fn activate(&mut self, id: ProcessId) {
        let now = self.time;
        self.activate_with(id, now, 0);
    }

    /// Schedule `id` at `t`. No-op (with a diagnostic) if `t` has already
    /// passed.
    pub fn activate_at(&mut self, id: ProcessId, t: f64) {
        if t < self.time {
            diagnostics::invalid_argument("activate_at", "time is in the past");
            return;
        }
        self.activate_with(id, t, 1);
    }

    /// `activate_at(current_time + d)`. No-op if `d` is negative.
    pub fn activate_delay(&mut self, id: ProcessId, d: f64) {
        if d < 0.0 {
            diagnostics::invalid_argument("activate_delay", "negative delay");
            return;
        }
        self.activate_at(id, self.time + d);
    }

    /// Schedule `id` at `target`'s time, one priority step ahead of it.
    /// No-op if `target` is not itself scheduled.
    pub fn activate_before(&mut self, id: ProcessId, target: ProcessId) {
        if !self.is_scheduled(target) {
            diagnostics::precondition("activate_before", "target is not scheduled");
            return;
        }
        let slot = &self.slab[target.0];
        let (t, p) = (slot.wakeup_time, slot.priority - 1);
        self.activate_with(id, t, p);
    }

    /// Schedule `id` at `target`'s time, one priority step behind it.
    /// No-op if `target` is not itself scheduled.
    pub fn activate_after(&mut self, id: ProcessId, target: ProcessId) {
        if !self.is_scheduled(target) {
            diagnostics::precondition("activate_after", "target is not scheduled");
            return;
        }
        let slot = &self.slab[target.0];
        let (t, p) = (slot.wakeup_time, slot.priority + 1);
        self.activate_with(id, t, p);
    }

    /// Remove `id` from the ready queue, if it is scheduled. Does not
    /// touch `waiting`/`triggered`/`interrupted`; the caller decides what
    /// to do with those.
    pub fn cancel(&mut self, id: ProcessId) {
        self.slab[id.0].scheduled_seq = None;
    }

    /// `cancel` + `activate`. If `id` is the currently running process,
    /// the caller must still return `Step::Hold(0.0)` from its own
    /// `step` to actually yield — this mirrors the reference
    /// implementation's zero-duration self-reactivation.
    pub fn reactivate(&mut self, id: ProcessId) {
        self.cancel(id);
        self.activate(id);
    }

    pub fn reactivate_at(&mut self, id: ProcessId, t: f64) {
        self.cancel(id);
        self.activate_at(id, t);
    }

    pub fn reactivate_delay(&mut self, id: ProcessId, d: f64) {
        self.cancel(id);
        self.activate_delay(id, d);
    }

    /// Not supported when `id == target`: the reference implementation's
    /// behavior for a process reactivating itself relative to its own
    /// prior queue position is ambiguous (the position no longer exists
    /// once canceled). Treated as a no-op with a diagnostic in that case.
    pub fn reactivate_before(&mut self, id: ProcessId, target: ProcessId) {
        if id == target {
            diagnostics::precondition("reactivate_before", "cannot self-reactivate before self");
            return;
        }
        self.cancel(id);
        self.activate_before(id, target);
    }

    pub fn reactivate_after(&mut self, id: ProcessId, target: ProcessId) {
        if id == target {
            diagnostics::precondition("reactivate_after", "cannot self-reactivate after self");
            return;
        }
        self.cancel(id);
        self.activate_after(id, target);
    }

    /// Terminate `id` permanently. No-op if already terminated.
    pub fn terminate(&mut self, id: ProcessId) {
        let slot = &mut self.slab[id.0];
        if slot.terminated {
            return;
        }
        slot.terminated = true;
        slot.passivated = true;
        slot.wakeup_time = NEVER;
        slot.scheduled_seq = None;
    }

    /// Hold for `d` logical time units. Negative durations are clamped to
    /// zero with a diagnostic (the reference implementation instead skips
    /// the yield entirely; this crate's hand-rolled state machine cannot
    /// express "don't suspend at all" from inside `sim.hold`, so it holds
    /// for zero time instead — see `DESIGN.md`).
    pub fn hold(&mut self, id: ProcessId, d: f64) -> Step {
        let d = if d < 0.0 {
            diagnostics::invalid_argument("hold", "negative duration");
            0.0
        } else {
            d
        };
        self.slab[id.0].wakeup_time = NEVER;
        self.activate_delay(id, d);
        Step::Hold(d)
    }

    /// Passivate: leave the ready queue with no pending wakeup. Only an
    /// external `activate*`/`reactivate*` call can bring the process back.
    pub fn passivate(&mut self, id: ProcessId) -> Step {
        self.cancel(id);
        self.slab[id.0].passivated = true;
        Step::Wait
    }

    /// Run until the queue is empty.
    pub fn run(&mut self) {
        while self.dispatch_next() {}
    }

    /// Run while `cont` returns `true`, checked before each dispatch.
    pub fn run_while(&mut self, mut cont: impl FnMut(&Simulation) -> bool) {
        while cont(self) && self.dispatch_next() {}
    }

    /// Pop and run the next live ready-queue entry. Returns `false` if the
    /// queue is empty.
    pub fn dispatch_next(&mut self) -> bool {
        loop {
            let Some(Reverse(entry)) = self.heap.pop() else {
                return false;
            };
            let pid = entry.process;
            if self.slab[pid.0].scheduled_seq != Some(entry.key.sequence) {
                continue; // stale: canceled or superseded since insertion
            }

            self.time = entry.key.time;
            self.slab[pid.0].scheduled_seq = None;
            self.current = Some(pid);

            let mut body = self.slab[pid.0].body.take();
            let step = match body.as_mut() {
                Some(b) => b.step(pid, self),
                None => Step::Done,
            };
            self.slab[pid.0].body = body;

            tracing::trace!(?pid, ?step, time = self.time, "process stepped");

            if matches!(step, Step::Done) {
                self.terminate(pid);
            }
            return true;
        }
    }

    /// Unschedule every process, invoking each body's [`Body::reset`]
    /// hook. Does not rewind the logical clock.
    pub fn reset(&mut self) {
        self.heap.clear();
        let keys: Vec<usize> = self.slab.iter().map(|(k, _)| k).collect();
        for k in keys {
            let id = ProcessId(k);
            self.cancel(id);
            let mut body = self.slab[k].body.take();
            if let Some(b) = body.as_mut() {
                b.reset(id, self);
            }
            self.slab[k].body = body;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Holder {
        remaining: u32,
        ticks: std::rc::Rc<std::cell::RefCell<Vec<f64>>>,
    }

    impl Body for Holder {
        fn step(&mut self, me: ProcessId, sim: &mut Simulation) -> Step {
            self.ticks.borrow_mut().push(sim.current_time());
            if self.remaining == 0 {
                return Step::Done;
            }
            self.remaining -= 1;
            sim.hold(me, 1.0)
        }
    }

    #[test]
    fn hold_advances_time_monotonically() {
        let mut sim = Simulation::new();
        let ticks = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let id = sim.spawn(Holder {
            remaining: 3,
            ticks: ticks.clone(),
        });
        sim.activate(id);
        sim.run();
        assert_eq!(*ticks.borrow(), vec![0.0, 1.0, 2.0, 3.0]);
        assert!(sim.is_terminated(id));
    }

    struct Noop;
    impl Body for Noop {
        fn step(&mut self, _me: ProcessId, _sim: &mut Simulation) -> Step {
            Step::Done
        }
    }

    #[test]
    fn activate_before_runs_strictly_ahead_at_same_time() {
        let mut sim = Simulation::new();
        let order = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));

        struct Recorder(u32, std::rc::Rc<std::cell::RefCell<Vec<u32>>>);
        impl Body for Recorder {
            fn step(&mut self, _me: ProcessId, sim: &mut Simulation) -> Step {
                self.1.borrow_mut().push(self.0);
                let _ = sim.current_time();
                Step::Done
            }
        }

        let anchor = sim.spawn(Recorder(1, order.clone()));
        sim.activate_at(anchor, 5.0);

        let ahead = sim.spawn(Recorder(0, order.clone()));
        sim.activate_before(ahead, anchor);

        sim.run();
        assert_eq!(*order.borrow(), vec![0, 1]);
    }

    #[test]
    fn terminated_process_ignores_activation() {
        let mut sim = Simulation::new();
        let id = sim.spawn(Noop);
        sim.terminate(id);
        sim.activate(id);
        assert!(!sim.is_scheduled(id));
    }
}
