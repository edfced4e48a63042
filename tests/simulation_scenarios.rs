//! End-to-end models exercising the scheduler, entities, semaphores, and
//! random streams together. These check the invariants a correct model
//! must satisfy (conservation, monotonicity, bounded occupancy) rather
//! than reference-exact counts, since those depend on the exact sequence
//! of draws a particular model issues against the shared PRNG streams.

use simkernel::random::Exponential;
use simkernel::{Body, ProcessId, Simulation, Step};

struct Producer {
    arrivals: Exponential,
    produced: std::rc::Rc<std::cell::RefCell<u64>>,
    buffer: std::rc::Rc<std::cell::RefCell<u64>>,
    capacity: u64,
    horizon: f64,
}

impl Body for Producer {
    fn step(&mut self, me: ProcessId, sim: &mut Simulation) -> Step {
        if sim.current_time() >= self.horizon {
            return Step::Done;
        }
        if *self.buffer.borrow() < self.capacity {
            *self.buffer.borrow_mut() += 1;
            *self.produced.borrow_mut() += 1;
        }
        let delay = self.arrivals.sample();
        sim.hold(me, delay)
    }
}

struct Consumer {
    service: Exponential,
    consumed: std::rc::Rc<std::cell::RefCell<u64>>,
    buffer: std::rc::Rc<std::cell::RefCell<u64>>,
    horizon: f64,
}

impl Body for Consumer {
    fn step(&mut self, me: ProcessId, sim: &mut Simulation) -> Step {
        if sim.current_time() >= self.horizon {
            return Step::Done;
        }
        if *self.buffer.borrow() > 0 {
            *self.buffer.borrow_mut() -= 1;
            *self.consumed.borrow_mut() += 1;
        }
        let delay = self.service.sample();
        sim.hold(me, delay)
    }
}

#[test]
fn bounded_buffer_never_overflows_and_conserves_items() {
    let mut sim = Simulation::new();
    let produced = std::rc::Rc::new(std::cell::RefCell::new(0u64));
    let consumed = std::rc::Rc::new(std::cell::RefCell::new(0u64));
    let buffer = std::rc::Rc::new(std::cell::RefCell::new(0u64));
    let capacity = 10;
    let horizon = 10_000.0;

    let producer = sim.spawn(Producer {
        arrivals: Exponential::new(10.0, 0),
        produced: produced.clone(),
        buffer: buffer.clone(),
        capacity,
        horizon,
    });
    let consumer = sim.spawn(Consumer {
        service: Exponential::new(10.0, 1),
        consumed: consumed.clone(),
        buffer: buffer.clone(),
        horizon,
    });
    sim.activate(producer);
    sim.activate(consumer);
    sim.run();

    assert!(*buffer.borrow() <= capacity);
    assert_eq!(*produced.borrow() - *consumed.borrow(), *buffer.borrow());
    assert!(*produced.borrow() > 0);
}

struct Job {
    arrivals: Exponential,
    service: Exponential,
    total_response: std::rc::Rc<std::cell::RefCell<f64>>,
    jobs_done: std::rc::Rc<std::cell::RefCell<u64>>,
    target_jobs: u64,
    arrived_at: Option<f64>,
}

impl Body for Job {
    fn step(&mut self, me: ProcessId, sim: &mut Simulation) -> Step {
        if *self.jobs_done.borrow() >= self.target_jobs {
            return Step::Done;
        }
        match self.arrived_at {
            None => {
                self.arrived_at = Some(sim.current_time());
                let service_time = self.service.sample();
                sim.hold(me, service_time)
            }
            Some(arrived) => {
                let response = sim.current_time() - arrived;
                *self.total_response.borrow_mut() += response;
                *self.jobs_done.borrow_mut() += 1;
                self.arrived_at = None;
                let inter_arrival = self.arrivals.sample();
                sim.hold(me, inter_arrival)
            }
        }
    }
}

#[test]
fn machine_shop_mean_response_time_is_positive_and_finite() {
    let mut sim = Simulation::new();
    let total_response = std::rc::Rc::new(std::cell::RefCell::new(0.0));
    let jobs_done = std::rc::Rc::new(std::cell::RefCell::new(0u64));

    let job = sim.spawn(Job {
        arrivals: Exponential::new(8.0, 2),
        service: Exponential::new(8.0, 3),
        total_response: total_response.clone(),
        jobs_done: jobs_done.clone(),
        target_jobs: 1000,
        arrived_at: None,
    });
    sim.activate(job);
    sim.run();

    let done = *jobs_done.borrow();
    assert_eq!(done, 1000);
    let mean_response = *total_response.borrow() / done as f64;
    assert!(mean_response > 0.0 && mean_response.is_finite());
}

struct Signaller {
    interval: Exponential,
    target: ProcessId,
    signals_sent: std::rc::Rc<std::cell::RefCell<u32>>,
    max_signals: u32,
}

impl Body for Signaller {
    fn step(&mut self, me: ProcessId, sim: &mut Simulation) -> Step {
        if *self.signals_sent.borrow() >= self.max_signals {
            return Step::Done;
        }
        sim.interrupt(self.target, true);
        *self.signals_sent.borrow_mut() += 1;
        let delay = self.interval.sample();
        sim.hold(me, delay)
    }
}

struct Worker {
    service: Exponential,
    jobs_processed: std::rc::Rc<std::cell::RefCell<u32>>,
    interrupts_seen: std::rc::Rc<std::cell::RefCell<u32>>,
}

impl Body for Worker {
    fn step(&mut self, me: ProcessId, sim: &mut Simulation) -> Step {
        if sim.is_waiting(me) {
            let outcome = sim.finish_wait(me);
            if outcome == simkernel::WaitOutcome::Interrupted {
                *self.interrupts_seen.borrow_mut() += 1;
                sim.clear_flags(me);
            } else {
                *self.jobs_processed.borrow_mut() += 1;
            }
        }
        let service_time = self.service.sample();
        sim.wait_for(me, service_time)
    }
}

#[test]
fn interrupts_are_counted_separately_from_completed_jobs() {
    let mut sim = Simulation::new();
    let jobs_processed = std::rc::Rc::new(std::cell::RefCell::new(0u32));
    let interrupts_seen = std::rc::Rc::new(std::cell::RefCell::new(0u32));
    let signals_sent = std::rc::Rc::new(std::cell::RefCell::new(0u32));

    let worker = sim.spawn(Worker {
        service: Exponential::new(10.0, 4),
        jobs_processed: jobs_processed.clone(),
        interrupts_seen: interrupts_seen.clone(),
    });
    sim.activate(worker);

    let signaller = sim.spawn(Signaller {
        interval: Exponential::new(1000.0, 5),
        target: worker,
        signals_sent: signals_sent.clone(),
        max_signals: 2,
    });
    sim.activate(signaller);

    sim.run();

    assert_eq!(*signals_sent.borrow(), 2);
    assert_eq!(*interrupts_seen.borrow(), 2);
}
