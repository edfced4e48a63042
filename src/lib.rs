//! # simkernel
//!
//! A process-oriented discrete event simulation kernel in the SIMULA
//! tradition. Models are built from long-lived processes that cooperatively
//! advance a shared logical clock: they hold for a duration, wait on events,
//! trigger or interrupt one another, and contend for counting semaphores.
//!
//! The crate is organized bottom-up:
//!
//! - [`list`] — the intrusive doubly-linked list backing every wait queue.
//! - [`random`] — deterministic, bit-reproducible random streams and the
//!   distributions built on top of them.
//! - [`stats`] — running statistics: mean, variance, histograms, quantiles.
//! - [`process`] — the scheduler and the process state machine.
//! - [`entity`] — wait/trigger/interrupt semantics layered on a process.
//! - [`semaphore`] — counting semaphores with FIFO waiters.
//! - [`diagnostics`] — the single non-fatal reporting surface used
//!   throughout the crate.
//! - [`checkpoint`] — file-based save/restore helpers for statistics.
//!
//! Nothing in this crate aborts a running simulation. Invalid arguments and
//! broken preconditions are reported through [`diagnostics`] and the
//! operation degrades to a no-op; see each module for specifics.
//!
//! This crate is not thread-safe by design: a [`process::Simulation`]
//! advances a single logical timeline, and process bodies are stored
//! without a `Send` bound.

pub mod checkpoint;
pub mod diagnostics;
pub mod entity;
pub mod list;
pub mod process;
pub mod random;
pub mod semaphore;
pub mod stats;

pub use entity::{TriggerQueue, WaitOutcome};
pub use process::{Body, ProcessId, Simulation, Step};
pub use semaphore::{Outcome, Semaphore};
