//! The crate's single non-fatal reporting surface.
//!
//! Nothing here panics or returns an error the caller must handle. Every
//! invalid-argument or broken-precondition path in the crate funnels through
//! one of these helpers, emits a structured `tracing` event, and then the
//! caller performs whatever no-op or clamp the situation calls for.

/// An argument was out of range. The operation clamps, defaults, or
/// no-ops; this only records why.
pub fn invalid_argument(op: &str, detail: &str) {
    tracing::warn!(op, detail, "invalid argument");
}

/// A precondition on process/entity/semaphore state was violated (e.g.
/// activating a terminated process, inserting an already-waiting entity
/// into a trigger queue). The caller no-ops.
pub fn precondition(op: &str, detail: &str) {
    tracing::warn!(op, detail, "precondition violated");
}

/// A sample was rejected by a bounded statistic (out of range).
pub fn sample_rejected(op: &str, detail: &str) {
    tracing::warn!(op, detail, "sample rejected");
}

/// Serialization round-trip failed; restore leaves the target unmodified.
pub fn serialization_failed(op: &str, detail: &str) {
    tracing::warn!(op, detail, "serialization failed");
}
