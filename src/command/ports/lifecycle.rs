//! Lifecycle notification port.

use crate::command::domain::LifecycleEvent;

/// Receives dispatcher lifecycle events.
///
/// Emission is fire-and-forget: sinks must not block dispatch.
pub trait LifecycleSink: Send + Sync {
    /// Records one event.
    fn emit(&self, event: LifecycleEvent);
}
