//! Recording lifecycle sink.

use std::sync::{Arc, PoisonError, RwLock};

use crate::command::domain::LifecycleEvent;
use crate::command::ports::LifecycleSink;

/// Sink that keeps every emitted event.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLifecycleSink {
    events: Arc<RwLock<Vec<LifecycleEvent>>>,
}

impl InMemoryLifecycleSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of emitted events in order.
    #[must_use]
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LifecycleSink for InMemoryLifecycleSink {
    fn emit(&self, event: LifecycleEvent) {
        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
