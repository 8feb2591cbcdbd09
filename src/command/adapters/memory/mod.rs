//! In-memory adapters for command ports.
//!
//! Used by tests and by embedders that wire a real gateway only on the
//! inbound side.

mod entity;
mod lifecycle;
mod publisher;
mod transport;

pub use entity::InMemoryEntityCache;
pub use lifecycle::InMemoryLifecycleSink;
pub use publisher::InMemoryCommandPublisher;
pub use transport::{InMemoryReplyTransport, TransportCall};
