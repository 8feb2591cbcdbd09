//! Port trait definitions for the command subsystem.
//!
//! Ports are the seams between the dispatch core and the platform: handler
//! code, reply delivery, command publication, entity lookups and lifecycle
//! notifications. In-memory adapters live in `adapters::memory`.

pub mod entity;
pub mod handler;
pub mod lifecycle;
pub mod publisher;
pub mod transport;

pub use entity::{CachedEntity, EntityCache, EntityCacheError, EntityCacheResult, EntityKind};
pub use handler::{CommandHandler, FnHandler, HandlerError, HandlerResult, handler_fn};
pub use lifecycle::LifecycleSink;
pub use publisher::{CommandPublisher, PublishError, PublishResult};
pub use transport::{ReplyTransport, TransportError, TransportResult};
