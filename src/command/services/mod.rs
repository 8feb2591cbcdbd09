//! Service layer for command registration and dispatch.
//!
//! [`CommandRegistry`] holds the tree, [`DispatchResolver`] turns raw input
//! into canonical invocations, [`CommandExecutor`] runs them under the
//! reply protocol, and [`Dispatcher`] ties them together behind one error
//! boundary. [`CommandPublicationService`] pushes the tree to the platform.

mod dispatcher;
mod error;
mod executor;
mod publication;
mod registry;
mod resolver;
mod session;
mod system_message;

pub use dispatcher::{DispatchReport, Dispatcher};
pub use error::{DispatchError, DispatchResult};
pub use executor::{CommandExecutor, ExecutionOutcome};
pub use publication::{CommandPublicationService, PublicationReport};
pub use registry::{CommandRegistry, RegisteredCommand, RegistryError, RegistryResult};
pub use resolver::DispatchResolver;
pub use session::{CommandContext, ReplySession};
pub use system_message::{SystemMessageKind, SystemMessages};
