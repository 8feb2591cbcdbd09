//! Shared world state for command dispatch BDD scenarios.

use std::sync::Arc;

use rstest::fixture;
use switchboard::command::{
    adapters::memory::{InMemoryEntityCache, InMemoryLifecycleSink, InMemoryReplyTransport},
    config::DispatchConfig,
    domain::ReplyPayload,
    services::{CommandRegistry, DispatchReport, Dispatcher, RegisteredCommand, RegistryResult},
};

/// Dispatcher type used by the BDD world.
pub type TestDispatcher = Dispatcher<InMemoryReplyTransport, InMemoryLifecycleSink>;

/// Scenario world for dispatch behaviour tests.
pub struct DispatchWorld {
    /// Registry shared with the dispatcher.
    pub registry: Arc<CommandRegistry>,
    /// Records every reply.
    pub transport: Arc<InMemoryReplyTransport>,
    /// Records lifecycle events.
    pub lifecycle: Arc<InMemoryLifecycleSink>,
    /// Dispatcher, once started.
    pub dispatcher: Option<TestDispatcher>,
    /// Report for the last inbound event.
    pub last_report: Option<DispatchReport>,
    /// Result of the last registration attempt.
    pub last_registration: Option<RegistryResult<RegisteredCommand>>,
}

impl DispatchWorld {
    /// Creates a world with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(CommandRegistry::new()),
            transport: Arc::new(InMemoryReplyTransport::new()),
            lifecycle: Arc::new(InMemoryLifecycleSink::new()),
            dispatcher: None,
            last_report: None,
            last_registration: None,
        }
    }

    /// Builds and starts the dispatcher over the world's registry.
    pub fn start(&mut self) -> Result<(), eyre::Report> {
        let dispatcher = Dispatcher::new(
            &DispatchConfig::default(),
            Arc::clone(&self.registry),
            Arc::clone(&self.transport),
            Arc::new(InMemoryEntityCache::new()),
            Arc::clone(&self.lifecycle),
        )
        .map_err(|err| eyre::eyre!("dispatcher rejected default config: {err}"))?;
        dispatcher.start();
        self.dispatcher = Some(dispatcher);
        Ok(())
    }

    /// Returns the started dispatcher.
    pub fn dispatcher(&self) -> Result<&TestDispatcher, eyre::Report> {
        self.dispatcher
            .as_ref()
            .ok_or_else(|| eyre::eyre!("dispatcher has not been started"))
    }

    /// Returns the most recently delivered payload.
    pub fn last_reply(&self) -> Result<ReplyPayload, eyre::Report> {
        self.transport
            .delivered()
            .pop()
            .ok_or_else(|| eyre::eyre!("no reply was delivered"))
    }
}

impl Default for DispatchWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> DispatchWorld {
    DispatchWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
