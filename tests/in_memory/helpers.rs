//! Shared test helpers for in-memory dispatch integration tests.

use std::sync::Arc;
use std::time::Duration;

use rstest::fixture;
use switchboard::command::{
    adapters::memory::{InMemoryEntityCache, InMemoryLifecycleSink, InMemoryReplyTransport},
    config::DispatchConfig,
    domain::{
        ChannelId, ChatCommand, GuildId, ParameterSchema, ParameterType, PermissionRule,
        Permissions, SubCommand, SubCommandGroup, TextMessage, UserId,
    },
    ports::{HandlerResult, handler_fn},
    services::{CommandRegistry, Dispatcher},
};

/// Dispatcher wired to in-memory adapters.
pub type TestDispatcher = Dispatcher<InMemoryReplyTransport, InMemoryLifecycleSink>;

/// A dispatcher plus handles on its recording adapters.
pub struct Harness {
    /// The dispatcher under test.
    pub dispatcher: TestDispatcher,
    /// Records every reply.
    pub transport: Arc<InMemoryReplyTransport>,
    /// Records lifecycle events.
    pub lifecycle: Arc<InMemoryLifecycleSink>,
}

impl Harness {
    /// Builds an unstarted harness over `registry`.
    ///
    /// # Panics
    ///
    /// Panics when `config` is invalid.
    #[must_use]
    pub fn with_config(config: &DispatchConfig, registry: Arc<CommandRegistry>) -> Self {
        let transport = Arc::new(InMemoryReplyTransport::new());
        let lifecycle = Arc::new(InMemoryLifecycleSink::new());
        let dispatcher = Dispatcher::new(
            config,
            registry,
            Arc::clone(&transport),
            Arc::new(InMemoryEntityCache::new()),
            Arc::clone(&lifecycle),
        )
        .expect("test config should be valid");
        Self {
            dispatcher,
            transport,
            lifecycle,
        }
    }

    /// Returns the text of every delivered reply, in order.
    #[must_use]
    pub fn replies(&self) -> Vec<String> {
        self.transport
            .delivered()
            .into_iter()
            .filter_map(|payload| payload.content)
            .collect()
    }
}

/// Provides a registry seeded with the standard test commands.
#[fixture]
pub fn registry() -> Arc<CommandRegistry> {
    let registry = Arc::new(CommandRegistry::new());
    for command in [greet(), quiet(), slow(), explode(), admin()] {
        registry
            .add(command)
            .expect("fixture command should register");
    }
    registry
}

/// Provides a started harness with default configuration.
#[fixture]
pub fn harness(registry: Arc<CommandRegistry>) -> Harness {
    let harness = Harness::with_config(&DispatchConfig::default(), registry);
    harness.dispatcher.start();
    harness
}

/// Builds a direct text message from `u1` in `c1`.
#[must_use]
pub fn message(content: &str) -> TextMessage {
    TextMessage::new("m1", ChannelId::new("c1"), UserId::new("u1"), content)
}

/// The guild used by guild-scoped tests.
#[must_use]
pub fn guild() -> GuildId {
    GuildId::new("100")
}

/// `greet <who>` replying `hello <who>`.
fn greet() -> ChatCommand {
    ChatCommand::new("greet", "Greets someone")
        .and_then(|command| {
            command.with_parameter(ParameterSchema::new(
                "who",
                "Who to greet",
                ParameterType::String,
            )?)
        })
        .map(|command| {
            command.with_handler(handler_fn(|context| async move {
                let who = context.parameters().string("who").unwrap_or("nobody");
                HandlerResult::Ok(format!("hello {who}").into())
            }))
        })
        .expect("greet should be valid")
}

/// `quiet` returning nothing.
fn quiet() -> ChatCommand {
    ChatCommand::new("quiet", "Does its work silently")
        .map(|command| {
            command.with_handler(handler_fn(|_context| async { HandlerResult::Ok(().into()) }))
        })
        .expect("quiet should be valid")
}

/// `slow` sleeping for two seconds before replying.
fn slow() -> ChatCommand {
    ChatCommand::new("slow", "Takes its time")
        .map(|command| {
            command.with_handler(handler_fn(|_context| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                HandlerResult::Ok("finally".into())
            }))
        })
        .expect("slow should be valid")
}

/// `explode` panicking inside its handler.
fn explode() -> ChatCommand {
    ChatCommand::new("explode", "Panics mid-handler")
        .map(|command| {
            command.with_handler(handler_fn(|_context| async {
                let results: Vec<HandlerResult> = Vec::new();
                results
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| panic!("handler blew up"))
            }))
        })
        .expect("explode should be valid")
}

/// `admin roles add <role>` requiring `MANAGE_ROLES` on the leaf.
fn admin() -> ChatCommand {
    let add = SubCommand::new("add", "Adds a role")
        .and_then(|sub| {
            sub.with_parameter(ParameterSchema::new("role", "Role to add", ParameterType::Role)?)
        })
        .map(|sub| {
            sub.with_permission(PermissionRule::requires(Permissions::MANAGE_ROLES))
                .with_handler(handler_fn(|_context| async { HandlerResult::Ok("added".into()) }))
        })
        .expect("add should be valid");
    SubCommandGroup::new("roles", "Role management")
        .and_then(|group| group.with_child(add))
        .and_then(|roles| {
            ChatCommand::new("admin", "Administration")
                .and_then(|command| command.with_child(roles))
        })
        .expect("admin should be valid")
}
