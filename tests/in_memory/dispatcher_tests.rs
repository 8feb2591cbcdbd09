//! In-memory integration tests for the dispatcher error boundary and
//! reply protocol.

use std::sync::Arc;

use super::helpers::{Harness, guild, harness, message, registry};
use rstest::rstest;
use switchboard::command::{
    adapters::memory::TransportCall,
    config::DispatchConfig,
    domain::{
        ChannelId, ChatCommand, Interaction, InteractionOption, LifecycleEvent, Permissions,
        PrefixScope, UserId,
    },
    services::{CommandRegistry, DispatchError, DispatchReport, ExecutionOutcome, RegistryError},
};

fn add_role(permissions: Permissions) -> Interaction {
    Interaction::command("i1", "token", "admin", ChannelId::new("c1"), UserId::new("u1"))
        .in_guild(guild())
        .with_permissions(permissions)
        .with_option(InteractionOption::group(
            "roles",
            InteractionOption::subcommand("add", vec![InteractionOption::value("role", "5")]),
        ))
}

#[rstest]
fn start_emits_ready_with_command_counts(harness: Harness) {
    assert_eq!(
        harness.lifecycle.events(),
        [LifecycleEvent::Ready {
            chat_commands: 5,
            context_menus: 0,
        }]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn plain_text_is_forwarded_as_a_message_event(harness: Harness) {
    let plain = message("just chatting");

    let report = harness.dispatcher.handle_message(&plain).await;

    assert!(matches!(report, DispatchReport::Ignored));
    assert!(harness.transport.calls().is_empty());
    assert_eq!(
        harness.lifecycle.events().last(),
        Some(&LifecycleEvent::Message(plain))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn text_commands_reply_with_their_return_value(harness: Harness) {
    let report = harness.dispatcher.handle_message(&message("!greet bob")).await;

    assert!(matches!(
        report,
        DispatchReport::Completed(ExecutionOutcome::Replied)
    ));
    assert_eq!(harness.replies(), ["hello bob"]);
    assert!(matches!(
        harness.lifecycle.events().last(),
        Some(LifecycleEvent::Command { name, .. }) if name == "greet"
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_commands_get_one_not_found_message(harness: Harness) {
    let report = harness.dispatcher.handle_message(&message("!wave")).await;

    assert!(matches!(
        report.error(),
        Some(DispatchError::CommandNotFound(name)) if name == "wave"
    ));
    assert_eq!(harness.replies(), ["Command `wave` was not found."]);
    assert!(harness.lifecycle.events().iter().any(|event| matches!(
        event,
        LifecycleEvent::Error { command: Some(command), .. } if command == "wave"
    )));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn void_handlers_stay_silent_by_default(harness: Harness) {
    let report = harness.dispatcher.handle_message(&message("!quiet")).await;

    assert!(matches!(
        report,
        DispatchReport::Completed(ExecutionOutcome::Silent)
    ));
    assert!(harness.transport.calls().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn void_handlers_announce_success_when_configured(registry: Arc<CommandRegistry>) {
    let config = DispatchConfig {
        announce_success: true,
        ..DispatchConfig::default()
    };
    let harness = Harness::with_config(&config, registry);
    harness.dispatcher.start();

    let report = harness.dispatcher.handle_message(&message("!quiet")).await;

    assert!(matches!(
        report,
        DispatchReport::Completed(ExecutionOutcome::OperationSuccess)
    ));
    assert_eq!(harness.replies(), ["Command `quiet` completed."]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn permitted_interactions_are_deferred_then_edited(harness: Harness) {
    let report = harness
        .dispatcher
        .handle_interaction(&add_role(Permissions::MANAGE_ROLES))
        .await;

    assert!(report.is_completed());
    let calls = harness.transport.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], TransportCall::Defer { ephemeral: false, .. }));
    assert!(matches!(
        &calls[1],
        TransportCall::Edit { payload, .. } if payload.content.as_deref() == Some("added")
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn denied_interactions_name_the_missing_permission(harness: Harness) {
    let report = harness
        .dispatcher
        .handle_interaction(&add_role(Permissions::SEND_MESSAGES))
        .await;

    assert!(matches!(
        report.error(),
        Some(DispatchError::Permissions { command, .. }) if command == "admin roles add"
    ));
    let replies = harness.replies();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("MANAGE_ROLES"), "got {replies:?}");
    assert!(
        !harness
            .transport
            .calls()
            .iter()
            .any(|call| matches!(call, TransportCall::Defer { .. }))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn slow_handlers_time_out_with_a_single_error(registry: Arc<CommandRegistry>) {
    let config = DispatchConfig {
        handler_timeout_secs: 1,
        ..DispatchConfig::default()
    };
    let harness = Harness::with_config(&config, registry);
    harness.dispatcher.start();

    let report = harness.dispatcher.handle_message(&message("!slow")).await;

    assert!(matches!(
        report.error(),
        Some(DispatchError::HandlerTimedOut { seconds: 1, .. })
    ));
    let replies = harness.replies();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].starts_with("Command `slow` failed:"), "got {replies:?}");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn panicking_handlers_edit_the_placeholder_with_one_error(harness: Harness) {
    let interaction = Interaction::command(
        "i9",
        "token",
        "explode",
        ChannelId::new("c1"),
        UserId::new("u1"),
    );

    let report = harness.dispatcher.handle_interaction(&interaction).await;

    assert!(matches!(
        report.error(),
        Some(DispatchError::HandlerPanicked { command, detail })
            if command == "explode" && detail == "handler blew up"
    ));
    let calls = harness.transport.calls();
    assert_eq!(calls.len(), 2, "got {calls:?}");
    assert!(matches!(calls[0], TransportCall::Defer { .. }));
    assert!(matches!(
        &calls[1],
        TransportCall::Edit { payload, .. }
            if payload
                .content
                .as_deref()
                .is_some_and(|text| text.starts_with("Command `explode` failed:"))
    ));
    assert!(harness.lifecycle.events().iter().any(|event| matches!(
        event,
        LifecycleEvent::Error { command: Some(command), .. } if command == "explode"
    )));

    let next = harness.dispatcher.handle_message(&message("!greet bob")).await;
    assert!(next.is_completed());
    assert_eq!(harness.replies().last().map(String::as_str), Some("hello bob"));
}

#[rstest]
fn registration_is_rejected_after_start(harness: Harness) {
    let late = ChatCommand::new("late", "Too late").expect("late should be valid");

    let result = harness.dispatcher.registry().add(late);

    assert!(matches!(result, Err(RegistryError::Locked { operation: "add" })));
    assert!(harness.dispatcher.registry().chat_command("late").is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn guild_prefixes_apply_only_in_their_guild(harness: Harness) {
    harness
        .dispatcher
        .set_prefix(PrefixScope::Guild(guild()), "?")
        .expect("prefix should be valid");

    let in_guild = harness
        .dispatcher
        .handle_message(&message("?greet ann").in_guild(guild()))
        .await;
    let direct = harness.dispatcher.handle_message(&message("?greet bob")).await;

    assert!(in_guild.is_completed());
    assert!(matches!(direct, DispatchReport::Ignored));
    assert_eq!(harness.replies(), ["hello ann"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transport_failures_are_reported_not_raised(harness: Harness) {
    harness.transport.fail_all();

    let report = harness.dispatcher.handle_message(&message("!greet bob")).await;

    assert!(matches!(report.error(), Some(DispatchError::Transport(_))));
    assert!(harness.transport.calls().is_empty());
    assert!(
        harness
            .lifecycle
            .events()
            .iter()
            .any(|event| matches!(event, LifecycleEvent::Error { .. }))
    );
}
