//! Then steps for command dispatch BDD scenarios.

use super::world::DispatchWorld;
use rstest_bdd_macros::then;
use switchboard::command::{
    adapters::memory::TransportCall, domain::LifecycleEvent, services::RegistryError,
};

#[then(r#"the reply is "{expected}""#)]
fn reply_is(world: &DispatchWorld, expected: String) -> Result<(), eyre::Report> {
    let reply = world.last_reply()?;
    if reply.content.as_deref() != Some(expected.as_str()) {
        return Err(eyre::eyre!(
            "expected reply '{expected}', got {:?}",
            reply.content
        ));
    }
    Ok(())
}

#[then(r#"the reply contains "{fragment}""#)]
fn reply_contains(world: &DispatchWorld, fragment: String) -> Result<(), eyre::Report> {
    let reply = world.last_reply()?;
    let content = reply.content.unwrap_or_default();
    if !content.contains(&fragment) {
        return Err(eyre::eyre!("expected '{fragment}' in reply '{content}'"));
    }
    Ok(())
}

#[then("the interaction was deferred")]
fn interaction_deferred(world: &DispatchWorld) -> Result<(), eyre::Report> {
    let calls = world.transport.calls();
    match calls.first() {
        Some(TransportCall::Defer { .. }) => Ok(()),
        other => Err(eyre::eyre!("expected a deferral first, got {other:?}")),
    }
}

#[then("an error event is emitted")]
fn error_event_emitted(world: &DispatchWorld) -> Result<(), eyre::Report> {
    let events = world.lifecycle.events();
    if !events
        .iter()
        .any(|event| matches!(event, LifecycleEvent::Error { .. }))
    {
        return Err(eyre::eyre!("expected an error event, got {events:?}"));
    }
    Ok(())
}

#[then("registration fails because the registry is locked")]
fn registration_locked(world: &DispatchWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_registration
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing registration result in scenario world"))?;
    if !matches!(result, Err(RegistryError::Locked { .. })) {
        return Err(eyre::eyre!("expected a locked registry, got {result:?}"));
    }
    Ok(())
}
