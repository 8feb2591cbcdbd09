//! When steps for command dispatch BDD scenarios.

use super::world::{DispatchWorld, run_async};
use rstest_bdd_macros::when;
use switchboard::command::domain::{
    ChannelId, ChatCommand, GuildId, Interaction, InteractionOption, Permissions, TextMessage,
    UserId,
};

fn message(content: &str) -> TextMessage {
    TextMessage::new("m1", ChannelId::new("c1"), UserId::new("u1"), content)
}

#[when(r#"the user sends "{content}""#)]
fn user_sends(world: &mut DispatchWorld, content: String) -> Result<(), eyre::Report> {
    let report = run_async(world.dispatcher()?.handle_message(&message(&content)));
    world.last_report = Some(report);
    Ok(())
}

#[when(r#"the user sends "{content}" in guild "{guild}" without permissions"#)]
fn user_sends_in_guild(
    world: &mut DispatchWorld,
    content: String,
    guild: String,
) -> Result<(), eyre::Report> {
    let guild_message = message(&content)
        .in_guild(GuildId::new(guild))
        .with_permissions(Permissions::empty());
    let report = run_async(world.dispatcher()?.handle_message(&guild_message));
    world.last_report = Some(report);
    Ok(())
}

#[when(r#"the user selects "{path}" on "{command}" with role "{role}""#)]
fn user_selects_subcommand(
    world: &mut DispatchWorld,
    path: String,
    command: String,
    role: String,
) -> Result<(), eyre::Report> {
    let (group, sub) = path
        .split_once(' ')
        .ok_or_else(|| eyre::eyre!("expected '<group> <subcommand>', got '{path}'"))?;
    let interaction = Interaction::command(
        "i1",
        "token",
        command,
        ChannelId::new("c1"),
        UserId::new("u1"),
    )
    .with_option(InteractionOption::group(
        group,
        InteractionOption::subcommand(sub, vec![InteractionOption::value("role", role)]),
    ));
    let report = run_async(world.dispatcher()?.handle_interaction(&interaction));
    world.last_report = Some(report);
    Ok(())
}

#[when(r#"a command named "{name}" is registered"#)]
fn command_registered(world: &mut DispatchWorld, name: String) -> Result<(), eyre::Report> {
    let command = ChatCommand::new(name, "Registered late")
        .map_err(|err| eyre::eyre!("invalid command: {err}"))?;
    world.last_registration = Some(world.registry.add(command));
    Ok(())
}
