//! Given steps for command dispatch BDD scenarios.

use super::world::DispatchWorld;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use switchboard::command::{
    domain::{
        ChatCommand, ParameterSchema, ParameterType, PermissionRule, Permissions, SubCommand,
        SubCommandGroup,
    },
    ports::{HandlerResult, handler_fn},
};

#[given("a registered greet command")]
fn registered_greet(world: &mut DispatchWorld) -> Result<(), eyre::Report> {
    let greet = ChatCommand::new("greet", "Greets someone")
        .and_then(|command| command.with_alias("hi"))
        .and_then(|command| {
            command.with_parameter(ParameterSchema::new(
                "who",
                "Who to greet",
                ParameterType::String,
            )?)
        })
        .wrap_err("build greet command")?
        .with_handler(handler_fn(|context| async move {
            let who = context.parameters().string("who").unwrap_or("nobody");
            HandlerResult::Ok(format!("hello {who}").into())
        }));
    world.registry.add(greet).wrap_err("register greet")?;
    Ok(())
}

#[given("a registered purge command that requires managing messages")]
fn registered_purge(world: &mut DispatchWorld) -> Result<(), eyre::Report> {
    let purge = ChatCommand::new("purge", "Purges messages")
        .wrap_err("build purge command")?
        .with_permission(PermissionRule::requires(Permissions::MANAGE_MESSAGES))
        .with_handler(handler_fn(|_context| async {
            HandlerResult::Ok("purged".into())
        }));
    world.registry.add(purge).wrap_err("register purge")?;
    Ok(())
}

#[given("a registered admin command with a roles group")]
fn registered_admin(world: &mut DispatchWorld) -> Result<(), eyre::Report> {
    let add = SubCommand::new("add", "Adds a role")
        .and_then(|sub| {
            sub.with_parameter(ParameterSchema::new("role", "Role to add", ParameterType::Role)?)
        })
        .wrap_err("build add subcommand")?
        .with_handler(handler_fn(|context| async move {
            let role = context
                .parameters()
                .object("role")
                .map_or_else(String::new, |role| role.id().to_string());
            HandlerResult::Ok(format!("added {role}").into())
        }));
    let roles = SubCommandGroup::new("roles", "Role management")
        .and_then(|group| group.with_child(add))
        .wrap_err("build roles group")?;
    let admin = ChatCommand::new("admin", "Administration")
        .and_then(|command| command.with_child(roles))
        .wrap_err("build admin command")?;
    world.registry.add(admin).wrap_err("register admin")?;
    Ok(())
}

#[given("the dispatcher is started")]
fn dispatcher_started(world: &mut DispatchWorld) -> Result<(), eyre::Report> {
    world.start()
}
