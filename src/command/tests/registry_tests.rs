//! Unit tests for the command registry.

use super::fixtures::{admin, greet};
use crate::command::domain::{
    ChatCommand, ChildNode, CommandName, CommandType, ContextMenuCommand, SubCommand,
    SubCommandGroup, TargetKind,
};
use crate::command::services::{CommandRegistry, RegisteredCommand, RegistryError};
use rstest::{fixture, rstest};

fn chat(name: &str) -> ChatCommand {
    ChatCommand::new(name, "Test command").expect("command should be valid")
}

fn menu(name: &str) -> ContextMenuCommand {
    ContextMenuCommand::new(name, TargetKind::User).expect("menu should be valid")
}

fn names(commands: &[RegisteredCommand]) -> Vec<String> {
    commands
        .iter()
        .map(|command| command.name().to_string())
        .collect()
}

#[fixture]
fn registry() -> CommandRegistry {
    let registry = CommandRegistry::new();
    registry.add(greet()).expect("greet should register");
    registry
}

#[rstest]
fn duplicate_names_are_rejected(registry: CommandRegistry) {
    let err = registry
        .add(chat("greet"))
        .expect_err("second greet should be rejected");
    assert_eq!(
        err,
        RegistryError::DuplicateName {
            namespace: CommandType::Chat,
            name: "greet".to_owned(),
        }
    );

    let original = registry
        .chat_command("greet")
        .expect("first registration should remain");
    assert_eq!(original.parameters().len(), 2);
    assert_eq!(registry.chat_commands().len(), 1);
}

#[rstest]
fn names_colliding_with_aliases_are_rejected(registry: CommandRegistry) {
    let err = registry
        .add(chat("hi"))
        .expect_err("hi is greet's alias");
    assert!(matches!(
        err,
        RegistryError::DuplicateName { ref name, .. } if name == "hi"
    ));
}

#[rstest]
fn colliding_aliases_are_dropped(registry: CommandRegistry) {
    let wave = chat("wave")
        .with_alias("greet")
        .and_then(|command| command.with_alias("hi"))
        .and_then(|command| command.with_alias("yo"))
        .expect("aliases should be valid");

    let RegisteredCommand::Chat(registered) = registry.add(wave).expect("wave should register")
    else {
        panic!("wave should be a chat command");
    };

    let aliases: Vec<&str> = registered.aliases().iter().map(CommandName::as_str).collect();
    assert_eq!(aliases, ["yo"]);
    assert_eq!(
        registry
            .chat_command("hi")
            .map(|command| command.name().to_string()),
        Some("greet".to_owned())
    );
    assert_eq!(
        registry
            .chat_command("yo")
            .map(|command| command.name().to_string()),
        Some("wave".to_owned())
    );
}

#[rstest]
fn subcommands_and_groups_are_not_top_level(registry: CommandRegistry) {
    let sub = SubCommand::new("ping", "Pings").expect("valid subcommand");
    let err = registry.add(sub).expect_err("subcommands need a parent");
    assert_eq!(err, RegistryError::NotTopLevel("ping".to_owned()));

    let group = SubCommandGroup::new("roles", "Roles").expect("valid group");
    let err = registry.add(group).expect_err("groups need a parent");
    assert_eq!(err, RegistryError::NotTopLevel("roles".to_owned()));
}

#[rstest]
fn append_extends_a_registered_command(registry: CommandRegistry) {
    let sub = SubCommand::new("formal", "Greets formally").expect("valid subcommand");
    registry
        .append("greet", sub)
        .expect("greet should accept a child");

    let command = registry
        .chat_command_exact("greet")
        .expect("greet should be registered");
    assert!(matches!(command.find_child("formal"), Some(ChildNode::Sub(_))));
}

#[rstest]
fn append_requires_a_known_parent(registry: CommandRegistry) {
    let sub = SubCommand::new("formal", "Greets formally").expect("valid subcommand");
    assert_eq!(
        registry.append("wave", sub),
        Err(RegistryError::UnknownParent("wave".to_owned()))
    );
}

#[test]
fn append_surfaces_tree_errors() {
    let registry = CommandRegistry::new();
    registry.add(admin()).expect("admin should register");

    let duplicate = SubCommand::new("ping", "Pings again").expect("valid subcommand");
    let err = registry
        .append("admin", duplicate)
        .expect_err("admin already has ping");
    assert!(matches!(err, RegistryError::Definition(_)));
}

#[rstest]
fn start_locks_the_registry(registry: CommandRegistry) {
    assert!(!registry.is_running());
    registry.start();
    registry.start();
    assert!(registry.is_running());

    assert_eq!(
        registry.add(chat("late")).map(|_| ()),
        Err(RegistryError::Locked { operation: "add" })
    );
    let sub = SubCommand::new("formal", "Greets formally").expect("valid subcommand");
    assert_eq!(
        registry.append("greet", sub),
        Err(RegistryError::Locked {
            operation: "append"
        })
    );

    assert!(registry.chat_command("late").is_none());
    let greet = registry
        .chat_command("greet")
        .expect("greet should still resolve");
    assert!(greet.children().is_empty());
}

#[test]
fn nothing_registers_after_start_returns() {
    let registry = CommandRegistry::new();

    let (accepted, locked_len) = std::thread::scope(|scope| {
        let adder = scope.spawn(|| {
            (0..200)
                .filter(|index| registry.add(chat(&format!("cmd-{index}"))).is_ok())
                .count()
        });
        std::thread::yield_now();
        registry.start();
        let locked_len = registry.chat_commands().len();
        (adder.join().expect("adder thread should finish"), locked_len)
    });

    assert_eq!(registry.chat_commands().len(), locked_len);
    assert_eq!(accepted, locked_len);
}

#[rstest]
fn namespaces_are_separate(registry: CommandRegistry) {
    registry
        .add(menu("greet"))
        .expect("menu namespace is independent");
    assert!(matches!(
        registry.add(menu("greet")),
        Err(RegistryError::DuplicateName {
            namespace: CommandType::ContextMenu,
            ..
        })
    ));

    assert!(matches!(
        registry.get("greet", Some(CommandType::ContextMenu)),
        Some(RegisteredCommand::ContextMenu(_))
    ));
    assert!(matches!(
        registry.get("greet", None),
        Some(RegisteredCommand::Chat(_))
    ));
    assert!(registry.get("hi", Some(CommandType::ContextMenu)).is_none());
}

#[rstest]
fn lookup_prefers_names_over_aliases(registry: CommandRegistry) {
    let hello = chat("hello").with_alias("hey").expect("valid alias");
    registry.add(hello).expect("hello should register");

    let found = registry.get("HELLO", None).expect("names ignore case");
    assert_eq!(found.name().as_str(), "hello");
    let found = registry.get("hi", None).expect("alias should resolve");
    assert_eq!(found.name().as_str(), "greet");
    assert!(registry.chat_command_exact("hi").is_none());
}

#[rstest]
#[case(None, &["greet", "admin", "Inspect"])]
#[case(Some(CommandType::Chat), &["greet", "admin"])]
#[case(Some(CommandType::ContextMenu), &["Inspect"])]
fn list_filters_by_type(
    registry: CommandRegistry,
    #[case] filter: Option<CommandType>,
    #[case] expected: &[&str],
) {
    registry.add(admin()).expect("admin should register");
    registry.add(menu("Inspect")).expect("menu should register");

    assert_eq!(names(&registry.list(filter)), expected);
}
