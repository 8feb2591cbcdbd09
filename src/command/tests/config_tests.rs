//! Unit tests for dispatch configuration and system messages.

use crate::command::config::{
    ConfigError, DEFAULT_HANDLER_TIMEOUT_SECS, DispatchConfig, SystemMessageTemplates,
};
use crate::command::domain::{
    CheckMode, DefinitionError, GuildId, ParameterError, PermissionDenial, Permissions,
};
use crate::command::services::{DispatchError, SystemMessageKind, SystemMessages};
use rstest::{fixture, rstest};
use std::time::Duration;

#[fixture]
fn messages() -> SystemMessages {
    SystemMessages::new(SystemMessageTemplates::default())
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn defaults_are_valid() {
    let config = DispatchConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.prefix, "!");
    assert_eq!(config.parameter_separator, ",");
    assert_eq!(config.command_separator, "/");
    assert_eq!(
        config.handler_timeout(),
        Duration::from_secs(DEFAULT_HANDLER_TIMEOUT_SECS)
    );
    assert!(config.access_defaults().dm_allowed);
}

#[test]
fn empty_documents_use_defaults() {
    let config = DispatchConfig::from_toml_str("").expect("empty TOML should load");
    assert_eq!(config, DispatchConfig::default());
}

#[test]
fn toml_overrides_apply() {
    let config = DispatchConfig::from_toml_str(
        r#"
        prefix = "?"
        parameter_separator = ";"
        default_check_mode = "any"
        default_dm_allowed = false
        announce_success = true
        handler_timeout_secs = 30

        [guild_prefixes]
        "100" = "$"

        [system_messages]
        not_found = "No `{{ command }}` here."
        "#,
    )
    .expect("TOML should load");

    assert_eq!(config.prefix, "?");
    assert_eq!(config.parameter_separator, ";");
    assert_eq!(config.access_defaults().check_mode, CheckMode::Any);
    assert!(!config.access_defaults().dm_allowed);
    assert!(config.announce_success);
    assert_eq!(config.handler_timeout(), Duration::from_secs(30));
    assert_eq!(
        config.system_messages.not_found,
        "No `{{ command }}` here."
    );
    assert_eq!(
        config.system_messages.success,
        SystemMessageTemplates::default().success
    );

    let mut table = config.prefix_table().expect("prefixes should be valid");
    assert_eq!(table.prefix_for(Some(&GuildId::new("100"))), "$");
    assert_eq!(table.prefix_for(Some(&GuildId::new("200"))), "?");
    assert_eq!(table.prefix_for(None), "?");

    assert_eq!(table.clear(&GuildId::new("100")), Some("$".to_owned()));
    assert_eq!(table.prefix_for(Some(&GuildId::new("100"))), table.global());
}

#[test]
fn unknown_keys_are_rejected() {
    let err = DispatchConfig::from_toml_str("prefixes = \"!\"").expect_err("typo should fail");
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[rstest]
#[case("command_separator = \",\"", DefinitionError::SeparatorCollision(",".to_owned()))]
#[case("parameter_separator = \" \"", DefinitionError::InvalidSeparator(" ".to_owned()))]
#[case("command_separator = \"\"", DefinitionError::InvalidSeparator(String::new()))]
#[case("prefix = \"! \"", DefinitionError::InvalidPrefix("! ".to_owned()))]
fn invalid_settings_are_rejected(#[case] source: &str, #[case] expected: DefinitionError) {
    let err = DispatchConfig::from_toml_str(source).expect_err("setting should be rejected");
    assert!(matches!(err, ConfigError::Definition(ref found) if *found == expected));
}

#[test]
fn invalid_guild_prefixes_are_rejected() {
    let err = DispatchConfig::from_toml_str("[guild_prefixes]\n\"100\" = \"\"")
        .expect_err("empty guild prefix should fail");
    assert!(matches!(
        err,
        ConfigError::Definition(DefinitionError::InvalidPrefix(_))
    ));
}

#[test]
fn zero_timeout_is_rejected() {
    let err = DispatchConfig::from_toml_str("handler_timeout_secs = 0")
        .expect_err("zero deadline should fail");
    assert!(matches!(err, ConfigError::ZeroTimeout));
}

#[test]
fn broken_templates_are_rejected() {
    let err = DispatchConfig::from_toml_str("[system_messages]\nerror = \"{{ detail \"")
        .expect_err("unterminated expression should fail");
    assert!(matches!(err, ConfigError::Template { name: "error", .. }));
}

// ============================================================================
// System messages
// ============================================================================

#[rstest]
fn not_found_names_the_command(messages: SystemMessages) {
    let err = DispatchError::CommandNotFound("wave".to_owned());
    assert_eq!(SystemMessageKind::for_error(&err), SystemMessageKind::NotFound);
    assert_eq!(messages.for_error(&err), "Command `wave` was not found.");
}

#[rstest]
fn permission_denials_list_missing_bits(messages: SystemMessages) {
    let err = DispatchError::Permissions {
        command: "admin roles add".to_owned(),
        denial: PermissionDenial::MissingPermissions {
            required: Permissions::MANAGE_ROLES,
        },
    };
    assert_eq!(
        messages.for_error(&err),
        "You do not have permission to use `admin roles add`. Required: MANAGE_ROLES."
    );

    let scoped = DispatchError::Permissions {
        command: "admin".to_owned(),
        denial: PermissionDenial::GuildNotAllowed,
    };
    assert_eq!(
        messages.for_error(&scoped),
        "You do not have permission to use `admin`."
    );
}

#[rstest]
fn other_failures_use_the_error_template(messages: SystemMessages) {
    let err = DispatchError::Parameter {
        command: "greet".to_owned(),
        source: ParameterError::Missing {
            parameter: "who".to_owned(),
        },
    };
    assert_eq!(SystemMessageKind::for_error(&err), SystemMessageKind::Error);
    assert_eq!(
        messages.for_error(&err),
        "Command `greet` failed: missing required parameter 'who'"
    );
}

#[rstest]
fn success_names_the_command(messages: SystemMessages) {
    assert_eq!(messages.for_success("quiet"), "Command `quiet` completed.");
}

#[test]
fn render_failures_fall_back_to_plain_text() {
    let templates = SystemMessageTemplates {
        success: "{{ command | missing_filter }}".to_owned(),
        ..SystemMessageTemplates::default()
    };
    let messages = SystemMessages::new(templates);

    assert_eq!(messages.for_success("quiet"), "quiet completed.");
}
