//! Unit tests for permission sets, rules and access policies.

use crate::command::domain::{
    AccessDefaults, AccessPolicy, ChannelId, CheckMode, GuildId, InvocationContext,
    PermissionDenial, PermissionRule, Permissions, UserId,
};
use rstest::{fixture, rstest};

const KICK: Permissions = Permissions::KICK_MEMBERS;
const BAN: Permissions = Permissions::BAN_MEMBERS;
const ROLES: Permissions = Permissions::MANAGE_ROLES;

fn member(guild: &str, held: Permissions) -> InvocationContext {
    InvocationContext::text("m1", ChannelId::new("c1"), UserId::new("u1"))
        .in_guild(Some(GuildId::new(guild)))
        .with_permissions(Some(held))
}

#[fixture]
fn direct_message() -> InvocationContext {
    InvocationContext::text("m1", ChannelId::new("dm"), UserId::new("u1"))
}

#[fixture]
fn defaults() -> AccessDefaults {
    AccessDefaults::default()
}

#[rstest]
#[case(KICK, false)]
#[case(KICK | BAN, true)]
#[case(KICK | BAN | ROLES, true)]
fn all_mode_needs_every_bit(#[case] held: Permissions, #[case] allowed: bool) {
    let rule = PermissionRule::all(KICK | BAN);
    let result = rule.evaluate(&member("g1", held), CheckMode::Any);
    assert_eq!(result.is_ok(), allowed);
}

#[rstest]
#[case(KICK, true)]
#[case(BAN, true)]
#[case(ROLES, false)]
fn any_mode_needs_one_bit(#[case] held: Permissions, #[case] allowed: bool) {
    let rule = PermissionRule::any(KICK | BAN);
    let result = rule.evaluate(&member("g1", held), CheckMode::All);
    assert_eq!(result.is_ok(), allowed);
}

#[rstest]
#[case(CheckMode::All, false)]
#[case(CheckMode::Any, true)]
fn unset_mode_uses_default(#[case] mode: CheckMode, #[case] allowed: bool) {
    let rule = PermissionRule::requires(KICK | BAN);
    assert_eq!(rule.evaluate(&member("g1", KICK), mode).is_ok(), allowed);
}

#[test]
fn denial_reports_required_set() {
    let err = PermissionRule::all(KICK | BAN)
        .evaluate(&member("g1", KICK), CheckMode::All)
        .expect_err("partial set should be denied");
    assert_eq!(err, PermissionDenial::MissingPermissions { required: KICK | BAN });
    assert_eq!(err.required_permissions(), Some(KICK | BAN));
    assert_eq!(err.to_string(), "missing permissions: KICK_MEMBERS | BAN_MEMBERS");
}

#[rstest]
fn empty_requirement_always_passes(direct_message: InvocationContext) {
    assert!(
        PermissionRule::none()
            .evaluate(&direct_message, CheckMode::All)
            .is_ok()
    );
    assert_eq!(PermissionRule::none().required_permissions(), None);
}

#[rstest]
fn direct_messages_hold_no_permissions(direct_message: InvocationContext) {
    let err = PermissionRule::requires(KICK)
        .evaluate(&direct_message, CheckMode::All)
        .expect_err("DMs carry no member permissions");
    assert!(matches!(err, PermissionDenial::MissingPermissions { .. }));
}

#[test]
fn predicate_rules_see_the_context() {
    let only_u1 = PermissionRule::predicate(|context| context.user_id().as_str() == "u1");
    assert!(only_u1.evaluate(&member("g1", Permissions::empty()), CheckMode::All).is_ok());

    let other = InvocationContext::text("m2", ChannelId::new("c1"), UserId::new("u2"));
    assert_eq!(
        only_u1.evaluate(&other, CheckMode::All),
        Err(PermissionDenial::PredicateRejected)
    );
    assert_eq!(only_u1.required_permissions(), None);
}

#[rstest]
fn guild_scope_wins_over_permissions(defaults: AccessDefaults) {
    let policy = AccessPolicy::default().with_guilds([GuildId::new("g1")]);
    let admin = Permissions::from_bits(u64::MAX);

    assert!(policy.check(&member("g1", Permissions::empty()), defaults));
    assert_eq!(
        policy.evaluate(&member("g2", admin), defaults),
        Err(PermissionDenial::GuildNotAllowed)
    );
}

#[rstest]
fn guild_scoped_commands_reject_direct_messages(
    defaults: AccessDefaults,
    direct_message: InvocationContext,
) {
    let policy = AccessPolicy::default().with_guilds([GuildId::new("g1")]);
    assert_eq!(
        policy.evaluate(&direct_message, defaults),
        Err(PermissionDenial::GuildNotAllowed)
    );
}

#[rstest]
#[case(None, true, true)]
#[case(None, false, false)]
#[case(Some(false), true, false)]
#[case(Some(true), false, true)]
fn dm_flag_falls_back_to_default(
    direct_message: InvocationContext,
    #[case] explicit: Option<bool>,
    #[case] default_allowed: bool,
    #[case] allowed: bool,
) {
    let policy = match explicit {
        Some(flag) => AccessPolicy::default().with_dm_allowed(flag),
        None => AccessPolicy::default(),
    };
    let defaults = AccessDefaults {
        check_mode: CheckMode::All,
        dm_allowed: default_allowed,
    };

    let result = policy.evaluate(&direct_message, defaults);
    assert_eq!(result.is_ok(), allowed);
    if !allowed {
        assert_eq!(result, Err(PermissionDenial::DirectMessagesDisabled));
    }
}

#[rstest]
fn policy_applies_rule_after_scope(defaults: AccessDefaults) {
    let policy = AccessPolicy::default().with_rule(PermissionRule::requires(ROLES));
    assert!(policy.check(&member("g1", ROLES | KICK), defaults));
    assert!(!policy.check(&member("g1", KICK), defaults));
}

#[rstest]
#[case(Permissions::empty(), "NONE")]
#[case(ROLES, "MANAGE_ROLES")]
#[case(KICK | ROLES, "KICK_MEMBERS | MANAGE_ROLES")]
#[case(Permissions::from_bits(1 << 8), "0x100")]
#[case(Permissions::from_bits((1 << 8) | (1 << 3)), "ADMINISTRATOR | 0x100")]
fn permissions_display_names(#[case] permissions: Permissions, #[case] expected: &str) {
    assert_eq!(permissions.to_string(), expected);
}

#[test]
fn permission_set_operations() {
    let mut held = KICK;
    held |= BAN;
    assert!(held.contains(KICK | BAN));
    assert!(!held.contains(ROLES));
    assert!(held.intersects(BAN | ROLES));
    assert_eq!((held & BAN).bits(), BAN.bits());
    assert!(Permissions::empty().is_empty());
}
