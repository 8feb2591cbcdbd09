//! Permission sets, rules and the access evaluator.
//!
//! Evaluation order is fixed: guild scope, then DM policy, then the rule
//! body. Scope and DM checks apply identically to bitfield and predicate
//! rules, so they live on [`AccessPolicy`] rather than on each rule kind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::sync::Arc;
use thiserror::Error;

use super::{GuildId, InvocationContext};

/// 64-bit platform permission set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(u64);

impl Permissions {
    /// Create instant invites.
    pub const CREATE_INSTANT_INVITE: Self = Self(1 << 0);
    /// Kick members.
    pub const KICK_MEMBERS: Self = Self(1 << 1);
    /// Ban members.
    pub const BAN_MEMBERS: Self = Self(1 << 2);
    /// Administrator (all permissions).
    pub const ADMINISTRATOR: Self = Self(1 << 3);
    /// Manage channels.
    pub const MANAGE_CHANNELS: Self = Self(1 << 4);
    /// Manage the guild.
    pub const MANAGE_GUILD: Self = Self(1 << 5);
    /// Add reactions.
    pub const ADD_REACTIONS: Self = Self(1 << 6);
    /// View the audit log.
    pub const VIEW_AUDIT_LOG: Self = Self(1 << 7);
    /// View channels.
    pub const VIEW_CHANNEL: Self = Self(1 << 10);
    /// Send messages.
    pub const SEND_MESSAGES: Self = Self(1 << 11);
    /// Manage messages.
    pub const MANAGE_MESSAGES: Self = Self(1 << 13);
    /// Embed links.
    pub const EMBED_LINKS: Self = Self(1 << 14);
    /// Attach files.
    pub const ATTACH_FILES: Self = Self(1 << 15);
    /// Mention everyone.
    pub const MENTION_EVERYONE: Self = Self(1 << 17);
    /// Mute members in voice.
    pub const MUTE_MEMBERS: Self = Self(1 << 22);
    /// Manage nicknames.
    pub const MANAGE_NICKNAMES: Self = Self(1 << 27);
    /// Manage roles.
    pub const MANAGE_ROLES: Self = Self(1 << 28);
    /// Manage webhooks.
    pub const MANAGE_WEBHOOKS: Self = Self(1 << 29);
    /// Time out members.
    pub const MODERATE_MEMBERS: Self = Self(1 << 40);

    const NAMED: [(&'static str, Self); 19] = [
        ("CREATE_INSTANT_INVITE", Self::CREATE_INSTANT_INVITE),
        ("KICK_MEMBERS", Self::KICK_MEMBERS),
        ("BAN_MEMBERS", Self::BAN_MEMBERS),
        ("ADMINISTRATOR", Self::ADMINISTRATOR),
        ("MANAGE_CHANNELS", Self::MANAGE_CHANNELS),
        ("MANAGE_GUILD", Self::MANAGE_GUILD),
        ("ADD_REACTIONS", Self::ADD_REACTIONS),
        ("VIEW_AUDIT_LOG", Self::VIEW_AUDIT_LOG),
        ("VIEW_CHANNEL", Self::VIEW_CHANNEL),
        ("SEND_MESSAGES", Self::SEND_MESSAGES),
        ("MANAGE_MESSAGES", Self::MANAGE_MESSAGES),
        ("EMBED_LINKS", Self::EMBED_LINKS),
        ("ATTACH_FILES", Self::ATTACH_FILES),
        ("MENTION_EVERYONE", Self::MENTION_EVERYONE),
        ("MUTE_MEMBERS", Self::MUTE_MEMBERS),
        ("MANAGE_NICKNAMES", Self::MANAGE_NICKNAMES),
        ("MANAGE_ROLES", Self::MANAGE_ROLES),
        ("MANAGE_WEBHOOKS", Self::MANAGE_WEBHOOKS),
        ("MODERATE_MEMBERS", Self::MODERATE_MEMBERS),
    ];

    /// Returns the empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Creates a set from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Returns `true` when no bits are set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` when every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` when `self` and `other` share at least one bit.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Permissions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Permissions {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// Renders named bits joined by ` | `; unnamed bits are shown in hex.
impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }

        let mut remaining = self.0;
        let mut parts: Vec<String> = Vec::new();
        for (name, flag) in Self::NAMED {
            if self.contains(flag) {
                parts.push(name.to_owned());
                remaining &= !flag.0;
            }
        }
        if remaining != 0 {
            parts.push(format!("{remaining:#x}"));
        }
        f.write_str(&parts.join(" | "))
    }
}

/// How a required permission set is compared with the member's set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckMode {
    /// Every required bit must be held.
    #[default]
    All,
    /// At least one required bit must be held.
    Any,
}

/// Opaque predicate over the invocation context.
#[derive(Clone)]
pub struct PermissionPredicate(Arc<dyn Fn(&InvocationContext) -> bool + Send + Sync>);

impl PermissionPredicate {
    /// Wraps a predicate function.
    pub fn new(predicate: impl Fn(&InvocationContext) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Evaluates the predicate.
    #[must_use]
    pub fn allows(&self, context: &InvocationContext) -> bool {
        (self.0)(context)
    }
}

impl fmt::Debug for PermissionPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PermissionPredicate(..)")
    }
}

/// Permission rule body.
#[derive(Debug, Clone)]
pub enum PermissionRule {
    /// Bitfield comparison against the member's permissions.
    Bits {
        /// Required permission bits.
        required: Permissions,
        /// Comparison mode; `None` uses the configured default.
        mode: Option<CheckMode>,
    },
    /// Custom predicate.
    Predicate(PermissionPredicate),
}

impl PermissionRule {
    /// A rule that always passes.
    #[must_use]
    pub const fn none() -> Self {
        Self::Bits {
            required: Permissions::empty(),
            mode: None,
        }
    }

    /// Requires `required` using the configured default mode.
    #[must_use]
    pub const fn requires(required: Permissions) -> Self {
        Self::Bits {
            required,
            mode: None,
        }
    }

    /// Requires every bit of `required`.
    #[must_use]
    pub const fn all(required: Permissions) -> Self {
        Self::Bits {
            required,
            mode: Some(CheckMode::All),
        }
    }

    /// Requires at least one bit of `required`.
    #[must_use]
    pub const fn any(required: Permissions) -> Self {
        Self::Bits {
            required,
            mode: Some(CheckMode::Any),
        }
    }

    /// Wraps a custom predicate.
    pub fn predicate(predicate: impl Fn(&InvocationContext) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(PermissionPredicate::new(predicate))
    }

    /// Returns the required bits for bitfield rules with a non-empty set.
    #[must_use]
    pub const fn required_permissions(&self) -> Option<Permissions> {
        match self {
            Self::Bits { required, .. } if !required.is_empty() => Some(*required),
            Self::Bits { .. } | Self::Predicate(_) => None,
        }
    }

    /// Evaluates the rule body.
    ///
    /// A missing member permission set (direct messages) counts as empty.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionDenial::MissingPermissions`] or
    /// [`PermissionDenial::PredicateRejected`].
    pub fn evaluate(
        &self,
        context: &InvocationContext,
        default_mode: CheckMode,
    ) -> Result<(), PermissionDenial> {
        match self {
            Self::Bits { required, mode } => {
                if required.is_empty() {
                    return Ok(());
                }
                let held = context.member_permissions().unwrap_or_default();
                let allowed = match mode.unwrap_or(default_mode) {
                    CheckMode::All => held.contains(*required),
                    CheckMode::Any => held.intersects(*required),
                };
                if allowed {
                    Ok(())
                } else {
                    Err(PermissionDenial::MissingPermissions {
                        required: *required,
                    })
                }
            }
            Self::Predicate(predicate) => {
                if predicate.allows(context) {
                    Ok(())
                } else {
                    Err(PermissionDenial::PredicateRejected)
                }
            }
        }
    }
}

impl Default for PermissionRule {
    fn default() -> Self {
        Self::none()
    }
}

/// Configured fallbacks for unset policy fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDefaults {
    /// Mode used by bitfield rules without an explicit mode.
    pub check_mode: CheckMode,
    /// Whether commands without an explicit DM flag accept DMs.
    pub dm_allowed: bool,
}

impl Default for AccessDefaults {
    fn default() -> Self {
        Self {
            check_mode: CheckMode::All,
            dm_allowed: true,
        }
    }
}

/// Guild scope, DM policy and rule of a top-level command.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    guilds: Vec<GuildId>,
    dm_allowed: Option<bool>,
    rule: PermissionRule,
}

impl AccessPolicy {
    /// Restricts the command to the given guilds.
    #[must_use]
    pub fn with_guilds(mut self, guilds: impl IntoIterator<Item = GuildId>) -> Self {
        self.guilds = guilds.into_iter().collect();
        self
    }

    /// Sets whether the command may run in direct messages.
    #[must_use]
    pub const fn with_dm_allowed(mut self, allowed: bool) -> Self {
        self.dm_allowed = Some(allowed);
        self
    }

    /// Sets the rule body.
    #[must_use]
    pub fn with_rule(mut self, rule: PermissionRule) -> Self {
        self.rule = rule;
        self
    }

    /// Returns the guild scope (empty means every guild).
    #[must_use]
    pub fn guilds(&self) -> &[GuildId] {
        &self.guilds
    }

    /// Returns the explicit DM flag, if set.
    #[must_use]
    pub const fn dm_allowed(&self) -> Option<bool> {
        self.dm_allowed
    }

    /// Returns the rule body.
    #[must_use]
    pub const fn rule(&self) -> &PermissionRule {
        &self.rule
    }

    /// Evaluates scope, DM policy and rule, in that order.
    ///
    /// # Errors
    ///
    /// Returns the first [`PermissionDenial`] encountered.
    pub fn evaluate(
        &self,
        context: &InvocationContext,
        defaults: AccessDefaults,
    ) -> Result<(), PermissionDenial> {
        if !self.guilds.is_empty() {
            let in_scope = context
                .guild_id()
                .is_some_and(|guild| self.guilds.contains(guild));
            if !in_scope {
                return Err(PermissionDenial::GuildNotAllowed);
            }
        }

        if context.guild_id().is_none() && !self.dm_allowed.unwrap_or(defaults.dm_allowed) {
            return Err(PermissionDenial::DirectMessagesDisabled);
        }

        self.rule.evaluate(context, defaults.check_mode)
    }

    /// Returns `true` when [`Self::evaluate`] passes.
    #[must_use]
    pub fn check(&self, context: &InvocationContext, defaults: AccessDefaults) -> bool {
        self.evaluate(context, defaults).is_ok()
    }
}

/// Why an invocation was denied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PermissionDenial {
    /// The invocation's guild is outside the command's scope.
    #[error("command is not available in this guild")]
    GuildNotAllowed,

    /// The command does not accept direct messages.
    #[error("command is not available in direct messages")]
    DirectMessagesDisabled,

    /// The member lacks the required permission bits.
    #[error("missing permissions: {required}")]
    MissingPermissions {
        /// Required permission bits.
        required: Permissions,
    },

    /// A custom predicate rejected the invocation.
    #[error("permission check rejected the invocation")]
    PredicateRejected,
}

impl PermissionDenial {
    /// Returns the required permission set, when the denial carries one.
    #[must_use]
    pub const fn required_permissions(&self) -> Option<Permissions> {
        match self {
            Self::MissingPermissions { required } => Some(*required),
            Self::GuildNotAllowed | Self::DirectMessagesDisabled | Self::PredicateRejected => None,
        }
    }
}
