//! Domain types for the command subsystem.
//!
//! Pure values with no I/O: names, parameter schemas, the permission
//! model, the command tree, invocations, replies and the exported platform
//! schema. Nodes validate their invariants at construction.

mod error;
mod event;
mod ids;
mod invocation;
mod name;
mod node;
mod parameter;
mod permission;
mod prefix;
mod reference;
mod reply;
mod schema;

pub use error::{DefinitionError, ParameterError};
pub use event::{
    Interaction, InteractionKind, InteractionOption, LifecycleEvent, OptionKind, TextMessage,
};
pub use ids::{ChannelId, EntityId, GuildId, UserId};
pub use invocation::{
    CanonicalInvocation, InvocationContext, InvocationSource, ReplyTarget, ResolvedCommand,
};
pub use name::{CommandName, Description};
pub use node::{
    ChatCommand, ChildNode, CommandNode, CommandPath, CommandType, ContextMenuCommand, Handler,
    ParentKind, ParentRef, SubCommand, SubCommandGroup,
};
pub(crate) use parameter::validate_parameter_list;
pub use parameter::{BoundParameter, ParameterSchema, ParameterType, ParameterValue, Parameters};
pub use permission::{
    AccessDefaults, AccessPolicy, CheckMode, PermissionDenial, PermissionPredicate,
    PermissionRule, Permissions,
};
pub use prefix::{PrefixScope, PrefixTable};
pub use reference::{ObjectKind, ObjectReference, TargetKind, TargetReference};
pub use reply::{Attachment, Embed, EmbedField, ReplyOutcome, ReplyPayload};
pub use schema::{
    CHAT_INPUT_TYPE, ChoiceDescription, CommandDescription, OptionDescription, PublishScope,
    SUB_COMMAND_GROUP_OPTION_TYPE, SUB_COMMAND_OPTION_TYPE,
};
