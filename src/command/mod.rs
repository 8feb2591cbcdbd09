//! Command registry and dispatch engine.
//!
//! Turns prefixed text messages and structured interactions into one
//! canonical invocation, checks permissions, runs the handler and maps its
//! result onto the reply protocol.
//!
//! # Architecture
//!
//! - **Domain**: names, parameter schemas, permissions, the command tree,
//!   invocations and reply payloads
//! - **Ports**: handler, reply transport, publisher, entity cache and
//!   lifecycle traits
//! - **Adapters**: in-memory port implementations
//! - **Services**: registry, resolver, executor, dispatcher and publication
//! - **Config**: TOML-loadable dispatch settings
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use switchboard::command::config::DispatchConfig;
//! use switchboard::command::domain::{
//!     ChannelId, ChatCommand, ParameterSchema, ParameterType, TextMessage, UserId,
//! };
//! use switchboard::command::services::{CommandRegistry, DispatchResolver};
//!
//! let registry = Arc::new(CommandRegistry::new());
//! let greet = ChatCommand::new("greet", "Greets someone")
//!     .and_then(|command| {
//!         command.with_parameter(ParameterSchema::new("who", "Who", ParameterType::String)?)
//!     })
//!     .expect("valid command");
//! registry.add(greet).expect("registered");
//!
//! let resolver = DispatchResolver::new(Arc::clone(&registry), &DispatchConfig::default())
//!     .expect("default config is valid");
//! let message = TextMessage::new("1", ChannelId::new("c"), UserId::new("u"), "!greet bob");
//! let invocation = resolver
//!     .resolve_message(&message)
//!     .expect("resolves")
//!     .expect("is a command");
//! assert_eq!(invocation.parameters().string("who"), Some("bob"));
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
