//! Switchboard: command registry and dispatch engine for chat-platform bots.
//!
//! This crate resolves prefixed text messages and structured platform
//! interactions (slash commands, context menus, nested subcommands) into a
//! single canonical invocation, evaluates permissions, coerces parameters
//! and drives the reply protocol.
//!
//! # Architecture
//!
//! Switchboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure command model with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the platform and handlers
//! - **Adapters**: Concrete implementations of ports (in-memory)
//!
//! # Modules
//!
//! - [`command`]: Command tree, resolution, execution and publication

pub mod command;
