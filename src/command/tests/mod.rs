//! Unit tests for the command module.
//!
//! Organised by layer: parameter coercion, permissions, tree invariants,
//! registry, resolution, execution, schema export and configuration.

mod config_tests;
mod permission_tests;
mod registry_tests;
