//! Adapter implementations for command ports.

pub mod memory;
