//! CLI command implementations.

pub mod chain;
pub mod common;
pub mod consent;
pub mod devices;
