//! phpsight: sandboxed project inspection for PHP codebases.
//!
//! The core modules (`sandbox`, `walker`, `search`, `analyzer`, `usages`)
//! are transport-agnostic; `tools` wraps them as named JSON operations and
//! `ipc` serves those over line-delimited JSON-RPC.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod ipc;
pub mod project;
pub mod sandbox;
pub mod search;
pub mod tools;
pub mod usages;
pub mod walker;
