//! Shared types, adapter traits, and error types for the Codex permission core.
//!
//! Adapter crates and plugin crates depend on this crate only, so they can
//! compile in parallel with the core.

#![forbid(unsafe_code)]

pub mod error;
pub mod extract;
pub mod perm_adapter;
pub mod plugin;
pub mod prelude;
pub mod types;

// vim: ts=4
