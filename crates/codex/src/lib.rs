//! Codex permission and plugin core.
//!
//! # Features
//!
//! - Permission catalogue with templates
//! - Role hierarchy with inheritance and wildcard roles
//! - Per-content grant/deny overrides for users and roles
//! - A decision engine combining the two
//! - Lifecycle hook bus with failure isolation
//! - Plugins with persisted enable state and configuration

#![forbid(unsafe_code)]

// Re-export shared types and adapter traits from codex-types
pub use codex_types::error;
pub use codex_types::extract;
pub use codex_types::perm_adapter;
pub use codex_types::plugin as plugin_api;
pub use codex_types::types;

// Core re-exports
pub use codex_core::catalogue;
pub use codex_core::engine;
pub use codex_core::hooks;
pub use codex_core::overrides;
pub use codex_core::plugin;
pub use codex_core::roles;

// Local modules
pub mod app;
pub mod config;
pub mod lifecycle;
pub mod logging;
pub mod prelude;

pub use crate::app::{App, AppBuilder, AppState};
pub use crate::config::Config;

// vim: ts=4
