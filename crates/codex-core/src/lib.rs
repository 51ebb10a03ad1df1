//! Permission core of the Codex content-management backend.
//!
//! - `catalogue`: permission tokens and templates
//! - `roles`: role table and inheritance resolution
//! - `overrides`: object-level grant/deny overrides
//! - `engine`: the permission decision engine
//! - `hooks`: lifecycle event bus
//! - `plugin`: plugin state and lifecycle

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod catalogue;
pub mod engine;
pub mod hooks;
pub mod overrides;
pub mod plugin;
pub mod prelude;
pub mod roles;

pub use catalogue::Catalogue;
pub use engine::PermissionEngine;
pub use hooks::{HookBus, Subscription};
pub use overrides::{OverrideRequest, OverrideStore};
pub use roles::{Permissions, RoleTable};

// vim: ts=4
