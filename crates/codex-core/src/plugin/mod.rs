//! Plugin state persistence and lifecycle management

pub mod manager;
pub mod state;

pub use manager::{PluginInfo, PluginManager};
pub use state::{PluginState, PluginStateFile, PluginStates};

// vim: ts=4
