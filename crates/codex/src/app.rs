//! App builder - wires the permission engine, hook bus and plugins

use std::sync::Arc;

use codex_core::PermissionEngine;
use codex_core::hooks::HookBus;
use codex_core::plugin::{PluginManager, PluginStateFile};
use codex_types::perm_adapter::PermAdapter;
use codex_types::plugin::Plugin;

use crate::config::Config;
use crate::prelude::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub engine: PermissionEngine,
	pub hooks: Arc<HookBus>,
	pub plugins: PluginManager,
	pub config: Config,
}

impl std::fmt::Debug for AppState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppState")
			.field("hooks", &self.hooks)
			.field("plugins", &self.plugins)
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}

impl AppState {
	/// Unload plugins; call once before exit
	pub async fn shutdown(&self) {
		info!("shutting down");
		self.plugins.shutdown().await;
	}
}

pub type App = Arc<AppState>;

pub struct AppBuilder {
	config: Config,
	perm_adapter: Option<Arc<dyn PermAdapter>>,
	plugins: Vec<Arc<dyn Plugin>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		AppBuilder { config: Config::default(), perm_adapter: None, plugins: Vec::new() }
	}

	pub fn config(&mut self, config: Config) -> &mut Self {
		self.config = config;
		self
	}

	// Adapters
	pub fn perm_adapter(&mut self, perm_adapter: Arc<dyn PermAdapter>) -> &mut Self {
		self.perm_adapter = Some(perm_adapter);
		self
	}

	// Plugins, registered on the bus in the order given
	pub fn plugin(&mut self, plugin: Arc<dyn Plugin>) -> &mut Self {
		self.plugins.push(plugin);
		self
	}
	pub fn plugins(&mut self, plugins: impl IntoIterator<Item = Arc<dyn Plugin>>) -> &mut Self {
		self.plugins.extend(plugins);
		self
	}

	/// Validate the static tables, seed role records and load enabled plugins
	pub async fn build(self) -> CxResult<App> {
		info!("codex v{}", VERSION);

		let Some(perm_adapter) = self.perm_adapter else {
			error!("FATAL: No permission adapter configured");
			return Err(Error::ConfigError("No permission adapter configured".to_string()));
		};

		let engine = PermissionEngine::builtin(perm_adapter);
		let seeded = engine.seed_roles().await.inspect_err(|err| {
			error!("FATAL: Cannot initialize roles: {}", err);
		})?;
		info!(seeded, "roles initialized");

		let hooks = Arc::new(match self.config.hook_timeout() {
			Some(timeout) => HookBus::with_timeout(timeout),
			None => HookBus::new(),
		});

		let mut plugins =
			PluginManager::new(hooks.clone(), PluginStateFile::new(self.config.plugin_state_path()));
		for plugin in self.plugins {
			plugins.add(plugin)?;
		}
		plugins.load_enabled().await?;

		Ok(Arc::new(AppState { engine, hooks, plugins, config: self.config }))
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
