//! Plugin lifecycle management
//!
//! Loads enabled plugins with their persisted configuration, registers them
//! on the hook bus, and applies admin changes (enable, disable, config
//! update) to both the running plugin and the state file.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

use codex_types::plugin::Plugin;

use super::state::{PluginState, PluginStateFile};
use crate::hooks::{HookBus, Subscription};
use crate::prelude::*;

/// Plugin description for admin listings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInfo {
	pub name: String,
	pub version: String,
	pub description: String,
	pub hooks: Vec<String>,
	pub config_schema: Value,
	pub enabled: bool,
	pub loaded: bool,
	pub config: Value,
}

pub struct PluginManager {
	bus: Arc<HookBus>,
	state: PluginStateFile,
	available: Vec<Arc<dyn Plugin>>,
	// subscription of every plugin registered on the bus so far
	subscriptions: Mutex<HashMap<String, Subscription>>,
}

impl std::fmt::Debug for PluginManager {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PluginManager")
			.field("state", &self.state)
			.field("available", &self.available.iter().map(|p| p.name()).collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}

impl PluginManager {
	pub fn new(bus: Arc<HookBus>, state: PluginStateFile) -> Self {
		Self { bus, state, available: Vec::new(), subscriptions: Mutex::new(HashMap::new()) }
	}

	/// Make a plugin available. Rejects duplicate names.
	pub fn add(&mut self, plugin: Arc<dyn Plugin>) -> CxResult<()> {
		if self.find(plugin.name()).is_some() {
			return Err(Error::ConfigError(format!("duplicate plugin name: {}", plugin.name())));
		}
		self.available.push(plugin);
		Ok(())
	}

	pub fn bus(&self) -> &Arc<HookBus> {
		&self.bus
	}

	fn find(&self, name: &str) -> Option<&Arc<dyn Plugin>> {
		self.available.iter().find(|p| p.name() == name)
	}

	fn is_loaded(&self, name: &str) -> bool {
		self.subscriptions.lock().get(name).is_some_and(Subscription::is_active)
	}

	/// Load every enabled plugin. Returns the names of loaded plugins.
	/// A plugin whose `on_load` fails is logged and left unloaded.
	pub async fn load_enabled(&self) -> CxResult<Vec<String>> {
		let states = self.state.load().await?;
		let mut loaded = Vec::new();

		for plugin in &self.available {
			let state = states.get(plugin.name()).cloned().unwrap_or_default();
			if !state.enabled {
				debug!(plugin = plugin.name(), "plugin disabled");
				continue;
			}
			match self.activate(plugin, &state.config).await {
				Ok(()) => loaded.push(plugin.name().to_string()),
				Err(err) => error!(plugin = plugin.name(), "plugin failed to load: {}", err),
			}
		}
		info!(plugins = ?loaded, "plugins loaded");
		Ok(loaded)
	}

	/// `on_load` then register (or resume) on the bus
	async fn activate(&self, plugin: &Arc<dyn Plugin>, config: &Value) -> CxResult<()> {
		plugin.on_load(config).await?;

		let mut subscriptions = self.subscriptions.lock();
		if let Some(sub) = subscriptions.get(plugin.name()) {
			sub.resume();
		} else {
			let sub = self.bus.register(plugin.clone());
			subscriptions.insert(plugin.name().to_string(), sub);
		}
		info!(plugin = plugin.name(), version = plugin.version(), "plugin loaded");
		Ok(())
	}

	/// Pause on the bus then `on_unload`
	async fn deactivate(&self, plugin: &Arc<dyn Plugin>) {
		let sub = self.subscriptions.lock().get(plugin.name()).cloned();
		let Some(sub) = sub.filter(Subscription::is_active) else { return };
		sub.pause();
		if let Err(err) = plugin.on_unload().await {
			warn!(plugin = plugin.name(), "plugin failed to unload: {}", err);
		}
		info!(plugin = plugin.name(), "plugin unloaded");
	}

	pub async fn list(&self) -> CxResult<Vec<PluginInfo>> {
		let states = self.state.load().await?;
		Ok(self
			.available
			.iter()
			.map(|plugin| {
				let state = states.get(plugin.name()).cloned().unwrap_or_default();
				PluginInfo {
					name: plugin.name().to_string(),
					version: plugin.version().to_string(),
					description: plugin.description().to_string(),
					hooks: plugin.hooks().iter().map(ToString::to_string).collect(),
					config_schema: plugin.config_schema(),
					enabled: state.enabled,
					loaded: self.is_loaded(plugin.name()),
					config: state.config,
				}
			})
			.collect())
	}

	/// Enable and load a plugin. If `on_load` fails the plugin stays
	/// disabled and the error is returned.
	pub async fn enable(&self, name: &str) -> CxResult<()> {
		let plugin = self.find(name).ok_or(Error::NotFound)?.clone();
		if self.is_loaded(name) {
			self.set_state(name, |state| state.enabled = true).await?;
			return Ok(());
		}

		let config = self.state.load().await?.get(name).cloned().unwrap_or_default().config;
		if let Err(err) = self.activate(&plugin, &config).await {
			warn!(plugin = name, "plugin not enabled: {}", err);
			return Err(err);
		}
		if let Err(err) = self.set_state(name, |state| state.enabled = true).await {
			self.deactivate(&plugin).await;
			return Err(err);
		}
		Ok(())
	}

	pub async fn disable(&self, name: &str) -> CxResult<()> {
		let plugin = self.find(name).ok_or(Error::NotFound)?.clone();
		self.set_state(name, |state| state.enabled = false).await?;
		self.deactivate(&plugin).await;
		Ok(())
	}

	/// Replace a plugin's config. A loaded plugin is reloaded with it; if
	/// the reload fails the previous config is kept (persisted and loaded)
	/// and the error is returned.
	pub async fn update_config(&self, name: &str, config: Value) -> CxResult<()> {
		let plugin = self.find(name).ok_or(Error::NotFound)?.clone();
		if !self.is_loaded(name) {
			self.set_state(name, |state| state.config = config).await?;
			return Ok(());
		}

		let previous = self.state.load().await?.get(name).cloned().unwrap_or_default().config;
		self.deactivate(&plugin).await;
		if let Err(err) = self.activate(&plugin, &config).await {
			warn!(plugin = name, "config rejected, restoring previous config: {}", err);
			if let Err(restore_err) = self.activate(&plugin, &previous).await {
				error!(plugin = name, "plugin failed to reload previous config: {}", restore_err);
			}
			return Err(err);
		}
		self.set_state(name, |state| state.config = config).await?;
		Ok(())
	}

	async fn set_state<F>(&self, name: &str, f: F) -> CxResult<PluginState>
	where
		F: FnOnce(&mut PluginState),
	{
		self.state
			.modify(|states| {
				let state = states.entry(name.to_string()).or_default();
				f(state);
				Ok(state.clone())
			})
			.await
	}

	/// Unload every loaded plugin
	pub async fn shutdown(&self) {
		for plugin in &self.available {
			self.deactivate(plugin).await;
		}
	}
}

// vim: ts=4
