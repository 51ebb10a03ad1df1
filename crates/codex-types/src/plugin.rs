//! Plugin contract for hook subscribers.

use async_trait::async_trait;
use serde_json::Value;

use crate::prelude::*;

/// Event payload passed to hook handlers
pub type HookPayload = serde_json::Map<String, Value>;

/// A unit that subscribes to lifecycle hooks.
///
/// Every lifecycle method has a no-op default, so a plugin only overrides
/// what it uses. Plugins are shared behind `Arc` and called through `&self`;
/// state set up in `on_load` needs interior mutability.
#[async_trait]
pub trait Plugin: Send + Sync {
	/// Unique plugin name, also the key of its persisted state
	fn name(&self) -> &str;

	fn version(&self) -> &str;

	fn description(&self) -> &str {
		""
	}

	/// Hook names this plugin subscribes to
	fn hooks(&self) -> &[&str] {
		&[]
	}

	/// JSON schema of the plugin configuration (for admin form generation)
	fn config_schema(&self) -> Value {
		Value::Object(serde_json::Map::new())
	}

	/// Called once when the plugin is loaded, with its persisted config slice
	async fn on_load(&self, _config: &Value) -> CxResult<()> {
		Ok(())
	}

	/// Called for every dispatched event the plugin subscribes to
	async fn handle_hook(&self, _hook: &str, _payload: &HookPayload) -> CxResult<Value> {
		Ok(Value::Null)
	}

	/// Called on shutdown or disablement
	async fn on_unload(&self) -> CxResult<()> {
		Ok(())
	}
}

impl std::fmt::Debug for dyn Plugin {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Plugin")
			.field("name", &self.name())
			.field("version", &self.version())
			.field("hooks", &self.hooks())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Bare;

	#[async_trait]
	impl Plugin for Bare {
		fn name(&self) -> &str {
			"bare"
		}
		fn version(&self) -> &str {
			"0.1.0"
		}
	}

	#[tokio::test]
	async fn test_defaults_are_noops() {
		let plugin = Bare;
		assert!(plugin.hooks().is_empty());
		assert_eq!(plugin.description(), "");
		assert!(plugin.on_load(&Value::Null).await.is_ok());
		let res = plugin.handle_hook("content.published", &HookPayload::new()).await.unwrap();
		assert_eq!(res, Value::Null);
		assert!(plugin.on_unload().await.is_ok());
	}
}

// vim: ts=4
