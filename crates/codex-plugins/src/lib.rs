//! Built-in plugins shipped with Codex.
//!
//! Each plugin reads its configuration slice in `on_load` and keeps it
//! behind a lock, since plugins are shared and called through `&self`.

#![forbid(unsafe_code)]

pub mod analytics;
pub mod custom_fields;
pub mod seo;
pub mod social;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use codex_types::plugin::{HookPayload, Plugin};
use codex_types::prelude::*;

pub use analytics::AnalyticsPlugin;
pub use custom_fields::CustomFieldsPlugin;
pub use seo::SeoPlugin;
pub use social::SocialPlugin;

/// Every built-in plugin, in registration order
pub fn builtin_plugins() -> Vec<Arc<dyn Plugin>> {
	vec![
		Arc::new(SeoPlugin::new()),
		Arc::new(AnalyticsPlugin::new()),
		Arc::new(SocialPlugin::new()),
		Arc::new(CustomFieldsPlugin::new()),
	]
}

/// Parse a plugin config slice. `null` means defaults.
pub(crate) fn parse_config<T: DeserializeOwned + Default>(plugin: &str, config: &Value) -> CxResult<T> {
	if config.is_null() {
		return Ok(T::default());
	}
	serde_json::from_value(config.clone())
		.map_err(|err| Error::ConfigError(format!("{} plugin: {}", plugin, err)))
}

pub(crate) fn payload_str<'a>(payload: &'a HookPayload, key: &str) -> Option<&'a str> {
	payload.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_builtin_names_are_unique() {
		let plugins = builtin_plugins();
		let mut names: Vec<&str> = plugins.iter().map(|p| p.name()).collect();
		names.sort_unstable();
		names.dedup();
		assert_eq!(names.len(), plugins.len());
	}

	#[test]
	fn test_builtin_hooks_are_known() {
		for plugin in builtin_plugins() {
			for hook in plugin.hooks() {
				assert!(codex_core::hooks::KNOWN_HOOKS.contains(hook), "{} uses {}", plugin.name(), hook);
			}
		}
	}
}

// vim: ts=4
