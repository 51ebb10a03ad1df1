//! Analytics plugin: counts lifecycle events per hook

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use codex_core::hooks::KNOWN_HOOKS;
use codex_types::plugin::{HookPayload, Plugin};
use codex_types::prelude::*;

#[derive(Debug, Default)]
pub struct AnalyticsPlugin {
	counts: Mutex<BTreeMap<String, u64>>,
}

impl AnalyticsPlugin {
	pub fn new() -> Self {
		Self::default()
	}

	/// Snapshot of the counters
	pub fn counts(&self) -> BTreeMap<String, u64> {
		self.counts.lock().clone()
	}
}

#[async_trait]
impl Plugin for AnalyticsPlugin {
	fn name(&self) -> &str {
		"analytics"
	}

	fn version(&self) -> &str {
		"1.0.0"
	}

	fn description(&self) -> &str {
		"Counts content and user events"
	}

	fn hooks(&self) -> &[&str] {
		KNOWN_HOOKS
	}

	async fn handle_hook(&self, hook: &str, _payload: &HookPayload) -> CxResult<Value> {
		let mut counts = self.counts.lock();
		let count = counts.entry(hook.to_string()).or_default();
		*count += 1;
		Ok(json!({ "hook": hook, "count": *count }))
	}

	async fn on_unload(&self) -> CxResult<()> {
		debug!(counts = ?self.counts.lock(), "analytics counters at unload");
		Ok(())
	}
}


// vim: ts=4
