//! Persisted plugin state
//!
//! A single JSON document keyed by plugin name:
//! `{ "seo": { "enabled": true, "config": { ... } } }`.
//! Every mutation rewrites the whole document.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::prelude::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginState {
	#[serde(default = "default_enabled")]
	pub enabled: bool,
	#[serde(default = "empty_config")]
	pub config: Value,
}

fn default_enabled() -> bool {
	true
}

fn empty_config() -> Value {
	Value::Object(serde_json::Map::new())
}

impl Default for PluginState {
	fn default() -> Self {
		Self { enabled: default_enabled(), config: empty_config() }
	}
}

pub type PluginStates = BTreeMap<String, PluginState>;

/// File-backed plugin state; read-modify-write cycles are serialized
#[derive(Debug)]
pub struct PluginStateFile {
	path: PathBuf,
	lock: Mutex<()>,
}

impl PluginStateFile {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into(), lock: Mutex::new(()) }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Load the whole document. A missing file is an empty document.
	pub async fn load(&self) -> CxResult<PluginStates> {
		let _guard = self.lock.lock().await;
		self.read_unlocked().await
	}

	/// Apply `f` to the loaded document and write it back
	pub async fn modify<F, T>(&self, f: F) -> CxResult<T>
	where
		F: FnOnce(&mut PluginStates) -> CxResult<T>,
	{
		let _guard = self.lock.lock().await;
		let mut states = self.read_unlocked().await?;
		let res = f(&mut states)?;
		self.write_unlocked(&states).await?;
		Ok(res)
	}

	async fn read_unlocked(&self) -> CxResult<PluginStates> {
		match tokio::fs::read(&self.path).await {
			Ok(data) if data.iter().all(u8::is_ascii_whitespace) => Ok(PluginStates::new()),
			Ok(data) => Ok(serde_json::from_slice(&data)?),
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(PluginStates::new()),
			Err(err) => {
				warn!(path = %self.path.display(), "cannot read plugin state: {}", err);
				Err(err.into())
			}
		}
	}

	async fn write_unlocked(&self, states: &PluginStates) -> CxResult<()> {
		if let Some(dir) = self.path.parent() {
			if !dir.as_os_str().is_empty() {
				tokio::fs::create_dir_all(dir).await?;
			}
		}
		let data = serde_json::to_vec_pretty(states)?;
		let tmp = self.path.with_extension("json.tmp");
		tokio::fs::write(&tmp, data).await?;
		tokio::fs::rename(&tmp, &self.path).await?;
		Ok(())
	}
}


// vim: ts=4
