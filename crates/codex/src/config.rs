//! Runtime configuration
//!
//! Read from the YAML file named by `CODEX_CONFIG` (if set), then overridden
//! by `CODEX_DATA_DIR`, `CODEX_LOG` and `CODEX_HOOK_TIMEOUT_MS`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::prelude::*;

pub const ENV_CONFIG: &str = "CODEX_CONFIG";
pub const ENV_DATA_DIR: &str = "CODEX_DATA_DIR";
pub const ENV_LOG: &str = "CODEX_LOG";
pub const ENV_HOOK_TIMEOUT_MS: &str = "CODEX_HOOK_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	pub data_dir: PathBuf,
	/// Permission database, relative to `data_dir` unless absolute
	pub db_file: PathBuf,
	/// Plugin state document, relative to `data_dir` unless absolute
	pub plugin_state_file: PathBuf,
	/// Default tracing filter; `RUST_LOG` takes precedence
	pub log_filter: String,
	/// Per-handler hook timeout. Unset or 0 disables it.
	pub hook_timeout_ms: Option<u64>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			data_dir: PathBuf::from("./data"),
			db_file: PathBuf::from("perm.db"),
			plugin_state_file: PathBuf::from("plugins.json"),
			log_filter: "info".into(),
			hook_timeout_ms: None,
		}
	}
}

fn yaml_error(err: &serde_yaml::Error) -> Error {
	Error::ConfigError(format!("invalid config: {}", err))
}

impl Config {
	pub fn from_yaml(yaml: &str) -> CxResult<Self> {
		if yaml.trim().is_empty() {
			return Ok(Self::default());
		}
		serde_yaml::from_str(yaml).map_err(|err| yaml_error(&err))
	}

	pub async fn load_file(path: impl AsRef<Path>) -> CxResult<Self> {
		let path = path.as_ref();
		let yaml = tokio::fs::read_to_string(path).await.map_err(|err| {
			Error::ConfigError(format!("cannot read config {}: {}", path.display(), err))
		})?;
		Self::from_yaml(&yaml)
	}

	/// Apply environment overrides; `var` looks up a variable by name
	pub fn apply_env<F>(&mut self, var: F) -> CxResult<()>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(dir) = var(ENV_DATA_DIR) {
			self.data_dir = dir.into();
		}
		if let Some(filter) = var(ENV_LOG) {
			self.log_filter = filter;
		}
		if let Some(ms) = var(ENV_HOOK_TIMEOUT_MS) {
			let ms = ms.trim().parse().map_err(|_| {
				Error::ConfigError(format!("{} must be a number of milliseconds: {}", ENV_HOOK_TIMEOUT_MS, ms))
			})?;
			self.hook_timeout_ms = Some(ms);
		}
		Ok(())
	}

	/// Load the configuration the way the server binary does
	pub async fn from_env() -> CxResult<Self> {
		let mut config = match std::env::var(ENV_CONFIG) {
			Ok(path) => Self::load_file(path).await?,
			Err(_) => Self::default(),
		};
		config.apply_env(|name| std::env::var(name).ok())?;
		Ok(config)
	}

	pub fn db_path(&self) -> PathBuf {
		self.data_dir.join(&self.db_file)
	}

	pub fn plugin_state_path(&self) -> PathBuf {
		self.data_dir.join(&self.plugin_state_file)
	}

	pub fn hook_timeout(&self) -> Option<Duration> {
		self.hook_timeout_ms.filter(|&ms| ms > 0).map(Duration::from_millis)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	#[test]
	fn test_defaults() {
		let config = Config::from_yaml("").unwrap();
		assert_eq!(config, Config::default());
		assert_eq!(config.db_path(), PathBuf::from("./data/perm.db"));
		assert_eq!(config.hook_timeout(), None);
	}

	#[test]
	fn test_partial_yaml() {
		let config = Config::from_yaml("data_dir: /var/lib/codex\nhook_timeout_ms: 250\n").unwrap();
		assert_eq!(config.plugin_state_path(), PathBuf::from("/var/lib/codex/plugins.json"));
		assert_eq!(config.hook_timeout(), Some(Duration::from_millis(250)));
		assert_eq!(config.log_filter, "info");
	}

	#[test]
	fn test_absolute_file_ignores_data_dir() {
		let config = Config::from_yaml("db_file: /tmp/other.db").unwrap();
		assert_eq!(config.db_path(), PathBuf::from("/tmp/other.db"));
	}

	#[test]
	fn test_invalid_yaml() {
		assert!(matches!(Config::from_yaml("data_dir: [1, 2"), Err(Error::ConfigError(_))));
		assert!(matches!(Config::from_yaml("listen: 0.0.0.0"), Err(Error::ConfigError(_))));
	}

	#[test]
	fn test_env_overrides() {
		let env: HashMap<&str, &str> =
			[(ENV_DATA_DIR, "/srv/codex"), (ENV_LOG, "debug"), (ENV_HOOK_TIMEOUT_MS, "0")].into();
		let mut config = Config::default();
		config.apply_env(|name| env.get(name).map(ToString::to_string)).unwrap();

		assert_eq!(config.data_dir, PathBuf::from("/srv/codex"));
		assert_eq!(config.log_filter, "debug");
		assert_eq!(config.hook_timeout_ms, Some(0));
		assert_eq!(config.hook_timeout(), None);
	}

	#[test]
	fn test_bad_timeout_env() {
		let mut config = Config::default();
		let res = config.apply_env(|name| (name == ENV_HOOK_TIMEOUT_MS).then(|| "soon".to_string()));
		assert!(matches!(res, Err(Error::ConfigError(_))));
	}
}

// vim: ts=4
