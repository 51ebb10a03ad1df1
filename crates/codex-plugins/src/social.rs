//! Social plugin: share links for published content

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use url::Url;

use codex_core::hooks::CONTENT_PUBLISHED;
use codex_types::plugin::{HookPayload, Plugin};
use codex_types::prelude::*;

use crate::{parse_config, payload_str};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
	Twitter,
	Facebook,
	Linkedin,
}

impl Network {
	fn key(self) -> &'static str {
		match self {
			Network::Twitter => "twitter",
			Network::Facebook => "facebook",
			Network::Linkedin => "linkedin",
		}
	}

	fn share_link(self, target: &str, title: &str) -> CxResult<Url> {
		let res = match self {
			Network::Twitter => Url::parse_with_params(
				"https://twitter.com/intent/tweet",
				&[("url", target), ("text", title)],
			),
			Network::Facebook => {
				Url::parse_with_params("https://www.facebook.com/sharer/sharer.php", &[("u", target)])
			}
			Network::Linkedin => Url::parse_with_params(
				"https://www.linkedin.com/sharing/share-offsite/",
				&[("url", target)],
			),
		};
		res.map_err(|err| Error::Internal(err.to_string()))
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SocialConfig {
	pub networks: Vec<Network>,
	/// Public site URL; content links are `<base_url>/<slug>`
	pub base_url: Option<String>,
}

impl Default for SocialConfig {
	fn default() -> Self {
		Self { networks: vec![Network::Twitter, Network::Facebook, Network::Linkedin], base_url: None }
	}
}

#[derive(Debug, Default)]
pub struct SocialPlugin {
	config: RwLock<SocialConfig>,
}

impl SocialPlugin {
	pub fn new() -> Self {
		Self::default()
	}

	fn target_url(config: &SocialConfig, payload: &HookPayload) -> CxResult<String> {
		if let Some(url) = payload_str(payload, "url") {
			return Ok(url.to_string());
		}
		let slug = payload_str(payload, "slug")
			.ok_or_else(|| Error::Parse("social plugin: payload has neither url nor slug".into()))?;
		let base = config
			.base_url
			.as_deref()
			.ok_or_else(|| Error::ConfigError("social plugin: baseUrl is not configured".into()))?;
		Ok(format!("{}/{}", base.trim_end_matches('/'), slug))
	}
}

#[async_trait]
impl Plugin for SocialPlugin {
	fn name(&self) -> &str {
		"social"
	}

	fn version(&self) -> &str {
		"1.0.0"
	}

	fn description(&self) -> &str {
		"Builds share links when content is published"
	}

	fn hooks(&self) -> &[&str] {
		&[CONTENT_PUBLISHED]
	}

	fn config_schema(&self) -> Value {
		json!({
			"type": "object",
			"properties": {
				"networks": {
					"type": "array",
					"items": { "enum": ["twitter", "facebook", "linkedin"] }
				},
				"baseUrl": { "type": "string", "format": "uri" }
			}
		})
	}

	async fn on_load(&self, config: &Value) -> CxResult<()> {
		let config: SocialConfig = parse_config(self.name(), config)?;
		if let Some(base) = &config.base_url {
			Url::parse(base)
				.map_err(|err| Error::ConfigError(format!("social plugin: baseUrl: {}", err)))?;
		}
		*self.config.write() = config;
		Ok(())
	}

	async fn handle_hook(&self, _hook: &str, payload: &HookPayload) -> CxResult<Value> {
		let config = self.config.read().clone();
		let target = Self::target_url(&config, payload)?;
		let title = payload_str(payload, "title").unwrap_or_default();

		let mut links = Map::new();
		for network in config.networks {
			links.insert(network.key().into(), Value::String(network.share_link(&target, title)?.into()));
		}
		Ok(json!({ "url": target, "shareLinks": links }))
	}
}


// vim: ts=4
