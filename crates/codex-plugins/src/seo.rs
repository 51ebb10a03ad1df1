//! SEO plugin: slug and meta description for content

use std::sync::LazyLock;

use async_trait::async_trait;
use parking_lot::RwLock;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};

use codex_core::hooks::{CONTENT_CREATED, CONTENT_PUBLISHED, CONTENT_UPDATED};
use codex_types::plugin::{HookPayload, Plugin};
use codex_types::prelude::*;

use crate::{parse_config, payload_str};

static NON_SLUG: LazyLock<Result<Regex, regex::Error>> =
	LazyLock::new(|| Regex::new(r"[^a-z0-9]+"));

const DEFAULT_DESCRIPTION_LENGTH: usize = 160;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeoConfig {
	pub description_length: usize,
}

impl Default for SeoConfig {
	fn default() -> Self {
		Self { description_length: DEFAULT_DESCRIPTION_LENGTH }
	}
}

#[derive(Debug, Default)]
pub struct SeoPlugin {
	config: RwLock<SeoConfig>,
}

impl SeoPlugin {
	pub fn new() -> Self {
		Self::default()
	}
}

/// Lowercase ASCII slug, runs of other characters collapse to one dash
pub fn slugify(title: &str) -> CxResult<String> {
	let re = NON_SLUG.as_ref().map_err(|err| Error::Internal(err.to_string()))?;
	let lower = title.to_lowercase();
	Ok(re.replace_all(&lower, "-").trim_matches('-').to_string())
}

/// Collapse whitespace and cut at a word boundary within `max` characters
pub fn meta_description(body: &str, max: usize) -> String {
	let text = body.split_whitespace().collect::<Vec<_>>().join(" ");
	if text.chars().count() <= max {
		return text;
	}
	let cut: String = text.chars().take(max).collect();
	match cut.rfind(' ') {
		Some(pos) if pos > 0 => cut[..pos].to_string(),
		_ => cut,
	}
}

#[async_trait]
impl Plugin for SeoPlugin {
	fn name(&self) -> &str {
		"seo"
	}

	fn version(&self) -> &str {
		"1.0.0"
	}

	fn description(&self) -> &str {
		"Generates slugs and meta descriptions"
	}

	fn hooks(&self) -> &[&str] {
		&[CONTENT_CREATED, CONTENT_UPDATED, CONTENT_PUBLISHED]
	}

	fn config_schema(&self) -> Value {
		json!({
			"type": "object",
			"properties": {
				"descriptionLength": { "type": "integer", "minimum": 1, "default": DEFAULT_DESCRIPTION_LENGTH }
			}
		})
	}

	async fn on_load(&self, config: &Value) -> CxResult<()> {
		let config: SeoConfig = parse_config(self.name(), config)?;
		if config.description_length == 0 {
			return Err(Error::ConfigError("seo plugin: descriptionLength must be positive".into()));
		}
		*self.config.write() = config;
		Ok(())
	}

	async fn handle_hook(&self, _hook: &str, payload: &HookPayload) -> CxResult<Value> {
		let title = payload_str(payload, "title")
			.ok_or_else(|| Error::Parse("seo plugin: payload has no title".into()))?;
		let body = payload_str(payload, "body").unwrap_or_default();
		let max = self.config.read().description_length;

		Ok(json!({
			"contentId": payload.get("contentId"),
			"slug": slugify(title)?,
			"metaDescription": meta_description(body, max),
		}))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_slugify() {
		assert_eq!(slugify("Hello, World!").unwrap(), "hello-world");
		assert_eq!(slugify("  Rust 2024 -- Edition ").unwrap(), "rust-2024-edition");
		assert_eq!(slugify("!!!").unwrap(), "");
	}

	#[test]
	fn test_meta_description_cuts_on_word() {
		assert_eq!(meta_description("short\n text", 20), "short text");
		assert_eq!(meta_description("one two three four", 10), "one two");
		assert_eq!(meta_description("abcdefghijkl", 5), "abcde");
	}

	#[tokio::test]
	async fn test_handle_hook_uses_configured_length() {
		let plugin = SeoPlugin::new();
		plugin.on_load(&json!({"descriptionLength": 9})).await.unwrap();

		let mut payload = HookPayload::new();
		payload.insert("contentId".into(), json!(4));
		payload.insert("title".into(), json!("My First Post"));
		payload.insert("body".into(), json!("Lorem ipsum dolor sit amet"));

		let res = plugin.handle_hook(CONTENT_PUBLISHED, &payload).await.unwrap();
		assert_eq!(res, json!({"contentId": 4, "slug": "my-first-post", "metaDescription": "Lorem"}));
	}

	#[tokio::test]
	async fn test_missing_title_is_an_error() {
		let plugin = SeoPlugin::new();
		assert!(plugin.handle_hook(CONTENT_CREATED, &HookPayload::new()).await.is_err());
	}

	#[tokio::test]
	async fn test_invalid_config_fails_load() {
		let plugin = SeoPlugin::new();
		assert!(matches!(
			plugin.on_load(&json!({"descriptionLength": 0})).await,
			Err(Error::ConfigError(_))
		));
		assert!(plugin.on_load(&json!({"descriptionLength": "long"})).await.is_err());
	}
}

// vim: ts=4
