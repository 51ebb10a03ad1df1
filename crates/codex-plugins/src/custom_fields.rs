//! Custom fields plugin: checks content payloads against configured fields
//!
//! Config:
//! ```json
//! { "fields": [ { "name": "subtitle", "type": "string", "required": true, "pattern": "^[A-Z]" } ] }
//! ```
//! The handler reports required fields that are absent or null, and present
//! fields of the wrong type or not matching their pattern.

use async_trait::async_trait;
use parking_lot::RwLock;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};

use codex_core::hooks::{CONTENT_CREATED, CONTENT_UPDATED};
use codex_types::plugin::{HookPayload, Plugin};
use codex_types::prelude::*;

use crate::parse_config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
	#[default]
	Any,
	String,
	Number,
	Boolean,
	Object,
	Array,
}

impl FieldType {
	fn matches(self, value: &Value) -> bool {
		match self {
			FieldType::Any => true,
			FieldType::String => value.is_string(),
			FieldType::Number => value.is_number(),
			FieldType::Boolean => value.is_boolean(),
			FieldType::Object => value.is_object(),
			FieldType::Array => value.is_array(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
	pub name: String,
	#[serde(default, rename = "type")]
	pub field_type: FieldType,
	#[serde(default)]
	pub required: bool,
	pub pattern: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomFieldsConfig {
	pub fields: Vec<FieldDef>,
}

#[derive(Debug)]
struct CompiledField {
	def: FieldDef,
	pattern: Option<Regex>,
}

#[derive(Debug, Default)]
pub struct CustomFieldsPlugin {
	fields: RwLock<Vec<CompiledField>>,
}

impl CustomFieldsPlugin {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl Plugin for CustomFieldsPlugin {
	fn name(&self) -> &str {
		"custom_fields"
	}

	fn version(&self) -> &str {
		"1.0.0"
	}

	fn description(&self) -> &str {
		"Validates configured custom fields on content"
	}

	fn hooks(&self) -> &[&str] {
		&[CONTENT_CREATED, CONTENT_UPDATED]
	}

	fn config_schema(&self) -> Value {
		json!({
			"type": "object",
			"properties": {
				"fields": {
					"type": "array",
					"items": {
						"type": "object",
						"required": ["name"],
						"properties": {
							"name": { "type": "string" },
							"type": { "enum": ["any", "string", "number", "boolean", "object", "array"] },
							"required": { "type": "boolean" },
							"pattern": { "type": "string" }
						}
					}
				}
			}
		})
	}

	async fn on_load(&self, config: &Value) -> CxResult<()> {
		let config: CustomFieldsConfig = parse_config(self.name(), config)?;
		let mut fields = Vec::with_capacity(config.fields.len());
		for def in config.fields {
			let pattern = def
				.pattern
				.as_deref()
				.map(Regex::new)
				.transpose()
				.map_err(|err| {
					Error::ConfigError(format!("custom_fields plugin: {}: invalid pattern: {}", def.name, err))
				})?;
			fields.push(CompiledField { def, pattern });
		}
		*self.fields.write() = fields;
		Ok(())
	}

	async fn handle_hook(&self, _hook: &str, payload: &HookPayload) -> CxResult<Value> {
		let values = payload.get("fields").and_then(Value::as_object);
		let mut missing = Vec::new();
		let mut invalid = Vec::new();

		for field in self.fields.read().iter() {
			let value = values.and_then(|v| v.get(&field.def.name)).filter(|v| !v.is_null());
			let Some(value) = value else {
				if field.def.required {
					missing.push(field.def.name.clone());
				}
				continue;
			};

			let type_ok = field.def.field_type.matches(value);
			let pattern_ok = match (&field.pattern, value.as_str()) {
				(Some(re), Some(s)) => re.is_match(s),
				(Some(_), None) => false,
				(None, _) => true,
			};
			if !type_ok || !pattern_ok {
				invalid.push(field.def.name.clone());
			}
		}

		Ok(json!({
			"valid": missing.is_empty() && invalid.is_empty(),
			"missing": missing,
			"invalid": invalid,
		}))
	}
}


// vim: ts=4
