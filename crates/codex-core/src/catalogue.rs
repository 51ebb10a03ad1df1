//! Permission catalogue and permission templates
//!
//! The catalogue is the closed set of permission tokens the system knows
//! about. Tokens have `category.action` form. Templates are named bundles of
//! tokens used for bulk grants.

use std::collections::BTreeSet;

use crate::prelude::*;

/// Wildcard token, accepted only in persisted role permission lists
pub const WILDCARD: &str = "*";

pub const PERMISSIONS: &[&str] = &[
	// Content
	"content.create",
	"content.read",
	"content.update",
	"content.delete",
	"content.publish",
	"content.unpublish",
	"content.import",
	"content.export",
	// Media
	"media.upload",
	"media.delete",
	// Templates
	"template.create",
	"template.update",
	"template.delete",
	// Teams
	"team.create",
	"team.manage",
	"team.invite",
	// Administration
	"user.manage",
	"role.manage",
	"permission.manage",
	"tenant.manage",
	"webhook.manage",
	"plugin.manage",
	"settings.manage",
	"backup.create",
	"backup.restore",
	"analytics.view",
];

pub const TEMPLATES: &[(&str, &[&str])] = &[
	("content_editor", &["content.create", "content.read", "content.update"]),
	("content_publisher", &["content.read", "content.publish", "content.unpublish"]),
	("media_manager", &["media.upload", "media.delete"]),
	("team_admin", &["team.create", "team.manage", "team.invite"]),
	("read_only", &["content.read", "analytics.view"]),
];

/// Permission catalogue (tokens and templates)
#[derive(Debug, Clone)]
pub struct Catalogue {
	permissions: &'static [&'static str],
	templates: &'static [(&'static str, &'static [&'static str])],
}

impl Catalogue {
	/// The built-in catalogue
	pub const fn builtin() -> Self {
		Self { permissions: PERMISSIONS, templates: TEMPLATES }
	}

	pub const fn new(
		permissions: &'static [&'static str],
		templates: &'static [(&'static str, &'static [&'static str])],
	) -> Self {
		Self { permissions, templates }
	}

	pub fn contains(&self, token: &str) -> bool {
		self.permissions.contains(&token)
	}

	/// All tokens, sorted
	pub fn tokens(&self) -> BTreeSet<Box<str>> {
		self.permissions.iter().map(|&t| Box::from(t)).collect()
	}

	pub fn template(&self, name: &str) -> Option<&'static [&'static str]> {
		self.templates.iter().find(|(n, _)| *n == name).map(|(_, tokens)| *tokens)
	}

	pub fn templates(&self) -> impl Iterator<Item = (&'static str, &'static [&'static str])> + '_ {
		self.templates.iter().copied()
	}

	/// Check that `token` is a catalogue token
	pub fn require(&self, token: &str) -> CxResult<()> {
		if self.contains(token) { Ok(()) } else { Err(Error::UnknownPermission(token.into())) }
	}

	/// Startup invariant check: unique well-formed tokens, templates only
	/// reference catalogue tokens.
	pub fn validate(&self) -> CxResult<()> {
		let mut seen = BTreeSet::new();
		for &token in self.permissions {
			if !is_well_formed(token) {
				return Err(Error::ConfigError(format!("malformed permission token: {}", token)));
			}
			if !seen.insert(token) {
				return Err(Error::ConfigError(format!("duplicate permission token: {}", token)));
			}
		}

		let mut names = BTreeSet::new();
		for &(name, tokens) in self.templates {
			if !names.insert(name) {
				return Err(Error::ConfigError(format!("duplicate template: {}", name)));
			}
			if let Some(token) = tokens.iter().find(|t| !self.contains(t)) {
				return Err(Error::ConfigError(format!(
					"template {} references unknown permission {}",
					name, token
				)));
			}
		}
		Ok(())
	}
}

impl Default for Catalogue {
	fn default() -> Self {
		Self::builtin()
	}
}

fn is_well_formed(token: &str) -> bool {
	match token.split_once('.') {
		Some((category, action)) => {
			let valid = |s: &str| {
				!s.is_empty() && s.chars().all(|c| c.is_ascii_lowercase() || c == '_')
			};
			valid(category) && valid(action)
		}
		None => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_builtin_catalogue_is_valid() {
		assert!(Catalogue::builtin().validate().is_ok());
	}

	#[test]
	fn test_contains_and_require() {
		let catalogue = Catalogue::builtin();
		assert!(catalogue.contains("content.publish"));
		assert!(!catalogue.contains("content.fly"));
		assert!(!catalogue.contains(WILDCARD));
		assert!(matches!(catalogue.require("content.fly"), Err(Error::UnknownPermission(t)) if &*t == "content.fly"));
	}

	#[test]
	fn test_template_lookup() {
		let catalogue = Catalogue::builtin();
		assert_eq!(
			catalogue.template("content_editor"),
			Some(&["content.create", "content.read", "content.update"][..])
		);
		assert!(catalogue.template("nope").is_none());
	}

	#[test]
	fn test_validate_rejects_bad_template() {
		const PERMS: &[&str] = &["content.read"];
		const TPLS: &[(&str, &[&str])] = &[("broken", &["content.read", "content.fly"])];
		let err = Catalogue::new(PERMS, TPLS).validate().unwrap_err();
		assert!(err.to_string().contains("content.fly"));
	}

	#[test]
	fn test_validate_rejects_duplicates_and_malformed() {
		const DUP: &[&str] = &["content.read", "content.read"];
		assert!(Catalogue::new(DUP, &[]).validate().is_err());
		const BAD: &[&str] = &["contentread"];
		assert!(Catalogue::new(BAD, &[]).validate().is_err());
	}

	#[test]
	fn test_tokens_sorted() {
		let tokens: Vec<_> = Catalogue::builtin().tokens().into_iter().collect();
		let mut sorted = tokens.clone();
		sorted.sort();
		assert_eq!(tokens, sorted);
		assert_eq!(tokens.len(), PERMISSIONS.len());
	}
}

// vim: ts=4
