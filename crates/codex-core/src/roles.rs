//! Role table and role resolution
//!
//! Roles own a set of permission tokens and may inherit from one parent.
//! Resolution walks the chain from the role to its root and unions the own
//! sets. A wildcard role anywhere on the chain resolves to `Wildcard`.

use std::collections::{BTreeSet, HashSet};

use crate::catalogue::Catalogue;
use crate::prelude::*;

/// Upper bound on inheritance chain length
pub const MAX_ROLE_DEPTH: usize = 16;

/// Static role definition
#[derive(Debug, Clone, Copy)]
pub struct RoleDef {
	pub name: &'static str,
	pub description: &'static str,
	pub own: &'static [&'static str],
	pub parent: Option<&'static str>,
	pub wildcard: bool,
}

pub const BUILTIN_ROLES: &[RoleDef] = &[
	RoleDef {
		name: "user",
		description: "Reads content",
		own: &["content.read"],
		parent: None,
		wildcard: false,
	},
	RoleDef {
		name: "editor",
		description: "Creates and edits content",
		own: &["content.create", "content.update"],
		parent: Some("user"),
		wildcard: false,
	},
	RoleDef {
		name: "manager",
		description: "Publishes content and manages teams",
		own: &[
			"content.delete",
			"content.publish",
			"content.unpublish",
			"content.import",
			"content.export",
			"media.upload",
			"media.delete",
			"template.create",
			"template.update",
			"team.create",
			"team.manage",
			"team.invite",
			"analytics.view",
		],
		parent: Some("editor"),
		wildcard: false,
	},
	RoleDef { name: "admin", description: "Site administrator", own: &[], parent: None, wildcard: true },
	RoleDef {
		name: "superadmin",
		description: "Instance operator",
		own: &[],
		parent: None,
		wildcard: true,
	},
];

/// Resolved permission set of a role
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permissions {
	/// Implicitly holds every permission
	Wildcard,
	/// Enumerated tokens, sorted
	Explicit(BTreeSet<Box<str>>),
}

impl Permissions {
	pub fn contains(&self, token: &str) -> bool {
		match self {
			Permissions::Wildcard => true,
			Permissions::Explicit(set) => set.contains(token),
		}
	}

	pub fn is_wildcard(&self) -> bool {
		matches!(self, Permissions::Wildcard)
	}

	/// Enumerate the set; a wildcard expands to the whole catalogue
	pub fn expand(self, catalogue: &Catalogue) -> BTreeSet<Box<str>> {
		match self {
			Permissions::Wildcard => catalogue.tokens(),
			Permissions::Explicit(set) => set,
		}
	}
}

/// Role table with inheritance
#[derive(Debug, Clone)]
pub struct RoleTable {
	roles: &'static [RoleDef],
}

impl RoleTable {
	pub const fn builtin() -> Self {
		Self { roles: BUILTIN_ROLES }
	}

	pub const fn new(roles: &'static [RoleDef]) -> Self {
		Self { roles }
	}

	pub fn get(&self, name: &str) -> Option<&'static RoleDef> {
		self.roles.iter().find(|r| r.name == name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	pub fn roles(&self) -> &'static [RoleDef] {
		self.roles
	}

	/// The inheritance chain of a role, the role itself first.
	///
	/// Fails with `InvalidRole` for an unknown role and with `ConfigError` if
	/// a parent is missing, the chain revisits a role, or it exceeds
	/// `MAX_ROLE_DEPTH`.
	pub fn chain(&self, name: &str) -> CxResult<Vec<&'static RoleDef>> {
		let mut role = self.get(name).ok_or_else(|| Error::InvalidRole(name.into()))?;
		let mut visited = HashSet::new();
		let mut chain = Vec::new();

		loop {
			if !visited.insert(role.name) {
				return Err(Error::ConfigError(format!(
					"role inheritance cycle at {} (resolving {})",
					role.name, name
				)));
			}
			if chain.len() >= MAX_ROLE_DEPTH {
				return Err(Error::ConfigError(format!(
					"role inheritance deeper than {} (resolving {})",
					MAX_ROLE_DEPTH, name
				)));
			}
			chain.push(role);

			let Some(parent) = role.parent else { break };
			role = self.get(parent).ok_or_else(|| {
				Error::ConfigError(format!("role {} inherits unknown role {}", role.name, parent))
			})?;
		}
		Ok(chain)
	}

	/// Resolve a role from the static table
	pub fn resolve(&self, name: &str) -> CxResult<Permissions> {
		self.resolve_with(name, |_| None)
	}

	/// Resolve a role, taking a role's own tokens from `own_override` when it
	/// returns `Some`. A `*` entry in an overridden list makes the role
	/// wildcard. Inheritance edges and the wildcard flag always come from the
	/// static table.
	pub fn resolve_with<F>(&self, name: &str, mut own_override: F) -> CxResult<Permissions>
	where
		F: FnMut(&str) -> Option<Vec<Box<str>>>,
	{
		let mut set = BTreeSet::new();
		for role in self.chain(name)? {
			if role.wildcard {
				return Ok(Permissions::Wildcard);
			}
			match own_override(role.name) {
				Some(tokens) => {
					if tokens.iter().any(|t| &**t == crate::catalogue::WILDCARD) {
						return Ok(Permissions::Wildcard);
					}
					set.extend(tokens);
				}
				None => set.extend(role.own.iter().map(|&t| Box::from(t))),
			}
		}
		Ok(Permissions::Explicit(set))
	}

	/// Startup invariant check of the static table
	pub fn validate(&self, catalogue: &Catalogue) -> CxResult<()> {
		let mut names = HashSet::new();
		for role in self.roles {
			if !names.insert(role.name) {
				return Err(Error::ConfigError(format!("duplicate role: {}", role.name)));
			}
			if let Some(token) = role.own.iter().find(|t| !catalogue.contains(t)) {
				return Err(Error::ConfigError(format!(
					"role {} owns unknown permission {}",
					role.name, token
				)));
			}
			self.chain(role.name)?;
		}
		Ok(())
	}
}

impl Default for RoleTable {
	fn default() -> Self {
		Self::builtin()
	}
}


// vim: ts=4
