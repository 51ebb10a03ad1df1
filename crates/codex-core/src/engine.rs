//! Permission decision engine
//!
//! Combines role resolution with object-level overrides:
//! 1. wildcard roles are allowed without looking at overrides
//! 2. without a content item the global role decision is final
//! 3. with a content item an explicit override beats the global decision,
//!    and a user-scoped override beats a role-scoped one
//!
//! The persisted role record, when present, supplies a role's own tokens at
//! runtime. The static role table supplies inheritance and wildcard flags and
//! seeds missing records at startup.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use codex_types::perm_adapter::{OverrideDecision, PermAdapter, RoleRecord};

use crate::catalogue::{Catalogue, WILDCARD};
use crate::overrides::OverrideStore;
use crate::prelude::*;
use crate::roles::{Permissions, RoleTable};

#[derive(Debug, Clone)]
pub struct PermissionEngine {
	adapter: Arc<dyn PermAdapter>,
	catalogue: Catalogue,
	roles: RoleTable,
	overrides: OverrideStore,
}

impl PermissionEngine {
	pub fn new(adapter: Arc<dyn PermAdapter>, catalogue: Catalogue, roles: RoleTable) -> Self {
		let overrides = OverrideStore::new(adapter.clone(), catalogue.clone(), roles.clone());
		Self { adapter, catalogue, roles, overrides }
	}

	/// Engine over the built-in catalogue and role table
	pub fn builtin(adapter: Arc<dyn PermAdapter>) -> Self {
		Self::new(adapter, Catalogue::builtin(), RoleTable::builtin())
	}

	pub fn catalogue(&self) -> &Catalogue {
		&self.catalogue
	}

	pub fn roles(&self) -> &RoleTable {
		&self.roles
	}

	pub fn overrides(&self) -> &OverrideStore {
		&self.overrides
	}

	/// Validate the static configuration and create missing role records.
	/// Existing records are left untouched.
	pub async fn seed_roles(&self) -> CxResult<usize> {
		self.catalogue.validate()?;
		self.roles.validate(&self.catalogue)?;

		let mut created = 0;
		for role in self.roles.roles() {
			let wildcard = [WILDCARD];
			let permissions: &[&str] = if role.wildcard { &wildcard } else { role.own };
			if self.adapter.create_role(role.name, Some(role.description), permissions).await? {
				debug!(role = role.name, "role record seeded");
				created += 1;
			}
		}
		Ok(created)
	}

	/// Resolve a role with persisted own-permission overrides applied
	pub async fn resolve_role(&self, role_name: &str) -> CxResult<Permissions> {
		let chain = self.roles.chain(role_name)?;
		if chain.iter().any(|role| role.wildcard) {
			return Ok(Permissions::Wildcard);
		}

		let mut records = HashMap::new();
		for role in &chain {
			if let Some(record) = self.adapter.read_role(role.name).await? {
				records.insert(role.name, record.permissions);
			}
		}
		self.roles.resolve_with(role_name, |name| records.remove(name))
	}

	/// May `user` exercise `permission`, optionally on content item `content_id`?
	pub async fn check(
		&self,
		user: &UserIdentity,
		permission: &str,
		content_id: Option<ContentId>,
	) -> CxResult<bool> {
		let perms = self.resolve_role(&user.role).await?;
		if perms.is_wildcard() {
			debug!(subject = %user.id, role = %user.role, permission = permission, "wildcard role allows");
			return Ok(true);
		}

		let globally_allowed = perms.contains(permission);
		let Some(content_id) = content_id else {
			debug!(subject = %user.id, role = %user.role, permission = permission, allowed = globally_allowed, "global decision");
			return Ok(globally_allowed);
		};

		let decision =
			self.overrides.lookup(content_id, user.id, &user.role, permission).await?;
		let allowed = match decision {
			OverrideDecision::Grant => true,
			OverrideDecision::Deny => false,
			OverrideDecision::NoOverride => globally_allowed,
		};
		debug!(
			subject = %user.id,
			role = %user.role,
			permission = permission,
			content_id = %content_id,
			decision = ?decision,
			allowed = allowed,
			"object decision"
		);
		Ok(allowed)
	}

	/// Like `check`, but denial is an `Error::PermissionDenied`
	pub async fn require(
		&self,
		user: &UserIdentity,
		permission: &str,
		content_id: Option<ContentId>,
	) -> CxResult<()> {
		if self.check(user, permission, content_id).await? {
			Ok(())
		} else {
			warn!(subject = %user.id, role = %user.role, permission = permission, "permission denied");
			Err(Error::PermissionDenied)
		}
	}

	/// Sorted set of permissions the user holds, optionally on a content item
	pub async fn effective_permissions(
		&self,
		user: &UserIdentity,
		content_id: Option<ContentId>,
	) -> CxResult<BTreeSet<Box<str>>> {
		let perms = self.resolve_role(&user.role).await?;
		let Permissions::Explicit(mut set) = perms else {
			return Ok(self.catalogue.tokens());
		};

		if let Some(content_id) = content_id {
			// role rows come first, so user rows win for the same token
			for row in self.overrides.applicable(content_id, user.id, &user.role).await? {
				if row.granted {
					set.insert(row.permission);
				} else {
					set.remove(&row.permission);
				}
			}
		}
		Ok(set)
	}

	/// Replace the persisted permission list of a role. Returns the stored
	/// list, sorted and deduplicated.
	pub async fn update_role_permissions(
		&self,
		role_name: &str,
		tokens: &[&str],
	) -> CxResult<Vec<Box<str>>> {
		if let Some(token) = tokens.iter().find(|&&t| t != WILDCARD && !self.catalogue.contains(t))
		{
			return Err(Error::UnknownPermission((*token).into()));
		}
		if self.adapter.read_role(role_name).await?.is_none() {
			return Err(Error::UnknownRole(role_name.into()));
		}

		let tokens: BTreeSet<&str> = tokens.iter().copied().collect();
		let tokens: Vec<&str> = tokens.into_iter().collect();
		let record = match self.adapter.update_role_permissions(role_name, &tokens).await {
			Err(Error::NotFound) => return Err(Error::UnknownRole(role_name.into())),
			res => res?,
		};
		info!(role = role_name, permissions = ?record.permissions, "role permissions updated");
		Ok(record.permissions)
	}

	pub async fn role_records(&self) -> CxResult<Vec<RoleRecord>> {
		self.adapter.list_roles().await
	}
}

// vim: ts=4
