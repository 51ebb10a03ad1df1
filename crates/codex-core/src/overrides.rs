//! Object-level permission override store
//!
//! Validates writes against the catalogue and role table before they reach
//! the adapter, and implements the user-before-role lookup order.

use std::sync::Arc;

use serde::Deserialize;

use codex_types::perm_adapter::{
	ObjectOverride, OverrideDecision, PermAdapter, Subject, UpsertOverrideData,
};

use crate::catalogue::Catalogue;
use crate::prelude::*;
use crate::roles::RoleTable;

/// Raw override write request, as received from an admin surface
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRequest {
	pub content_id: ContentId,
	pub permission: Box<str>,
	pub granted: bool,
	pub user_id: Option<UserId>,
	pub role_name: Option<Box<str>>,
}

impl OverrideRequest {
	pub fn subject(&self) -> CxResult<Subject> {
		Subject::from_parts(self.user_id, self.role_name.as_deref())
	}
}

#[derive(Debug, Clone)]
pub struct OverrideStore {
	adapter: Arc<dyn PermAdapter>,
	catalogue: Catalogue,
	roles: RoleTable,
}

impl OverrideStore {
	pub fn new(adapter: Arc<dyn PermAdapter>, catalogue: Catalogue, roles: RoleTable) -> Self {
		Self { adapter, catalogue, roles }
	}

	fn validate(&self, permission: &str, subject: &Subject) -> CxResult<()> {
		self.catalogue.require(permission)?;
		if let Subject::Role(role) = subject {
			if !self.roles.contains(role) {
				return Err(Error::InvalidRole(role.clone()));
			}
		}
		Ok(())
	}

	/// Create or replace the override for (content, subject, permission)
	pub async fn upsert(
		&self,
		content_id: ContentId,
		permission: &str,
		granted: bool,
		created_by: Option<UserId>,
		subject: &Subject,
	) -> CxResult<ObjectOverride> {
		self.validate(permission, subject)?;

		let row = self
			.adapter
			.upsert_override(&UpsertOverrideData {
				content_id,
				subject,
				permission,
				granted,
				created_by,
			})
			.await?;
		info!(
			content_id = %content_id,
			subject = %subject,
			permission = permission,
			granted = granted,
			"object permission set"
		);
		Ok(row)
	}

	/// Validate a raw request (subject exclusivity first) and upsert it
	pub async fn upsert_request(
		&self,
		req: &OverrideRequest,
		created_by: Option<UserId>,
	) -> CxResult<ObjectOverride> {
		let subject = req.subject()?;
		self.upsert(req.content_id, &req.permission, req.granted, created_by, &subject).await
	}

	/// Upsert one override per token of a named template.
	///
	/// Every token is validated before the first write, but the rows are not
	/// written in one transaction: on a storage error the rows already
	/// upserted stay in place and the error is returned.
	pub async fn apply_template(
		&self,
		content_id: ContentId,
		template: &str,
		granted: bool,
		created_by: Option<UserId>,
		subject: &Subject,
	) -> CxResult<Vec<ObjectOverride>> {
		let tokens = self.catalogue.template(template).ok_or(Error::NotFound)?;
		for token in tokens {
			self.validate(token, subject)?;
		}

		let mut rows = Vec::with_capacity(tokens.len());
		for token in tokens {
			rows.push(self.upsert(content_id, token, granted, created_by, subject).await?);
		}
		Ok(rows)
	}

	pub async fn list(&self, content_id: ContentId) -> CxResult<Vec<ObjectOverride>> {
		self.adapter.list_overrides(content_id).await
	}

	pub async fn read(&self, override_id: OverrideId) -> CxResult<ObjectOverride> {
		self.adapter.read_override(override_id).await
	}

	pub async fn revoke(&self, override_id: OverrideId) -> CxResult<()> {
		self.adapter.delete_override(override_id).await?;
		info!(override_id = %override_id, "object permission revoked");
		Ok(())
	}

	/// Remove all overrides of a deleted content item
	pub async fn purge_content(&self, content_id: ContentId) -> CxResult<u64> {
		let removed = self.adapter.delete_content_overrides(content_id).await?;
		debug!(content_id = %content_id, removed = removed, "object permissions purged");
		Ok(removed)
	}

	/// Override decision for a user; a user-scoped row wins over a
	/// role-scoped row for the same content and permission.
	pub async fn lookup(
		&self,
		content_id: ContentId,
		user_id: UserId,
		role_name: &str,
		permission: &str,
	) -> CxResult<OverrideDecision> {
		let user = Subject::User(user_id);
		if let Some(granted) =
			self.adapter.read_subject_override(content_id, &user, permission).await?
		{
			return Ok(OverrideDecision::from(Some(granted)));
		}

		let role = Subject::Role(role_name.into());
		let granted = self.adapter.read_subject_override(content_id, &role, permission).await?;
		Ok(OverrideDecision::from(granted))
	}

	/// Rows applying to a user, role-scoped rows first, then user-scoped rows
	pub async fn applicable(
		&self,
		content_id: ContentId,
		user_id: UserId,
		role_name: &str,
	) -> CxResult<Vec<ObjectOverride>> {
		let mut rows =
			self.adapter.list_applicable_overrides(content_id, user_id, role_name).await?;
		rows.sort_by_key(|row| matches!(row.subject, Subject::User(_)));
		Ok(rows)
	}
}

// vim: ts=4
