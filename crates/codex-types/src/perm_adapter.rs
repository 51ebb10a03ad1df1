//! Adapter that persists object-level permission overrides and role records.
//!
//! The adapter is pure storage: catalogue validation, subject validation and
//! precedence rules live in the core crate. Implementations must keep at
//! most one override row per (content, subject, permission) key.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt::Debug;

use crate::prelude::*;

// Subject //
//*********//
/// Who an override applies to
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Subject {
	User(UserId),
	Role(Box<str>),
}

impl Subject {
	/// Build a subject from the nullable column pair used at storage and wire
	/// boundaries. Exactly one of the two must be set.
	pub fn from_parts(user_id: Option<UserId>, role_name: Option<&str>) -> CxResult<Subject> {
		match (user_id, role_name) {
			(Some(user_id), None) => Ok(Subject::User(user_id)),
			(None, Some(role)) if !role.trim().is_empty() => Ok(Subject::Role(role.into())),
			(None, Some(_)) => Err(Error::InvalidSubject("empty role name".into())),
			(Some(user_id), Some(role)) => Err(Error::InvalidSubject(format!(
				"both user {} and role {} given",
				user_id, role
			))),
			(None, None) => Err(Error::InvalidSubject("neither user nor role given".into())),
		}
	}

	pub fn user_id(&self) -> Option<UserId> {
		match self {
			Subject::User(id) => Some(*id),
			Subject::Role(_) => None,
		}
	}

	pub fn role_name(&self) -> Option<&str> {
		match self {
			Subject::User(_) => None,
			Subject::Role(name) => Some(name),
		}
	}
}

impl std::fmt::Display for Subject {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Subject::User(id) => write!(f, "user:{}", id),
			Subject::Role(name) => write!(f, "role:{}", name),
		}
	}
}

/// Outcome of an override lookup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverrideDecision {
	Grant,
	Deny,
	NoOverride,
}

impl From<Option<bool>> for OverrideDecision {
	fn from(granted: Option<bool>) -> Self {
		match granted {
			Some(true) => OverrideDecision::Grant,
			Some(false) => OverrideDecision::Deny,
			None => OverrideDecision::NoOverride,
		}
	}
}

/// Object permission override row
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectOverride {
	pub override_id: OverrideId,
	pub content_id: ContentId,
	pub subject: Subject,
	pub permission: Box<str>,
	pub granted: bool,
	pub created_by: Option<UserId>,
	pub created_at: Timestamp,
}

/// Data needed to write an override
#[derive(Debug)]
pub struct UpsertOverrideData<'a> {
	pub content_id: ContentId,
	pub subject: &'a Subject,
	pub permission: &'a str,
	pub granted: bool,
	pub created_by: Option<UserId>,
}

/// Persisted role record (operational override of the static role table)
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRecord {
	pub name: Box<str>,
	pub description: Option<Box<str>>,
	pub permissions: Vec<Box<str>>,
	pub updated_at: Timestamp,
}

#[async_trait]
pub trait PermAdapter: Debug + Send + Sync {
	// Object overrides
	//******************

	/// Insert or replace the row for (content, subject, permission)
	async fn upsert_override(&self, data: &UpsertOverrideData<'_>) -> CxResult<ObjectOverride>;

	/// All rows of a content item, in no particular order
	async fn list_overrides(&self, content_id: ContentId) -> CxResult<Vec<ObjectOverride>>;

	/// Rows of a content item that apply to the given user id or role name
	async fn list_applicable_overrides(
		&self,
		content_id: ContentId,
		user_id: UserId,
		role_name: &str,
	) -> CxResult<Vec<ObjectOverride>>;

	async fn read_override(&self, override_id: OverrideId) -> CxResult<ObjectOverride>;

	/// Granted flag of the row for an exact key, if one exists
	async fn read_subject_override(
		&self,
		content_id: ContentId,
		subject: &Subject,
		permission: &str,
	) -> CxResult<Option<bool>>;

	/// Returns `Error::NotFound` if no row has this id
	async fn delete_override(&self, override_id: OverrideId) -> CxResult<()>;

	/// Removes every row of a content item, returns the number removed
	async fn delete_content_overrides(&self, content_id: ContentId) -> CxResult<u64>;

	// Role records
	//**************
	async fn read_role(&self, name: &str) -> CxResult<Option<RoleRecord>>;

	async fn list_roles(&self) -> CxResult<Vec<RoleRecord>>;

	/// Creates a role record unless one exists. Returns true if created.
	async fn create_role(
		&self,
		name: &str,
		description: Option<&str>,
		permissions: &[&str],
	) -> CxResult<bool>;

	/// Returns `Error::NotFound` if the role has no record
	async fn update_role_permissions(
		&self,
		name: &str,
		permissions: &[&str],
	) -> CxResult<RoleRecord>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_subject_from_parts() {
		assert_eq!(Subject::from_parts(Some(UserId(3)), None).unwrap(), Subject::User(UserId(3)));
		assert_eq!(
			Subject::from_parts(None, Some("editor")).unwrap(),
			Subject::Role("editor".into())
		);
		assert!(matches!(
			Subject::from_parts(Some(UserId(3)), Some("editor")),
			Err(Error::InvalidSubject(_))
		));
		assert!(matches!(Subject::from_parts(None, None), Err(Error::InvalidSubject(_))));
		assert!(matches!(Subject::from_parts(None, Some(" ")), Err(Error::InvalidSubject(_))));
	}

	#[test]
	fn test_override_decision_from_flag() {
		assert_eq!(OverrideDecision::from(Some(true)), OverrideDecision::Grant);
		assert_eq!(OverrideDecision::from(Some(false)), OverrideDecision::Deny);
		assert_eq!(OverrideDecision::from(None), OverrideDecision::NoOverride);
	}
}

// vim: ts=4
