//! SQLite implementation of the Codex permission adapter
//!
//! Stores object overrides in `object_perms` and role records in `roles`.

#![forbid(unsafe_code)]

mod object_perm;
mod role;
mod schema;
mod utils;

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};

use codex::perm_adapter::{ObjectOverride, PermAdapter, RoleRecord, Subject, UpsertOverrideData};
use codex::prelude::*;

use crate::schema::init_db;

#[derive(Debug)]
pub struct PermAdapterSqlite {
	db: SqlitePool,
}

impl PermAdapterSqlite {
	/// Open (or create) the database file at `path` and initialize the schema
	pub async fn new(path: impl AsRef<Path>) -> CxResult<Self> {
		let path = path.as_ref();
		if let Some(dir) = path.parent() {
			if !dir.as_os_str().is_empty() {
				tokio::fs::create_dir_all(dir).await?;
			}
		}

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path)
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		init_db(&db)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		info!(path = %path.display(), "permission database opened");
		Ok(Self { db })
	}
}

#[async_trait]
impl PermAdapter for PermAdapterSqlite {
	// Object overrides
	//******************
	async fn upsert_override(&self, data: &UpsertOverrideData<'_>) -> CxResult<ObjectOverride> {
		object_perm::upsert(&self.db, data).await
	}

	async fn list_overrides(&self, content_id: ContentId) -> CxResult<Vec<ObjectOverride>> {
		object_perm::list(&self.db, content_id).await
	}

	async fn list_applicable_overrides(
		&self,
		content_id: ContentId,
		user_id: UserId,
		role_name: &str,
	) -> CxResult<Vec<ObjectOverride>> {
		object_perm::list_applicable(&self.db, content_id, user_id, role_name).await
	}

	async fn read_override(&self, override_id: OverrideId) -> CxResult<ObjectOverride> {
		object_perm::read(&self.db, override_id).await
	}

	async fn read_subject_override(
		&self,
		content_id: ContentId,
		subject: &Subject,
		permission: &str,
	) -> CxResult<Option<bool>> {
		object_perm::read_subject(&self.db, content_id, subject, permission).await
	}

	async fn delete_override(&self, override_id: OverrideId) -> CxResult<()> {
		object_perm::delete(&self.db, override_id).await
	}

	async fn delete_content_overrides(&self, content_id: ContentId) -> CxResult<u64> {
		object_perm::delete_content(&self.db, content_id).await
	}

	// Roles
	//*******
	async fn read_role(&self, name: &str) -> CxResult<Option<RoleRecord>> {
		role::read(&self.db, name).await
	}

	async fn list_roles(&self) -> CxResult<Vec<RoleRecord>> {
		role::list(&self.db).await
	}

	async fn create_role(
		&self,
		name: &str,
		description: Option<&str>,
		permissions: &[&str],
	) -> CxResult<bool> {
		role::create(&self.db, name, description, permissions).await
	}

	async fn update_role_permissions(
		&self,
		name: &str,
		permissions: &[&str],
	) -> CxResult<RoleRecord> {
		role::update_permissions(&self.db, name, permissions).await
	}
}

// vim: ts=4
