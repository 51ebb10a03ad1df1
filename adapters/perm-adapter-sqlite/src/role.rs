//! Persisted role records
//!
//! The permission list is stored as a JSON array of tokens.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use codex::perm_adapter::RoleRecord;
use codex::prelude::*;

use crate::utils::{db_err, map_res};

fn row_to_role(row: &SqliteRow) -> CxResult<RoleRecord> {
	let name: String = row.try_get("name").map_err(db_err)?;
	let description: Option<String> = row.try_get("description").map_err(db_err)?;
	let permissions: String = row.try_get("permissions").map_err(db_err)?;
	let permissions: Vec<Box<str>> = serde_json::from_str(&permissions).map_err(|err| {
		warn!("DB: invalid permission list of role {}: {}", name, err);
		Error::DbError
	})?;

	Ok(RoleRecord {
		name: name.into(),
		description: description.map(Into::into),
		permissions,
		updated_at: Timestamp(row.try_get("updated_at").map_err(db_err)?),
	})
}

fn encode_permissions(permissions: &[&str]) -> CxResult<String> {
	serde_json::to_string(permissions).map_err(|err| Error::Internal(err.to_string()))
}

pub(crate) async fn read(db: &SqlitePool, name: &str) -> CxResult<Option<RoleRecord>> {
	let row = sqlx::query(
		"SELECT name, description, permissions, updated_at FROM roles WHERE name = ?",
	)
	.bind(name)
	.fetch_optional(db)
	.await
	.map_err(db_err)?;

	row.as_ref().map(row_to_role).transpose()
}

pub(crate) async fn list(db: &SqlitePool) -> CxResult<Vec<RoleRecord>> {
	let rows =
		sqlx::query("SELECT name, description, permissions, updated_at FROM roles ORDER BY name")
			.fetch_all(db)
			.await
			.map_err(db_err)?;

	rows.iter().map(row_to_role).collect()
}

/// Insert the record unless a role of that name exists. Returns whether it was inserted.
pub(crate) async fn create(
	db: &SqlitePool,
	name: &str,
	description: Option<&str>,
	permissions: &[&str],
) -> CxResult<bool> {
	let res = sqlx::query(
		"INSERT INTO roles (name, description, permissions) VALUES (?, ?, ?)
		ON CONFLICT(name) DO NOTHING",
	)
	.bind(name)
	.bind(description)
	.bind(encode_permissions(permissions)?)
	.execute(db)
	.await
	.map_err(db_err)?;

	Ok(res.rows_affected() > 0)
}

pub(crate) async fn update_permissions(
	db: &SqlitePool,
	name: &str,
	permissions: &[&str],
) -> CxResult<RoleRecord> {
	let res = sqlx::query(
		"UPDATE roles SET permissions = ?, updated_at = unixepoch() WHERE name = ?
		RETURNING name, description, permissions, updated_at",
	)
	.bind(encode_permissions(permissions)?)
	.bind(name)
	.fetch_one(db)
	.await;

	map_res(res, |row| row_to_role(&row))
}

// vim: ts=4
