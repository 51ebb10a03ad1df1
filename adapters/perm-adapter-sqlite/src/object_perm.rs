//! Object-level permission overrides
//!
//! One row per (content, subject, permission). The subject is either a user
//! (`user_id`) or a role (`role_name`), never both.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use codex::perm_adapter::{ObjectOverride, Subject, UpsertOverrideData};
use codex::prelude::*;

use crate::utils::{db_err, map_res};

macro_rules! columns {
	() => {
		"perm_id, content_id, user_id, role_name, permission, granted, created_by, created_at"
	};
}

fn row_to_override(row: &SqliteRow) -> CxResult<ObjectOverride> {
	let user_id: Option<i64> = row.try_get("user_id").map_err(db_err)?;
	let role_name: Option<String> = row.try_get("role_name").map_err(db_err)?;
	let subject = Subject::from_parts(user_id.map(UserId), role_name.as_deref()).map_err(|err| {
		warn!("DB: corrupt override subject: {}", err);
		Error::DbError
	})?;
	let permission: String = row.try_get("permission").map_err(db_err)?;
	let created_by: Option<i64> = row.try_get("created_by").map_err(db_err)?;

	Ok(ObjectOverride {
		override_id: OverrideId(row.try_get("perm_id").map_err(db_err)?),
		content_id: ContentId(row.try_get("content_id").map_err(db_err)?),
		subject,
		permission: permission.into(),
		granted: row.try_get("granted").map_err(db_err)?,
		created_by: created_by.map(UserId),
		created_at: Timestamp(row.try_get("created_at").map_err(db_err)?),
	})
}

fn rows_to_overrides(rows: &[SqliteRow]) -> CxResult<Vec<ObjectOverride>> {
	rows.iter().map(row_to_override).collect()
}

/// Insert or replace the row of (content, subject, permission)
pub(crate) async fn upsert(
	db: &SqlitePool,
	data: &UpsertOverrideData<'_>,
) -> CxResult<ObjectOverride> {
	let query = match data.subject {
		Subject::User(user_id) => sqlx::query(concat!(
			"INSERT INTO object_perms (content_id, user_id, permission, granted, created_by)
			VALUES (?, ?, ?, ?, ?)
			ON CONFLICT(content_id, user_id, permission) WHERE user_id IS NOT NULL
			DO UPDATE SET granted = excluded.granted, created_by = excluded.created_by,
				created_at = unixepoch()
			RETURNING ",
			columns!()
		))
		.bind(data.content_id.0)
		.bind(user_id.0),
		Subject::Role(role_name) => sqlx::query(concat!(
			"INSERT INTO object_perms (content_id, role_name, permission, granted, created_by)
			VALUES (?, ?, ?, ?, ?)
			ON CONFLICT(content_id, role_name, permission) WHERE role_name IS NOT NULL
			DO UPDATE SET granted = excluded.granted, created_by = excluded.created_by,
				created_at = unixepoch()
			RETURNING ",
			columns!()
		))
		.bind(data.content_id.0)
		.bind(&**role_name),
	};

	let res = query
		.bind(data.permission)
		.bind(data.granted)
		.bind(data.created_by.map(|id| id.0))
		.fetch_one(db)
		.await;
	map_res(res, |row| row_to_override(&row))
}

/// All overrides of one content item, in creation order
pub(crate) async fn list(db: &SqlitePool, content_id: ContentId) -> CxResult<Vec<ObjectOverride>> {
	let rows = sqlx::query(concat!(
		"SELECT ",
		columns!(),
		" FROM object_perms WHERE content_id = ? ORDER BY perm_id"
	))
	.bind(content_id.0)
	.fetch_all(db)
	.await
	.map_err(db_err)?;

	rows_to_overrides(&rows)
}

/// Overrides of one content item that name the user or the role
pub(crate) async fn list_applicable(
	db: &SqlitePool,
	content_id: ContentId,
	user_id: UserId,
	role_name: &str,
) -> CxResult<Vec<ObjectOverride>> {
	let rows = sqlx::query(concat!(
		"SELECT ",
		columns!(),
		" FROM object_perms WHERE content_id = ? AND (user_id = ? OR role_name = ?)
		ORDER BY perm_id"
	))
	.bind(content_id.0)
	.bind(user_id.0)
	.bind(role_name)
	.fetch_all(db)
	.await
	.map_err(db_err)?;

	rows_to_overrides(&rows)
}

pub(crate) async fn read(db: &SqlitePool, override_id: OverrideId) -> CxResult<ObjectOverride> {
	let res = sqlx::query(concat!("SELECT ", columns!(), " FROM object_perms WHERE perm_id = ?"))
		.bind(override_id.0)
		.fetch_one(db)
		.await;
	map_res(res, |row| row_to_override(&row))
}

/// Granted flag of the row of (content, subject, permission), if any
pub(crate) async fn read_subject(
	db: &SqlitePool,
	content_id: ContentId,
	subject: &Subject,
	permission: &str,
) -> CxResult<Option<bool>> {
	let query = match subject {
		Subject::User(user_id) => sqlx::query(
			"SELECT granted FROM object_perms
			WHERE content_id = ? AND user_id = ? AND permission = ?",
		)
		.bind(content_id.0)
		.bind(user_id.0),
		Subject::Role(role_name) => sqlx::query(
			"SELECT granted FROM object_perms
			WHERE content_id = ? AND role_name = ? AND permission = ?",
		)
		.bind(content_id.0)
		.bind(&**role_name),
	};

	let row = query.bind(permission).fetch_optional(db).await.map_err(db_err)?;
	row.map(|row| row.try_get("granted").map_err(db_err)).transpose()
}

pub(crate) async fn delete(db: &SqlitePool, override_id: OverrideId) -> CxResult<()> {
	let res = sqlx::query("DELETE FROM object_perms WHERE perm_id = ?")
		.bind(override_id.0)
		.execute(db)
		.await
		.map_err(db_err)?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}

pub(crate) async fn delete_content(db: &SqlitePool, content_id: ContentId) -> CxResult<u64> {
	let res = sqlx::query("DELETE FROM object_perms WHERE content_id = ?")
		.bind(content_id.0)
		.execute(db)
		.await
		.map_err(db_err)?;

	Ok(res.rows_affected())
}

// vim: ts=4
