//! Database schema initialization

use sqlx::SqlitePool;

/// Create tables and indexes if they do not exist yet
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Object overrides
	//******************
	// Exactly one of user_id / role_name is set on every row
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS object_perms (
		perm_id integer PRIMARY KEY AUTOINCREMENT,
		content_id integer NOT NULL,
		user_id integer,
		role_name text,
		permission text NOT NULL,
		granted boolean NOT NULL,
		created_by integer,
		created_at datetime DEFAULT (unixepoch()),
		CHECK ((user_id IS NULL) <> (role_name IS NULL))
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE UNIQUE INDEX IF NOT EXISTS idx_object_perms_user
		ON object_perms(content_id, user_id, permission) WHERE user_id IS NOT NULL",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE UNIQUE INDEX IF NOT EXISTS idx_object_perms_role
		ON object_perms(content_id, role_name, permission) WHERE role_name IS NOT NULL",
	)
	.execute(&mut *tx)
	.await?;

	// Roles
	//*******
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS roles (
		name text NOT NULL,
		description text,
		permissions json NOT NULL,
		updated_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(name)
	)",
	)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;
	Ok(())
}

// vim: ts=4
