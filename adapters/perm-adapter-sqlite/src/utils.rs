//! Shared utilities for the SQLite adapter

use codex::prelude::*;
use sqlx::sqlite::SqliteRow;

/// Log database error for debugging
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Map a single-row query result, translating SQL errors to CxResult
pub(crate) fn map_res<T, F>(row: Result<SqliteRow, sqlx::Error>, f: F) -> CxResult<T>
where
	F: FnOnce(SqliteRow) -> CxResult<T>,
{
	match row {
		Ok(row) => f(row),
		Err(sqlx::Error::RowNotFound) => Err(Error::NotFound),
		Err(err) => {
			inspect(&err);
			Err(Error::DbError)
		}
	}
}

/// Translate any other SQL error to `Error::DbError`
pub(crate) fn db_err(err: sqlx::Error) -> Error {
	inspect(&err);
	Error::DbError
}

// vim: ts=4
