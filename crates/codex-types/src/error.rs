//! Error type shared by the permission core, its adapters and plugins.

use axum::{Json, http::StatusCode, response::IntoResponse};

pub type CxResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	PermissionDenied,
	DbError,

	/// Role name is not present in the role table
	InvalidRole(Box<str>),
	/// Role has no persisted record
	UnknownRole(Box<str>),
	/// Permission token is not in the catalogue
	UnknownPermission(Box<str>),
	/// Override subject names both a user and a role, or neither
	InvalidSubject(String),

	ConfigError(String),
	Parse(String),
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl Error {
	/// True for errors caused by caller input rather than by the system
	pub fn is_validation(&self) -> bool {
		matches!(
			self,
			Error::InvalidRole(_)
				| Error::UnknownRole(_)
				| Error::UnknownPermission(_)
				| Error::InvalidSubject(_)
				| Error::Parse(_)
		)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::DbError => write!(f, "database error"),
			Error::InvalidRole(role) => write!(f, "invalid role: {}", role),
			Error::UnknownRole(role) => write!(f, "unknown role: {}", role),
			Error::UnknownPermission(perm) => write!(f, "unknown permission: {}", perm),
			Error::InvalidSubject(msg) => write!(f, "invalid subject: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::Parse(msg) => write!(f, "parse error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Parse(err.to_string())
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		let status = match &self {
			Error::NotFound => StatusCode::NOT_FOUND,
			Error::PermissionDenied => StatusCode::FORBIDDEN,
			err if err.is_validation() => StatusCode::BAD_REQUEST,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		};
		if status == StatusCode::INTERNAL_SERVER_ERROR {
			tracing::error!("internal error: {}", self);
			return (status, Json(serde_json::json!({ "error": "internal error" }))).into_response();
		}
		(status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
	}
}


// vim: ts=4
