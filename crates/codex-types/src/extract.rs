//! Axum extractor for the authenticated caller.
//!
//! Authentication itself is outside this crate; the auth middleware is
//! expected to put a `UserIdentity` into the request extensions.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::Error;
use crate::types::UserIdentity;

impl<S> FromRequestParts<S> for UserIdentity
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		parts.extensions.get::<UserIdentity>().cloned().ok_or(Error::PermissionDenied)
	}
}


// vim: ts=4
