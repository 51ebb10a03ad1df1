//! Content and user lifecycle operations that emit hooks
//!
//! Each operation adds `contentId` / `userId` (and the actor) to the caller's
//! payload before firing, so handlers always see which object changed.

use serde_json::Value;

use codex_core::hooks::{CONTENT_DELETED, CONTENT_PUBLISHED, USER_CREATED};
use codex_types::plugin::HookPayload;

use crate::prelude::*;

fn with_actor(mut payload: HookPayload, actor: &UserIdentity) -> HookPayload {
	payload.insert("actorId".into(), Value::from(actor.id.0));
	payload
}

/// Check `content.publish` and fire `content.published`
pub async fn publish_content(
	app: &AppState,
	actor: &UserIdentity,
	content_id: ContentId,
	payload: HookPayload,
) -> CxResult<Vec<Value>> {
	app.engine.require(actor, "content.publish", Some(content_id)).await?;

	let mut payload = with_actor(payload, actor);
	payload.insert("contentId".into(), Value::from(content_id.0));
	info!(content = %content_id, actor = %actor.id, "content published");
	Ok(app.hooks.fire(CONTENT_PUBLISHED, &payload).await)
}

/// Check `content.delete`, drop the content's overrides and fire `content.deleted`
pub async fn delete_content(
	app: &AppState,
	actor: &UserIdentity,
	content_id: ContentId,
	payload: HookPayload,
) -> CxResult<Vec<Value>> {
	app.engine.require(actor, "content.delete", Some(content_id)).await?;
	let removed = app.engine.overrides().purge_content(content_id).await?;

	let mut payload = with_actor(payload, actor);
	payload.insert("contentId".into(), Value::from(content_id.0));
	payload.insert("overridesRemoved".into(), Value::from(removed));
	info!(content = %content_id, actor = %actor.id, removed, "content deleted");
	Ok(app.hooks.fire(CONTENT_DELETED, &payload).await)
}

/// Fire `user.created` for a new account
pub async fn user_created(app: &AppState, user: &UserIdentity, payload: HookPayload) -> Vec<Value> {
	let mut payload = payload;
	payload.insert("userId".into(), Value::from(user.id.0));
	payload.insert("role".into(), Value::from(&*user.role));
	app.hooks.fire(USER_CREATED, &payload).await
}

// vim: ts=4
