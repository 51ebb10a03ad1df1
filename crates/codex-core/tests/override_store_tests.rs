//! Object override store tests

mod common;

use std::sync::Arc;

use codex_core::{Catalogue, OverrideRequest, OverrideStore, RoleTable};
use codex_types::perm_adapter::{OverrideDecision, Subject};
use codex_types::prelude::*;

use common::MemPermAdapter;

fn create_store() -> (OverrideStore, Arc<MemPermAdapter>) {
	let adapter = Arc::new(MemPermAdapter::new());
	let store = OverrideStore::new(adapter.clone(), Catalogue::builtin(), RoleTable::builtin());
	(store, adapter)
}

fn request(user_id: Option<i64>, role_name: Option<&str>, permission: &str) -> OverrideRequest {
	OverrideRequest {
		content_id: ContentId(1),
		permission: permission.into(),
		granted: true,
		user_id: user_id.map(UserId),
		role_name: role_name.map(Into::into),
	}
}

#[tokio::test]
async fn test_unknown_permission_writes_nothing() {
	let (store, adapter) = create_store();
	let res = store
		.upsert(ContentId(1), "content.teleport", true, None, &Subject::User(UserId(5)))
		.await;
	assert!(matches!(res, Err(Error::UnknownPermission(t)) if &*t == "content.teleport"));
	assert_eq!(adapter.writes(), 0);
	assert!(store.list(ContentId(1)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_subject_exclusivity() {
	let (store, adapter) = create_store();

	let both = request(Some(5), Some("editor"), "content.read");
	assert!(matches!(store.upsert_request(&both, None).await, Err(Error::InvalidSubject(_))));

	let neither = request(None, None, "content.read");
	assert!(matches!(store.upsert_request(&neither, None).await, Err(Error::InvalidSubject(_))));

	// subject is checked before the token
	let both_bad_token = request(Some(5), Some("editor"), "content.teleport");
	assert!(matches!(
		store.upsert_request(&both_bad_token, None).await,
		Err(Error::InvalidSubject(_))
	));
	assert_eq!(adapter.writes(), 0);

	let ok = request(None, Some("editor"), "content.read");
	let row = store.upsert_request(&ok, Some(UserId(1))).await.unwrap();
	assert_eq!(row.subject, Subject::Role("editor".into()));
	assert_eq!(row.created_by, Some(UserId(1)));
}

#[tokio::test]
async fn test_unknown_role_subject_is_rejected() {
	let (store, adapter) = create_store();
	let res = store
		.upsert(ContentId(1), "content.read", true, None, &Subject::Role("guest".into()))
		.await;
	assert!(matches!(res, Err(Error::InvalidRole(r)) if &*r == "guest"));
	assert_eq!(adapter.writes(), 0);
}

#[tokio::test]
async fn test_upsert_replaces_existing_row() {
	let (store, adapter) = create_store();
	let subject = Subject::User(UserId(5));

	let first = store.upsert(ContentId(1), "content.update", true, None, &subject).await.unwrap();
	let second = store
		.upsert(ContentId(1), "content.update", false, Some(UserId(2)), &subject)
		.await
		.unwrap();

	assert_eq!(first.override_id, second.override_id);
	let rows = store.list(ContentId(1)).await.unwrap();
	assert_eq!(rows.len(), 1);
	assert!(!rows[0].granted);
	assert_eq!(rows[0].created_by, Some(UserId(2)));
	assert_eq!(adapter.override_count(), 1);
}

#[tokio::test]
async fn test_same_permission_different_subjects_are_distinct() {
	let (store, _adapter) = create_store();
	store
		.upsert(ContentId(1), "content.update", true, None, &Subject::User(UserId(5)))
		.await
		.unwrap();
	store
		.upsert(ContentId(1), "content.update", false, None, &Subject::Role("editor".into()))
		.await
		.unwrap();
	store
		.upsert(ContentId(2), "content.update", true, None, &Subject::User(UserId(5)))
		.await
		.unwrap();

	assert_eq!(store.list(ContentId(1)).await.unwrap().len(), 2);
	assert_eq!(store.list(ContentId(2)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_revoke_and_read() {
	let (store, _adapter) = create_store();
	let row = store
		.upsert(ContentId(1), "content.read", false, None, &Subject::User(UserId(5)))
		.await
		.unwrap();

	let read = store.read(row.override_id).await.unwrap();
	assert_eq!(&*read.permission, "content.read");

	store.revoke(row.override_id).await.unwrap();
	assert!(matches!(store.revoke(row.override_id).await, Err(Error::NotFound)));
	assert!(matches!(store.read(row.override_id).await, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_lookup_prefers_user_row() {
	let (store, _adapter) = create_store();
	let content = ContentId(1);

	assert_eq!(
		store.lookup(content, UserId(5), "editor", "content.publish").await.unwrap(),
		OverrideDecision::NoOverride
	);

	store
		.upsert(content, "content.publish", false, None, &Subject::Role("editor".into()))
		.await
		.unwrap();
	assert_eq!(
		store.lookup(content, UserId(5), "editor", "content.publish").await.unwrap(),
		OverrideDecision::Deny
	);

	store.upsert(content, "content.publish", true, None, &Subject::User(UserId(5))).await.unwrap();
	assert_eq!(
		store.lookup(content, UserId(5), "editor", "content.publish").await.unwrap(),
		OverrideDecision::Grant
	);
	// role rows do not leak to other roles
	assert_eq!(
		store.lookup(content, UserId(6), "user", "content.publish").await.unwrap(),
		OverrideDecision::NoOverride
	);
}

#[tokio::test]
async fn test_applicable_orders_role_rows_first() {
	let (store, _adapter) = create_store();
	let content = ContentId(1);
	store.upsert(content, "content.read", true, None, &Subject::User(UserId(5))).await.unwrap();
	store
		.upsert(content, "content.read", false, None, &Subject::Role("editor".into()))
		.await
		.unwrap();
	store
		.upsert(content, "content.update", false, None, &Subject::Role("manager".into()))
		.await
		.unwrap();

	let rows = store.applicable(content, UserId(5), "editor").await.unwrap();
	assert_eq!(rows.len(), 2);
	assert!(matches!(rows[0].subject, Subject::Role(_)));
	assert!(matches!(rows[1].subject, Subject::User(_)));
}

#[tokio::test]
async fn test_apply_template() {
	let (store, _adapter) = create_store();
	let subject = Subject::User(UserId(5));

	let rows = store
		.apply_template(ContentId(3), "content_publisher", true, Some(UserId(1)), &subject)
		.await
		.unwrap();
	assert_eq!(rows.len(), 3);
	assert_eq!(store.list(ContentId(3)).await.unwrap().len(), 3);

	assert!(matches!(
		store.apply_template(ContentId(3), "no_such_template", true, None, &subject).await,
		Err(Error::NotFound)
	));
}

#[tokio::test]
async fn test_apply_template_keeps_rows_written_before_failure() {
	let (store, adapter) = create_store();
	adapter.fail_writes_after(2);

	let res = store
		.apply_template(ContentId(3), "content_publisher", true, None, &Subject::User(UserId(5)))
		.await;
	assert!(matches!(res, Err(Error::DbError)));
	assert_eq!(store.list(ContentId(3)).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_purge_content() {
	let (store, _adapter) = create_store();
	let subject = Subject::User(UserId(5));
	store.apply_template(ContentId(3), "content_editor", true, None, &subject).await.unwrap();
	store.upsert(ContentId(4), "content.read", true, None, &subject).await.unwrap();

	assert_eq!(store.purge_content(ContentId(3)).await.unwrap(), 3);
	assert!(store.list(ContentId(3)).await.unwrap().is_empty());
	assert_eq!(store.list(ContentId(4)).await.unwrap().len(), 1);
}

// vim: ts=4
