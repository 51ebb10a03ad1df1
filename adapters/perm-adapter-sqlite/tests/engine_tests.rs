//! Permission engine over the SQLite adapter

use std::sync::Arc;

use codex::perm_adapter::Subject;
use codex::prelude::*;
use codex_core::PermissionEngine;
use codex_perm_adapter_sqlite::PermAdapterSqlite;
use tempfile::TempDir;

async fn create_engine() -> (PermissionEngine, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = PermAdapterSqlite::new(temp_dir.path().join("perm.db"))
		.await
		.expect("Failed to create adapter");
	let engine = PermissionEngine::builtin(Arc::new(adapter));
	engine.seed_roles().await.expect("Failed to seed roles");
	(engine, temp_dir)
}

#[tokio::test]
async fn test_object_override_scenario() {
	let (engine, _temp) = create_engine().await;
	let editor = UserIdentity::new(11, "editor");

	assert!(!engine.check(&editor, "content.delete", Some(ContentId(7))).await.unwrap());
	engine
		.overrides()
		.upsert(ContentId(7), "content.delete", true, None, &Subject::User(editor.id))
		.await
		.unwrap();
	assert!(engine.check(&editor, "content.delete", Some(ContentId(7))).await.unwrap());

	// user row wins over a later role deny
	engine
		.overrides()
		.upsert(ContentId(7), "content.delete", false, None, &Subject::Role("editor".into()))
		.await
		.unwrap();
	assert!(engine.check(&editor, "content.delete", Some(ContentId(7))).await.unwrap());
	let other = UserIdentity::new(12, "editor");
	assert!(!engine.check(&other, "content.delete", Some(ContentId(7))).await.unwrap());
}

#[tokio::test]
async fn test_role_permissions_persist() {
	let (engine, _temp) = create_engine().await;
	assert_eq!(engine.role_records().await.unwrap().len(), 5);

	engine.update_role_permissions("user", &["content.read", "media.upload"]).await.unwrap();
	let editor = UserIdentity::new(1, "editor");
	assert!(engine.check(&editor, "media.upload", None).await.unwrap());
}

// vim: ts=4
