//! Common test utilities
//!
//! `MemPermAdapter` is an in-memory `PermAdapter` that counts writes, so
//! tests can assert that rejected calls never reached storage.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use codex_types::perm_adapter::{
	ObjectOverride, PermAdapter, RoleRecord, Subject, UpsertOverrideData,
};
use codex_types::prelude::*;

#[derive(Debug, Default)]
struct Inner {
	next_id: i64,
	overrides: BTreeMap<i64, ObjectOverride>,
	roles: BTreeMap<Box<str>, RoleRecord>,
}

#[derive(Debug, Default)]
pub struct MemPermAdapter {
	inner: Mutex<Inner>,
	writes: AtomicUsize,
	// upserts after this many writes fail with a storage error
	write_limit: Mutex<Option<usize>>,
}

impl MemPermAdapter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of mutating calls that reached the adapter
	pub fn writes(&self) -> usize {
		self.writes.load(Ordering::SeqCst)
	}

	pub fn fail_writes_after(&self, limit: usize) {
		*self.write_limit.lock() = Some(limit);
	}

	pub fn override_count(&self) -> usize {
		self.inner.lock().overrides.len()
	}
}

#[async_trait]
impl PermAdapter for MemPermAdapter {
	async fn upsert_override(&self, data: &UpsertOverrideData<'_>) -> CxResult<ObjectOverride> {
		let done = self.writes.fetch_add(1, Ordering::SeqCst);
		if self.write_limit.lock().is_some_and(|limit| done >= limit) {
			return Err(Error::DbError);
		}
		let mut inner = self.inner.lock();
		let existing = inner.overrides.values_mut().find(|row| {
			row.content_id == data.content_id
				&& row.subject == *data.subject
				&& &*row.permission == data.permission
		});
		if let Some(row) = existing {
			row.granted = data.granted;
			row.created_by = data.created_by;
			row.created_at = Timestamp::now();
			return Ok(row.clone());
		}

		inner.next_id += 1;
		let id = inner.next_id;
		let row = ObjectOverride {
			override_id: OverrideId(id),
			content_id: data.content_id,
			subject: data.subject.clone(),
			permission: data.permission.into(),
			granted: data.granted,
			created_by: data.created_by,
			created_at: Timestamp::now(),
		};
		inner.overrides.insert(id, row.clone());
		Ok(row)
	}

	async fn list_overrides(&self, content_id: ContentId) -> CxResult<Vec<ObjectOverride>> {
		let inner = self.inner.lock();
		Ok(inner.overrides.values().filter(|row| row.content_id == content_id).cloned().collect())
	}

	async fn list_applicable_overrides(
		&self,
		content_id: ContentId,
		user_id: UserId,
		role_name: &str,
	) -> CxResult<Vec<ObjectOverride>> {
		let inner = self.inner.lock();
		// reverse insertion order, so callers cannot rely on storage order
		Ok(inner
			.overrides
			.values()
			.rev()
			.filter(|row| {
				row.content_id == content_id
					&& match &row.subject {
						Subject::User(id) => *id == user_id,
						Subject::Role(name) => &**name == role_name,
					}
			})
			.cloned()
			.collect())
	}

	async fn read_override(&self, override_id: OverrideId) -> CxResult<ObjectOverride> {
		self.inner.lock().overrides.get(&override_id.0).cloned().ok_or(Error::NotFound)
	}

	async fn read_subject_override(
		&self,
		content_id: ContentId,
		subject: &Subject,
		permission: &str,
	) -> CxResult<Option<bool>> {
		let inner = self.inner.lock();
		Ok(inner
			.overrides
			.values()
			.find(|row| {
				row.content_id == content_id
					&& row.subject == *subject
					&& &*row.permission == permission
			})
			.map(|row| row.granted))
	}

	async fn delete_override(&self, override_id: OverrideId) -> CxResult<()> {
		self.writes.fetch_add(1, Ordering::SeqCst);
		self.inner.lock().overrides.remove(&override_id.0).map(|_| ()).ok_or(Error::NotFound)
	}

	async fn delete_content_overrides(&self, content_id: ContentId) -> CxResult<u64> {
		self.writes.fetch_add(1, Ordering::SeqCst);
		let mut inner = self.inner.lock();
		let before = inner.overrides.len();
		inner.overrides.retain(|_, row| row.content_id != content_id);
		Ok((before - inner.overrides.len()) as u64)
	}

	async fn read_role(&self, name: &str) -> CxResult<Option<RoleRecord>> {
		Ok(self.inner.lock().roles.get(name).cloned())
	}

	async fn list_roles(&self) -> CxResult<Vec<RoleRecord>> {
		Ok(self.inner.lock().roles.values().cloned().collect())
	}

	async fn create_role(
		&self,
		name: &str,
		description: Option<&str>,
		permissions: &[&str],
	) -> CxResult<bool> {
		self.writes.fetch_add(1, Ordering::SeqCst);
		let mut inner = self.inner.lock();
		if inner.roles.contains_key(name) {
			return Ok(false);
		}
		inner.roles.insert(
			name.into(),
			RoleRecord {
				name: name.into(),
				description: description.map(Into::into),
				permissions: permissions.iter().map(|&p| p.into()).collect(),
				updated_at: Timestamp::now(),
			},
		);
		Ok(true)
	}

	async fn update_role_permissions(
		&self,
		name: &str,
		permissions: &[&str],
	) -> CxResult<RoleRecord> {
		self.writes.fetch_add(1, Ordering::SeqCst);
		let mut inner = self.inner.lock();
		let record = inner.roles.get_mut(name).ok_or(Error::NotFound)?;
		record.permissions = permissions.iter().map(|&p| p.into()).collect();
		record.updated_at = Timestamp::now();
		Ok(record.clone())
	}
}

pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
		.try_init();
}

// vim: ts=4
