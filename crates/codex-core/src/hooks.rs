//! Hook bus: registration and sequential dispatch of lifecycle events
//!
//! Subscribers are called in registration order, one at a time. A failing
//! subscriber (error, panic or timeout) is logged and skipped; it never stops
//! delivery to the others and never reaches the caller of `fire`. Only the
//! values of successful handlers are returned, so the result can be shorter
//! than the subscriber list.
//!
//! Registration is append-only. Subscriptions can be paused, not removed.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::FutureExt;
use parking_lot::RwLock;
use serde_json::Value;

use codex_types::plugin::{HookPayload, Plugin};

use crate::prelude::*;

pub const CONTENT_CREATED: &str = "content.created";
pub const CONTENT_UPDATED: &str = "content.updated";
pub const CONTENT_PUBLISHED: &str = "content.published";
pub const CONTENT_UNPUBLISHED: &str = "content.unpublished";
pub const CONTENT_DELETED: &str = "content.deleted";
pub const USER_CREATED: &str = "user.created";
pub const USER_UPDATED: &str = "user.updated";
pub const USER_DELETED: &str = "user.deleted";
pub const MEDIA_UPLOADED: &str = "media.uploaded";
pub const TEAM_MEMBER_ADDED: &str = "team.member_added";
pub const IMPORT_COMPLETED: &str = "import.completed";

/// Hook names emitted by the system
pub const KNOWN_HOOKS: &[&str] = &[
	CONTENT_CREATED,
	CONTENT_UPDATED,
	CONTENT_PUBLISHED,
	CONTENT_UNPUBLISHED,
	CONTENT_DELETED,
	USER_CREATED,
	USER_UPDATED,
	USER_DELETED,
	MEDIA_UPLOADED,
	TEAM_MEMBER_ADDED,
	IMPORT_COMPLETED,
];

/// Handle to a registration; pausing stops delivery without unregistering
#[derive(Debug, Clone)]
pub struct Subscription {
	active: Arc<AtomicBool>,
}

impl Subscription {
	pub fn pause(&self) {
		self.active.store(false, Ordering::Release);
	}

	pub fn resume(&self) {
		self.active.store(true, Ordering::Release);
	}

	pub fn is_active(&self) -> bool {
		self.active.load(Ordering::Acquire)
	}
}

#[derive(Clone)]
struct Subscriber {
	plugin: Arc<dyn Plugin>,
	active: Arc<AtomicBool>,
}

/// Why a handler produced no result
#[derive(Debug)]
enum HookHandlerFailure {
	Error(Error),
	Panic(String),
	Timeout(Duration),
}

impl std::fmt::Display for HookHandlerFailure {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			HookHandlerFailure::Error(err) => write!(f, "{}", err),
			HookHandlerFailure::Panic(msg) => write!(f, "panicked: {}", msg),
			HookHandlerFailure::Timeout(d) => write!(f, "timed out after {:?}", d),
		}
	}
}

pub struct HookBus {
	subscribers: RwLock<HashMap<Box<str>, Vec<Subscriber>>>,
	timeout: Option<Duration>,
}

impl std::fmt::Debug for HookBus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HookBus")
			.field("hooks", &self.hook_names())
			.field("timeout", &self.timeout)
			.finish()
	}
}

impl HookBus {
	pub fn new() -> Self {
		Self { subscribers: RwLock::new(HashMap::new()), timeout: None }
	}

	/// Bus that gives up on a handler after `timeout`
	pub fn with_timeout(timeout: Duration) -> Self {
		Self { subscribers: RwLock::new(HashMap::new()), timeout: Some(timeout) }
	}

	/// Register a subscriber against every hook it declares
	pub fn register(&self, plugin: Arc<dyn Plugin>) -> Subscription {
		let active = Arc::new(AtomicBool::new(true));
		let mut subscribers = self.subscribers.write();
		for &hook in plugin.hooks() {
			if !KNOWN_HOOKS.contains(&hook) {
				warn!(plugin = plugin.name(), hook = hook, "subscribing to unknown hook");
			}
			subscribers
				.entry(hook.into())
				.or_default()
				.push(Subscriber { plugin: plugin.clone(), active: active.clone() });
		}
		debug!(plugin = plugin.name(), hooks = ?plugin.hooks(), "plugin registered");
		Subscription { active }
	}

	/// Subscriber names of a hook, in registration order
	pub fn subscribers(&self, hook: &str) -> Vec<String> {
		self.subscribers
			.read()
			.get(hook)
			.map(|subs| subs.iter().map(|s| s.plugin.name().to_string()).collect())
			.unwrap_or_default()
	}

	/// Hooks with at least one subscriber, sorted
	pub fn hook_names(&self) -> Vec<String> {
		let mut names: Vec<String> =
			self.subscribers.read().keys().map(ToString::to_string).collect();
		names.sort();
		names
	}

	/// Dispatch an event to every active subscriber of `hook`
	pub async fn fire(&self, hook: &str, payload: &HookPayload) -> Vec<Value> {
		// Snapshot, so the lock is not held across handler awaits
		let subscribers: Vec<Subscriber> = match self.subscribers.read().get(hook) {
			Some(subs) => subs.iter().filter(|s| s.active.load(Ordering::Acquire)).cloned().collect(),
			None => return Vec::new(),
		};

		let mut results = Vec::with_capacity(subscribers.len());
		for sub in subscribers {
			match self.call(&sub, hook, payload).await {
				Ok(value) => results.push(value),
				Err(failure) => {
					warn!(
						plugin = sub.plugin.name(),
						hook = hook,
						error = %failure,
						"hook handler failure"
					);
				}
			}
		}
		debug!(hook = hook, delivered = results.len(), "hook fired");
		results
	}

	async fn call(
		&self,
		sub: &Subscriber,
		hook: &str,
		payload: &HookPayload,
	) -> Result<Value, HookHandlerFailure> {
		let handler = AssertUnwindSafe(sub.plugin.handle_hook(hook, payload)).catch_unwind();
		let outcome = match self.timeout {
			Some(timeout) => tokio::time::timeout(timeout, handler)
				.await
				.map_err(|_| HookHandlerFailure::Timeout(timeout))?,
			None => handler.await,
		};

		match outcome {
			Ok(Ok(value)) => Ok(value),
			Ok(Err(err)) => Err(HookHandlerFailure::Error(err)),
			Err(panic) => {
				let msg = panic
					.downcast_ref::<&str>()
					.map(ToString::to_string)
					.or_else(|| panic.downcast_ref::<String>().cloned())
					.unwrap_or_else(|| "unknown panic".into());
				Err(HookHandlerFailure::Panic(msg))
			}
		}
	}
}

impl Default for HookBus {
	fn default() -> Self {
		Self::new()
	}
}


// vim: ts=4
