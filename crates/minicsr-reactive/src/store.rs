//! State Store
//!
//! The mutable source of truth. Every write goes through [`Store::set`], which
//!
//! 1. compares the new value against the stored one and returns early when equal,
//! 2. stores the value,
//! 3. broadcasts it to the property's listeners,
//! 4. runs one [`ComputedEvaluator`] pass.
//!
//! `Store` is a cheap, cloneable handle; all clones share the same state,
//! registry and evaluator. It is single-threaded by construction (`Rc`).
//!
//! ## Recursive notification
//!
//! A listener may itself call [`Store::set`], which notifies again before the
//! outer broadcast has finished. Cascades are allowed up to
//! `max_notify_depth` nested broadcasts. Past that depth the value is still
//! stored, but its broadcast and the recalculation pass are skipped and a
//! warning is logged, which turns a runaway cycle into a visible no-op instead
//! of a stack overflow.

use core::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde_json::{Map, Value};
use tracing::{trace, warn};

use crate::computed::{ComputedDef, ComputedEvaluator};
use crate::registry::{Listener, SubscriptionRegistry};

/// Default limit for nested notification cascades.
pub const DEFAULT_MAX_NOTIFY_DEPTH: usize = 64;

struct StoreInner {
	data: RefCell<Map<String, Value>>,
	registry: SubscriptionRegistry,
	evaluator: ComputedEvaluator,
	depth: Cell<usize>,
	max_depth: usize,
}

/// Intercepting wrapper around the state object.
#[derive(Clone)]
pub struct Store {
	inner: Rc<StoreInner>,
}

/// Non-owning handle to a [`Store`].
///
/// Node event listeners hold one of these so that a node kept alive by a
/// store subscription does not keep the store alive in turn.
#[derive(Clone)]
pub struct WeakStore {
	inner: Weak<StoreInner>,
}

impl WeakStore {
	/// Returns the store if it is still alive.
	pub fn upgrade(&self) -> Option<Store> {
		self.inner.upgrade().map(|inner| Store { inner })
	}
}

impl std::fmt::Debug for WeakStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WeakStore")
			.field("alive", &(self.inner.strong_count() > 0))
			.finish()
	}
}

/// Restores the notification depth even if a listener panics.
struct DepthGuard<'a>(&'a Cell<usize>);

impl Drop for DepthGuard<'_> {
	fn drop(&mut self) {
		self.0.set(self.0.get().saturating_sub(1));
	}
}

impl Store {
	/// Creates a store over `data` with the given computed definitions.
	pub fn new(data: Map<String, Value>, computed: Vec<ComputedDef>) -> Self {
		Self::with_max_notify_depth(data, computed, DEFAULT_MAX_NOTIFY_DEPTH)
	}

	/// Creates a store with an explicit limit for nested notification cascades.
	pub fn with_max_notify_depth(
		data: Map<String, Value>,
		computed: Vec<ComputedDef>,
		max_depth: usize,
	) -> Self {
		Self {
			inner: Rc::new(StoreInner {
				data: RefCell::new(data),
				registry: SubscriptionRegistry::new(),
				evaluator: ComputedEvaluator::new(computed),
				depth: Cell::new(0),
				max_depth,
			}),
		}
	}

	/// Returns a copy of the current value of `prop`, or `None` if it is undefined.
	pub fn get(&self, prop: &str) -> Option<Value> {
		self.inner.data.borrow().get(prop).cloned()
	}

	/// Returns true if `prop` is defined.
	pub fn contains(&self, prop: &str) -> bool {
		self.inner.data.borrow().contains_key(prop)
	}

	/// Runs `f` against the stored value of `prop` without cloning it.
	pub fn with<R>(&self, prop: &str, f: impl FnOnce(Option<&Value>) -> R) -> R {
		f(self.inner.data.borrow().get(prop))
	}

	/// Writes `value` to `prop`.
	///
	/// A write that does not change the value (structural equality) is a
	/// no-op: no listener runs and no recalculation happens. Writing to a
	/// property that does not exist yet creates it.
	pub fn set(&self, prop: impl Into<String>, value: impl Into<Value>) {
		let prop = prop.into();
		let value = value.into();
		{
			let mut data = self.inner.data.borrow_mut();
			if data.get(&prop) == Some(&value) {
				trace!(property = %prop, "write skipped, value unchanged");
				return;
			}
			data.insert(prop.clone(), value.clone());
		}
		trace!(property = %prop, %value, "state write");
		self.notify(&prop, &value);
	}

	/// Clones the value of `prop` (or `null`), lets `f` modify the copy, then
	/// writes it back through [`Store::set`].
	pub fn update(&self, prop: impl Into<String>, f: impl FnOnce(&mut Value)) {
		let prop = prop.into();
		let mut value = self.get(&prop).unwrap_or(Value::Null);
		f(&mut value);
		self.set(prop, value);
	}

	fn notify(&self, prop: &str, value: &Value) {
		let depth = self.inner.depth.get();
		if depth >= self.inner.max_depth {
			warn!(
				property = %prop,
				depth,
				"notification depth limit reached, broadcast skipped"
			);
			return;
		}
		self.inner.depth.set(depth + 1);
		let _guard = DepthGuard(&self.inner.depth);

		let listeners = self.inner.registry.notify(prop, value);
		trace!(property = %prop, listeners, "notified");
		self.recalculate();
	}

	/// Registers a listener for `prop`.
	pub fn subscribe<F>(&self, prop: impl Into<String>, callback: F)
	where
		F: Fn(&Value) + 'static,
	{
		self.inner.registry.subscribe(prop, callback);
	}

	/// Registers an already shared listener for `prop`.
	pub fn subscribe_listener(&self, prop: impl Into<String>, listener: Listener) {
		self.inner.registry.subscribe_listener(prop, listener);
	}

	/// Forces one recalculation pass over every computed definition.
	///
	/// Returns the names of the computed properties whose value changed.
	pub fn recalculate(&self) -> Vec<String> {
		self.inner
			.evaluator
			.recalculate(&self.inner.data, &self.inner.registry)
	}

	/// Returns a copy of the whole state object.
	pub fn snapshot(&self) -> Map<String, Value> {
		self.inner.data.borrow().clone()
	}

	/// The subscription registry backing this store.
	pub fn registry(&self) -> &SubscriptionRegistry {
		&self.inner.registry
	}

	/// The computed evaluator backing this store.
	pub fn evaluator(&self) -> &ComputedEvaluator {
		&self.inner.evaluator
	}

	/// Creates a non-owning handle to this store.
	pub fn downgrade(&self) -> WeakStore {
		WeakStore {
			inner: Rc::downgrade(&self.inner),
		}
	}

	/// The configured limit for nested notification cascades.
	pub fn max_notify_depth(&self) -> usize {
		self.inner.max_depth
	}
}

impl std::fmt::Debug for Store {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Store")
			.field("data", &self.inner.data.borrow())
			.field("registry", &self.inner.registry)
			.field("evaluator", &self.inner.evaluator)
			.finish()
	}
}
