//! Subscription Registry
//!
//! Maps a property name to the ordered list of callbacks interested in it.
//! Subscriptions live for the lifetime of the registry: there is no
//! unsubscribe, and identical callbacks are not de-duplicated.

use core::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

/// A property listener. Receives the new value of the property.
pub type Listener = Rc<dyn Fn(&Value)>;

/// Property name -> listeners, in registration order.
#[derive(Default)]
pub struct SubscriptionRegistry {
	listeners: RefCell<HashMap<String, Vec<Listener>>>,
}

impl SubscriptionRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a callback to the listener list of `prop`, creating the list if absent.
	pub fn subscribe<F>(&self, prop: impl Into<String>, callback: F)
	where
		F: Fn(&Value) + 'static,
	{
		self.subscribe_listener(prop, Rc::new(callback));
	}

	/// Appends an already shared listener to the list of `prop`.
	pub fn subscribe_listener(&self, prop: impl Into<String>, listener: Listener) {
		self.listeners
			.borrow_mut()
			.entry(prop.into())
			.or_default()
			.push(listener);
	}

	/// Invokes every listener of `prop` in registration order.
	///
	/// The listener list is snapshotted before the first call, so listeners
	/// may subscribe further callbacks (for example while a repeated section
	/// rebuilds) without those new callbacks seeing the current broadcast.
	/// Panics raised by a listener propagate to the caller.
	///
	/// Returns the number of listeners invoked.
	pub fn notify(&self, prop: &str, value: &Value) -> usize {
		let snapshot: Vec<Listener> = match self.listeners.borrow().get(prop) {
			Some(list) => list.clone(),
			None => return 0,
		};
		for listener in &snapshot {
			listener(value);
		}
		snapshot.len()
	}

	/// Returns the number of listeners registered for `prop`.
	pub fn listener_count(&self, prop: &str) -> usize {
		self.listeners.borrow().get(prop).map_or(0, Vec::len)
	}

	/// Returns the number of properties with at least one listener.
	pub fn len(&self) -> usize {
		self.listeners.borrow().len()
	}

	/// Returns true if nothing has subscribed yet.
	pub fn is_empty(&self) -> bool {
		self.listeners.borrow().is_empty()
	}
}

impl std::fmt::Debug for SubscriptionRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let listeners = self.listeners.borrow();
		let mut counts: Vec<(&String, usize)> =
			listeners.iter().map(|(k, v)| (k, v.len())).collect();
		counts.sort();
		f.debug_struct("SubscriptionRegistry")
			.field("listeners", &counts)
			.finish()
	}
}
