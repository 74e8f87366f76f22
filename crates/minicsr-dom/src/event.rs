//! Events delivered to node listeners.

use std::rc::Rc;

/// Listener attached with [`DomNode::add_event_listener`](crate::DomNode::add_event_listener).
pub type EventHandler = Rc<dyn Fn(&Event)>;

/// A backend-neutral event.
///
/// Carries the event type and, for input-like events, the current value of
/// the target node so handlers do not need to reach back into the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
	event_type: String,
	value: Option<String>,
}

impl Event {
	/// Creates an event of the given type (`"click"`, `"input"`, ...).
	pub fn new(event_type: impl Into<String>) -> Self {
		Self {
			event_type: event_type.into(),
			value: None,
		}
	}

	/// Attaches the target's value.
	pub fn with_value(mut self, value: impl Into<String>) -> Self {
		self.value = Some(value.into());
		self
	}

	/// The event type.
	pub fn event_type(&self) -> &str {
		&self.event_type
	}

	/// The target's value at dispatch time, if any.
	pub fn value(&self) -> Option<&str> {
		self.value.as_deref()
	}
}
