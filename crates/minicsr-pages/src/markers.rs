//! Marker attribute names.
//!
//! Every declarative marker the binder recognizes is configurable, so markup
//! written for a different attribute vocabulary can be mounted unchanged.
//! Missing fields fall back to the defaults when deserializing.

use serde::{Deserialize, Serialize};

/// Attribute names for every marker, plus the global-escape prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
	/// Repeated-section marker (`data-for="todos"`).
	pub repeat: String,
	/// Text marker inside repeated sections (`data-bind="name"`).
	pub local_text: String,
	/// Attribute marker prefix (`data-bind:title="tip"`).
	pub attribute_prefix: String,
	/// Event marker prefix (`data-on:click="addTodo"`).
	pub event_prefix: String,
	/// Conditional class marker (`data-class="done:isDone"`).
	pub class: String,
	/// Text marker outside repeated sections (`data-text="done"`).
	pub text: String,
	/// Two-way value marker (`data-model="newTodo"`).
	pub model: String,
	/// Visibility marker (`data-show="hasTodos"`).
	pub show: String,
	/// Prefix forcing global resolution inside a repeated section (`$`).
	pub global_prefix: String,
}

impl Default for MarkerConfig {
	fn default() -> Self {
		Self {
			repeat: "data-for".to_string(),
			local_text: "data-bind".to_string(),
			attribute_prefix: "data-bind:".to_string(),
			event_prefix: "data-on:".to_string(),
			class: "data-class".to_string(),
			text: "data-text".to_string(),
			model: "data-model".to_string(),
			show: "data-show".to_string(),
			global_prefix: "$".to_string(),
		}
	}
}

impl MarkerConfig {
	/// Returns the target attribute for an attribute marker
	/// (`data-bind:title` -> `title`).
	pub fn bound_attribute<'a>(&self, name: &'a str) -> Option<&'a str> {
		name.strip_prefix(self.attribute_prefix.as_str())
			.filter(|attr| !attr.is_empty())
	}

	/// Returns the event name for an event marker (`data-on:click` -> `click`).
	pub fn bound_event<'a>(&self, name: &'a str) -> Option<&'a str> {
		name.strip_prefix(self.event_prefix.as_str())
			.filter(|event| !event.is_empty())
	}
}

/// Splits a conditional class marker value into `(class, property)`.
///
/// Values without a `:` separator, or with an empty half, are ignored. Only
/// the first two segments count: `a:b:c` binds class `a` to property `b`.
pub fn split_class_marker(value: &str) -> Option<(&str, &str)> {
	let mut segments = value.split(':');
	let (class, prop) = (segments.next()?.trim(), segments.next()?.trim());
	if class.is_empty() || prop.is_empty() {
		return None;
	}
	Some((class, prop))
}
