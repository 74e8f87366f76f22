//! Application configuration.
//!
//! [`AppConfig`] gathers the four sections an application is built from
//! (initial data, methods, computed definitions, and the `mounted`
//! callback) plus the marker vocabulary and the notification depth limit.
//!
//! ## Example
//!
//! ```
//! use minicsr_pages::AppConfig;
//! use serde_json::json;
//!
//! let config = AppConfig::from_data_json(r#"{ "todos": [], "newTodo": "" }"#)
//!     .unwrap()
//!     .computed("count", |state| Ok(state.array("todos")?.len().into()))
//!     .method("addTodo", |state, _event, _item, _index| {
//!         let name = state.get("newTodo").unwrap_or_default();
//!         state.update("todos", |todos| {
//!             if let Some(todos) = todos.as_array_mut() {
//!                 todos.push(json!({ "name": name, "isDone": false }));
//!             }
//!         });
//!     });
//!
//! assert!(config.has_method("addTodo"));
//! ```

use core::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use minicsr_dom::Event;
use minicsr_reactive::{
	ComputeError, ComputedDef, DEFAULT_MAX_NOTIFY_DEPTH, StateMap, StateView, Store, Value,
};
use tracing::warn;

use crate::markers::MarkerConfig;

/// Event handler registered by name: `(state, event, item, index)`.
///
/// `item` and `index` are present only for handlers bound inside a repeated
/// section.
pub type Method = Rc<dyn Fn(&Store, &Event, Option<&Value>, Option<usize>)>;

/// Lifecycle callback run at the end of every mount.
pub type MountedFn = Rc<dyn Fn(&Store)>;

/// Configuration errors.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// The data section is not a JSON object.
	#[error("Application data must be a JSON object, got {0}")]
	NotAnObject(&'static str),

	/// The data section is not valid JSON.
	#[error("Invalid application data: {0}")]
	Json(#[from] serde_json::Error),
}

fn kind_of(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

/// Name to handler mapping, shared between an app and its bindings.
///
/// Lookups happen when an event fires, so a method defined after mount is
/// still reachable from markup bound earlier.
#[derive(Clone, Default)]
pub struct MethodTable {
	methods: Rc<RefCell<HashMap<String, Method>>>,
}

impl MethodTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `method` under `name`, replacing any previous handler.
	pub fn define(&self, name: impl Into<String>, method: Method) {
		self.methods.borrow_mut().insert(name.into(), method);
	}

	/// Returns the handler registered under `name`.
	pub fn get(&self, name: &str) -> Option<Method> {
		self.methods.borrow().get(name).cloned()
	}

	/// Returns true if `name` is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.methods.borrow().contains_key(name)
	}

	/// Invokes the handler registered under `name`.
	///
	/// Returns false, after logging a warning, if no such handler exists.
	pub fn invoke(
		&self,
		name: &str,
		state: &Store,
		event: &Event,
		item: Option<&Value>,
		index: Option<usize>,
	) -> bool {
		// Cloned out so the handler may define further methods.
		let Some(method) = self.get(name) else {
			warn!(
				method = name,
				event = event.event_type(),
				"event fired for an undefined method"
			);
			return false;
		};
		method(state, event, item, index);
		true
	}

	/// Number of registered methods.
	pub fn len(&self) -> usize {
		self.methods.borrow().len()
	}

	/// Returns true if no methods are registered.
	pub fn is_empty(&self) -> bool {
		self.methods.borrow().is_empty()
	}
}

impl std::fmt::Debug for MethodTable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut names: Vec<String> = self.methods.borrow().keys().cloned().collect();
		names.sort();
		f.debug_struct("MethodTable").field("methods", &names).finish()
	}
}

/// Builder for an application.
pub struct AppConfig {
	pub(crate) data: StateMap,
	pub(crate) methods: MethodTable,
	pub(crate) computed: Vec<ComputedDef>,
	pub(crate) mounted: Option<MountedFn>,
	pub(crate) markers: MarkerConfig,
	pub(crate) max_notify_depth: usize,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			data: StateMap::new(),
			methods: MethodTable::new(),
			computed: Vec::new(),
			mounted: None,
			markers: MarkerConfig::default(),
			max_notify_depth: DEFAULT_MAX_NOTIFY_DEPTH,
		}
	}
}

impl AppConfig {
	/// Creates an empty configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a configuration whose data section is parsed from JSON text.
	pub fn from_data_json(json: &str) -> Result<Self, ConfigError> {
		let value: Value = serde_json::from_str(json)?;
		Self::new().data_value(value)
	}

	/// Replaces the data section.
	pub fn data(mut self, data: StateMap) -> Self {
		self.data = data;
		self
	}

	/// Replaces the data section from a JSON value, which must be an object.
	pub fn data_value(self, data: Value) -> Result<Self, ConfigError> {
		match data {
			Value::Object(map) => Ok(self.data(map)),
			other => Err(ConfigError::NotAnObject(kind_of(&other))),
		}
	}

	/// Sets a single initial data property.
	pub fn value(mut self, prop: impl Into<String>, value: impl Into<Value>) -> Self {
		self.data.insert(prop.into(), value.into());
		self
	}

	/// Registers an event handler.
	pub fn method<F>(self, name: impl Into<String>, handler: F) -> Self
	where
		F: Fn(&Store, &Event, Option<&Value>, Option<usize>) + 'static,
	{
		self.methods.define(name, Rc::new(handler));
		self
	}

	/// Appends a computed definition. Definitions run in the order added.
	pub fn computed<F>(mut self, name: impl Into<String>, compute: F) -> Self
	where
		F: Fn(&StateView<'_>) -> Result<Value, ComputeError> + 'static,
	{
		self.computed.push(ComputedDef::new(name, compute));
		self
	}

	/// Sets the callback run at the end of every mount.
	pub fn mounted<F>(mut self, callback: F) -> Self
	where
		F: Fn(&Store) + 'static,
	{
		self.mounted = Some(Rc::new(callback));
		self
	}

	/// Replaces the marker vocabulary.
	pub fn markers(mut self, markers: MarkerConfig) -> Self {
		self.markers = markers;
		self
	}

	/// Sets the limit for nested notification cascades.
	pub fn max_notify_depth(mut self, depth: usize) -> Self {
		self.max_notify_depth = depth;
		self
	}

	/// Returns true if a method named `name` is registered.
	pub fn has_method(&self, name: &str) -> bool {
		self.methods.contains(name)
	}

	/// The initial data section.
	pub fn initial_data(&self) -> &StateMap {
		&self.data
	}
}

impl std::fmt::Debug for AppConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppConfig")
			.field("data", &self.data)
			.field("methods", &self.methods)
			.field(
				"computed",
				&self.computed.iter().map(ComputedDef::name).collect::<Vec<_>>(),
			)
			.field("mounted", &self.mounted.is_some())
			.field("markers", &self.markers)
			.field("max_notify_depth", &self.max_notify_depth)
			.finish()
	}
}
