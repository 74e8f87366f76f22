//! Computed Evaluator
//!
//! Computed properties are named pure functions of the whole state. After any
//! state write, every definition is re-evaluated in declaration order; outputs
//! are written back into the state object under the definition's name, so once
//! the first pass has run a computed property reads exactly like a stored one.
//!
//! There is no dependency tracking. A definition runs after every write, not
//! only after writes to the properties it reads.
//!
//! ## Failure handling
//!
//! A definition that returns [`ComputeError`] is logged and skipped: its stored
//! value stays untouched and the remaining definitions still run.

use core::cell::RefCell;
use std::rc::Rc;

use serde_json::{Map, Value};
use tracing::{error, trace};

use crate::error::ComputeError;
use crate::registry::SubscriptionRegistry;

/// Signature of a computed definition.
pub type ComputeFn = Rc<dyn Fn(&StateView<'_>) -> Result<Value, ComputeError>>;

/// Read-only view of the state object handed to computed definitions.
///
/// The typed accessors return [`ComputeError`] so definitions can use `?`.
#[derive(Debug, Clone, Copy)]
pub struct StateView<'a> {
	data: &'a Map<String, Value>,
}

impl<'a> StateView<'a> {
	/// Wraps a state map.
	pub fn new(data: &'a Map<String, Value>) -> Self {
		Self { data }
	}

	/// Returns the raw value of `prop`, if defined.
	pub fn get(&self, prop: &str) -> Option<&'a Value> {
		self.data.get(prop)
	}

	/// Returns the value of `prop` or [`ComputeError::MissingProperty`].
	pub fn require(&self, prop: &str) -> Result<&'a Value, ComputeError> {
		self.data
			.get(prop)
			.ok_or_else(|| ComputeError::MissingProperty(prop.to_string()))
	}

	/// Reads `prop` as an array.
	pub fn array(&self, prop: &str) -> Result<&'a Vec<Value>, ComputeError> {
		self.require(prop)?
			.as_array()
			.ok_or_else(|| ComputeError::type_mismatch(prop, "an array"))
	}

	/// Reads `prop` as a string.
	pub fn str(&self, prop: &str) -> Result<&'a str, ComputeError> {
		self.require(prop)?
			.as_str()
			.ok_or_else(|| ComputeError::type_mismatch(prop, "a string"))
	}

	/// Reads `prop` as a boolean.
	pub fn bool(&self, prop: &str) -> Result<bool, ComputeError> {
		self.require(prop)?
			.as_bool()
			.ok_or_else(|| ComputeError::type_mismatch(prop, "a boolean"))
	}

	/// Reads `prop` as a number.
	pub fn number(&self, prop: &str) -> Result<f64, ComputeError> {
		self.require(prop)?
			.as_f64()
			.ok_or_else(|| ComputeError::type_mismatch(prop, "a number"))
	}

	/// The whole state object.
	pub fn data(&self) -> &'a Map<String, Value> {
		self.data
	}
}

/// A named computed definition.
#[derive(Clone)]
pub struct ComputedDef {
	name: String,
	compute: ComputeFn,
}

impl ComputedDef {
	/// Creates a definition whose output is stored under `name`.
	pub fn new<F>(name: impl Into<String>, compute: F) -> Self
	where
		F: Fn(&StateView<'_>) -> Result<Value, ComputeError> + 'static,
	{
		Self {
			name: name.into(),
			compute: Rc::new(compute),
		}
	}

	/// The property name the output is written to.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Evaluates the definition against `data`.
	pub fn evaluate(&self, data: &Map<String, Value>) -> Result<Value, ComputeError> {
		(self.compute)(&StateView::new(data))
	}
}

impl std::fmt::Debug for ComputedDef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ComputedDef")
			.field("name", &self.name)
			.field("compute", &"<function>")
			.finish()
	}
}

/// Recomputes every computed definition, in declaration order.
#[derive(Debug, Default, Clone)]
pub struct ComputedEvaluator {
	defs: Vec<ComputedDef>,
}

impl ComputedEvaluator {
	/// Creates an evaluator over `defs`. The order of `defs` is the evaluation order.
	pub fn new(defs: Vec<ComputedDef>) -> Self {
		Self { defs }
	}

	/// Names of the computed properties, in declaration order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.defs.iter().map(ComputedDef::name)
	}

	/// Returns the number of definitions.
	pub fn len(&self) -> usize {
		self.defs.len()
	}

	/// Returns true if there are no definitions.
	pub fn is_empty(&self) -> bool {
		self.defs.is_empty()
	}

	/// Runs one recalculation pass.
	///
	/// Each definition is evaluated against the current state. A changed output
	/// is written into `data` and broadcast to the property's own listeners;
	/// an unchanged output is left alone. No borrow of `data` is held while
	/// listeners run.
	///
	/// Returns the names of the properties whose value changed.
	pub fn recalculate(
		&self,
		data: &RefCell<Map<String, Value>>,
		registry: &SubscriptionRegistry,
	) -> Vec<String> {
		let mut changed = Vec::new();
		for def in &self.defs {
			let result = def.evaluate(&data.borrow());
			let value = match result {
				Ok(value) => value,
				Err(err) => {
					error!(property = %def.name, error = %err, "Error computing property");
					continue;
				}
			};

			if data.borrow().get(&def.name) == Some(&value) {
				continue;
			}

			trace!(property = %def.name, %value, "computed property changed");
			data.borrow_mut().insert(def.name.clone(), value.clone());
			registry.notify(&def.name, &value);
			changed.push(def.name.clone());
		}
		changed
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn todos() -> RefCell<Map<String, Value>> {
		let data = json!({
			"todos": [
				{ "name": "MiniSCR", "isDone": true },
				{ "name": "Todo App", "isDone": false },
			],
		});
		RefCell::new(data.as_object().cloned().unwrap_or_default())
	}

	fn done_count() -> ComputedDef {
		ComputedDef::new("done", |state| {
			let todos = state.array("todos")?;
			Ok(todos.iter().filter(|t| t["isDone"] == true).count().into())
		})
	}

	#[rstest]
	fn test_first_pass_writes_output(todos: RefCell<Map<String, Value>>) {
		let evaluator = ComputedEvaluator::new(vec![done_count()]);
		let registry = SubscriptionRegistry::new();

		let changed = evaluator.recalculate(&todos, &registry);

		assert_eq!(changed, vec!["done".to_string()]);
		assert_eq!(todos.borrow().get("done"), Some(&json!(1)));
	}

	#[rstest]
	fn test_unchanged_output_does_not_notify(todos: RefCell<Map<String, Value>>) {
		let evaluator = ComputedEvaluator::new(vec![done_count()]);
		let registry = SubscriptionRegistry::new();
		let hits = Rc::new(RefCell::new(0));
		{
			let hits = hits.clone();
			registry.subscribe("done", move |_| *hits.borrow_mut() += 1);
		}

		evaluator.recalculate(&todos, &registry);
		let changed = evaluator.recalculate(&todos, &registry);

		assert!(changed.is_empty());
		assert_eq!(*hits.borrow(), 1);
	}

	#[rstest]
	fn test_failure_keeps_previous_value_and_continues(todos: RefCell<Map<String, Value>>) {
		todos.borrow_mut().insert("broken".into(), json!("stale"));
		let evaluator = ComputedEvaluator::new(vec![
			ComputedDef::new("broken", |state| {
				state.array("missing")?;
				Ok(json!("never"))
			}),
			done_count(),
		]);
		let registry = SubscriptionRegistry::new();

		let changed = evaluator.recalculate(&todos, &registry);

		assert_eq!(changed, vec!["done".to_string()]);
		assert_eq!(todos.borrow().get("broken"), Some(&json!("stale")));
	}

	#[rstest]
	#[case("todos", "array")]
	#[case("name", "string")]
	#[case("flag", "bool")]
	#[case("count", "number")]
	fn test_state_view_accessors(#[case] prop: &str, #[case] kind: &str) {
		let data = json!({ "todos": [], "name": "x", "flag": true, "count": 3 });
		let map = data.as_object().cloned().unwrap_or_default();
		let view = StateView::new(&map);

		let ok = match kind {
			"array" => view.array(prop).is_ok(),
			"string" => view.str(prop).is_ok(),
			"bool" => view.bool(prop).is_ok(),
			_ => view.number(prop).is_ok(),
		};
		assert!(ok);
		assert_eq!(
			view.str("todos"),
			Err(ComputeError::TypeMismatch {
				property: "todos".into(),
				expected: "a string",
			})
		);
	}
}
