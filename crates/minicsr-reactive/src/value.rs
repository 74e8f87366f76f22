//! Presentation helpers for state values.
//!
//! Bindings write values into text content and attributes, and conditional
//! bindings (class, visibility) need a truthiness test. Both follow the loose
//! conventions of markup-facing templating: `null` renders as nothing, whole
//! floats render without a fraction, and empty strings or zero are falsy.

use serde_json::{Number, Value};

/// Renders a value the way it should appear in text content or an attribute.
///
/// # Example
///
/// ```
/// use minicsr_reactive::display_text;
/// use serde_json::json;
///
/// assert_eq!(display_text(&json!("A")), "A");
/// assert_eq!(display_text(&json!(2.0)), "2");
/// assert_eq!(display_text(&json!(null)), "");
/// assert_eq!(display_text(&json!([1, "b", true])), "1,b,true");
/// ```
pub fn display_text(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::Bool(b) => b.to_string(),
		Value::Number(n) => number_text(n),
		Value::String(s) => s.clone(),
		Value::Array(items) => items
			.iter()
			.map(display_text)
			.collect::<Vec<_>>()
			.join(","),
		Value::Object(_) => value.to_string(),
	}
}

fn number_text(n: &Number) -> String {
	if n.is_i64() || n.is_u64() {
		return n.to_string();
	}
	match n.as_f64() {
		Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => {
			// -0.0 prints as "-0" otherwise
			if f == 0.0 {
				"0".to_string()
			} else {
				format!("{f:.0}")
			}
		}
		Some(f) => f.to_string(),
		None => n.to_string(),
	}
}

/// Returns whether a value counts as "on" for conditional bindings.
///
/// `null`, `false`, zero and the empty string are falsy. Arrays and objects
/// are always truthy, even when empty.
pub fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
		Value::String(s) => !s.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}
