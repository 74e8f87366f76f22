//! Scope Resolver
//!
//! Inside a repeated section a property token can name a field of the current
//! item or a property of the global state. Resolution order:
//!
//! 1. A token carrying the global-escape prefix resolves against global state only.
//! 2. A field defined on the item resolves locally.
//! 3. A property defined in global state resolves globally.
//! 4. Otherwise the token is unresolved and the binding is skipped.
//!
//! A local field therefore shadows a global property of the same name unless
//! the token is escaped.

use minicsr_reactive::{Store, Value};

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
	/// A field of the current list item. Bound once, never live.
	Local,
	/// A property of the global state. Bound live.
	Global,
	/// Nothing defines the property.
	None,
}

/// Outcome of resolving a property token.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
	/// The resolved value, `None` when undefined.
	pub value: Option<Value>,
	/// Where the value came from.
	pub source: Source,
	/// The canonical property name (escape prefix stripped).
	pub property: String,
}

impl Resolution {
	/// Returns true if the value must be kept in sync with global state.
	pub fn is_live(&self) -> bool {
		self.source == Source::Global
	}
}

/// Resolves tokens against one list item and the global store.
#[derive(Debug, Clone, Copy)]
pub struct ScopeResolver<'a> {
	store: &'a Store,
	item: &'a Value,
	global_prefix: &'a str,
}

impl<'a> ScopeResolver<'a> {
	/// Creates a resolver for `item`.
	pub fn new(store: &'a Store, item: &'a Value, global_prefix: &'a str) -> Self {
		Self {
			store,
			item,
			global_prefix,
		}
	}

	/// Resolves `token`.
	///
	/// An escaped token always reports [`Source::Global`], even when global
	/// state does not define it yet; its value is `None` in that case.
	pub fn resolve(&self, token: &str) -> Resolution {
		if !self.global_prefix.is_empty() {
			if let Some(prop) = token.strip_prefix(self.global_prefix) {
				return Resolution {
					value: self.store.get(prop),
					source: Source::Global,
					property: prop.to_string(),
				};
			}
		}

		if let Some(value) = self.item.get(token) {
			return Resolution {
				value: Some(value.clone()),
				source: Source::Local,
				property: token.to_string(),
			};
		}

		match self.store.get(token) {
			Some(value) => Resolution {
				value: Some(value),
				source: Source::Global,
				property: token.to_string(),
			},
			None => Resolution {
				value: None,
				source: Source::None,
				property: token.to_string(),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use minicsr_reactive::Map;
	use proptest::prelude::*;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn store() -> Store {
		let data = json!({ "x": 2, "title": "Todos" });
		Store::new(data.as_object().cloned().unwrap_or_default(), Vec::new())
	}

	#[rstest]
	#[case("x", Some(json!(1)), Source::Local, "x")]
	#[case("$x", Some(json!(2)), Source::Global, "x")]
	#[case("title", Some(json!("Todos")), Source::Global, "title")]
	#[case("missing", None, Source::None, "missing")]
	#[case("$missing", None, Source::Global, "missing")]
	#[case("note", Some(json!(null)), Source::Local, "note")]
	fn test_resolution_order(
		store: Store,
		#[case] token: &str,
		#[case] value: Option<Value>,
		#[case] source: Source,
		#[case] property: &str,
	) {
		let item = json!({ "x": 1, "note": null });
		let resolver = ScopeResolver::new(&store, &item, "$");

		let resolution = resolver.resolve(token);

		assert_eq!(resolution.value, value);
		assert_eq!(resolution.source, source);
		assert_eq!(resolution.property, property);
	}

	#[rstest]
	fn test_scalar_item_never_resolves_locally(store: Store) {
		let item = json!("plain");
		let resolver = ScopeResolver::new(&store, &item, "$");
		assert_eq!(resolver.resolve("x").source, Source::Global);
	}

	#[rstest]
	fn test_empty_prefix_disables_escaping(store: Store) {
		let item = json!({ "$x": "literal" });
		let resolver = ScopeResolver::new(&store, &item, "");
		assert_eq!(resolver.resolve("$x").value, Some(json!("literal")));
	}

	proptest! {
		// An item field always wins over a global property of the same name,
		// and the escaped token always reaches the global one.
		#[test]
		fn prop_local_shadows_global(name in "[a-z]{1,8}", local in any::<i64>(), global in any::<i64>()) {
			let mut data = Map::new();
			data.insert(name.clone(), json!(global));
			let store = Store::new(data, Vec::new());
			let item = json!({ name.clone(): local });
			let resolver = ScopeResolver::new(&store, &item, "$");

			let plain = resolver.resolve(&name);
			prop_assert_eq!(plain.value.as_ref(), Some(&json!(local)));
			prop_assert_eq!(plain.source, Source::Local);

			let escaped = resolver.resolve(&format!("${}", name));
			prop_assert_eq!(escaped.value.as_ref(), Some(&json!(global)));
			prop_assert!(escaped.is_live());
		}
	}
}
