//! Binder
//!
//! Turns declarative markers into bindings. Each binding writes the current
//! value into the node once and, when its source is global state, subscribes
//! so later writes re-apply it.
//!
//! The binder runs in two modes:
//!
//! - **global** ([`Binder::bind_global`]): for nodes outside any repeated
//!   section. Properties are looked up in global state only.
//! - **local** ([`Binder::bind_item`]): for a freshly cloned list item and its
//!   descendants. Properties go through the [`ScopeResolver`], so item fields
//!   shadow global properties and bind once, while global properties stay live.
//!
//! An undefined property never writes anything: the node keeps whatever the
//! markup gave it.

use std::rc::Rc;

use minicsr_dom::{DomNode, Event};
use minicsr_reactive::{Store, Value, WeakStore, display_text, is_truthy};

use crate::config::MethodTable;
use crate::markers::{MarkerConfig, split_class_marker};
use crate::scope::{Resolution, ScopeResolver, Source};

fn apply_text<N: DomNode>(node: &N, value: &Value) {
	node.set_text_content(&display_text(value));
}

fn apply_class<N: DomNode>(node: &N, class: &str, value: &Value) {
	if is_truthy(value) {
		node.add_class(class);
	} else {
		node.remove_class(class);
	}
}

fn apply_visibility<N: DomNode>(node: &N, value: &Value) {
	node.set_visible(is_truthy(value));
}

fn apply_model<N: DomNode>(node: &N, value: &Value) {
	let text = display_text(value);
	if node.value() != text {
		node.set_value(&text);
	}
}

/// List item context of a local binding pass.
#[derive(Debug, Clone)]
struct ItemContext {
	item: Value,
	index: usize,
}

/// Attaches marker bindings to nodes.
#[derive(Debug, Clone)]
pub struct Binder {
	store: Store,
	methods: MethodTable,
	markers: Rc<MarkerConfig>,
}

impl Binder {
	/// Creates a binder writing to `store` and dispatching to `methods`.
	pub fn new(store: Store, methods: MethodTable, markers: Rc<MarkerConfig>) -> Self {
		Self {
			store,
			methods,
			markers,
		}
	}

	/// The store bindings read from and write to.
	pub fn store(&self) -> &Store {
		&self.store
	}

	/// The marker vocabulary.
	pub fn markers(&self) -> &MarkerConfig {
		&self.markers
	}

	/// A handle that rebuilds this binder while its store is alive.
	pub(crate) fn downgrade(&self) -> WeakBinder {
		WeakBinder {
			store: self.store.downgrade(),
			methods: self.methods.clone(),
			markers: self.markers.clone(),
		}
	}

	// ========================================================================
	// Global pass
	// ========================================================================

	/// Binds the markers of a single node against global state.
	///
	/// Nodes inside a repeated section (the node itself or an ancestor carries
	/// the repeated-section marker) are skipped; the list renderer owns them.
	/// Returns the number of bindings attached.
	pub fn bind_global<N: DomNode>(&self, node: &N) -> usize {
		let markers = &self.markers;
		if node.closest(&markers.repeat).is_some() {
			return 0;
		}
		let mut bound = 0;

		if let Some(prop) = node.attribute(&markers.text).filter(|p| !p.is_empty()) {
			self.bind_live(node, &prop, self.store.get(&prop).as_ref(), apply_text);
			bound += 1;
		}

		if let Some(prop) = node.attribute(&markers.model).filter(|p| !p.is_empty()) {
			self.bind_model(node, &prop, self.store.get(&prop).as_ref());
			bound += 1;
		}

		if let Some(marker) = node.attribute(&markers.class) {
			if let Some((class, prop)) = split_class_marker(&marker) {
				let class = class.to_string();
				self.bind_live(node, prop, self.store.get(prop).as_ref(), move |n, v| {
					apply_class(n, &class, v)
				});
				bound += 1;
			}
		}

		for (name, value) in node.attributes() {
			if let Some(event) = markers.bound_event(&name) {
				self.bind_event(node, event, &value, None);
				bound += 1;
			} else if let Some(attr) = markers.bound_attribute(&name) {
				let attr = attr.to_string();
				self.bind_live(node, &value, self.store.get(&value).as_ref(), move |n, v| {
					n.set_attribute(&attr, &display_text(v))
				});
				bound += 1;
			}
		}

		if let Some(prop) = node.attribute(&markers.show).filter(|p| !p.is_empty()) {
			self.bind_live(node, &prop, self.store.get(&prop).as_ref(), apply_visibility);
			bound += 1;
		}

		bound
	}

	// ========================================================================
	// Local pass
	// ========================================================================

	/// Binds a cloned list item and all of its descendants.
	///
	/// Returns the number of bindings attached.
	pub fn bind_item<N: DomNode>(&self, clone: &N, item: &Value, index: usize) -> usize {
		let context = ItemContext {
			item: item.clone(),
			index,
		};
		std::iter::once(clone.clone())
			.chain(clone.descendants())
			.map(|node| self.bind_local(&node, &context))
			.sum()
	}

	fn bind_local<N: DomNode>(&self, node: &N, context: &ItemContext) -> usize {
		let markers = &self.markers;
		let resolver = ScopeResolver::new(&self.store, &context.item, &markers.global_prefix);
		let mut bound = 0;

		if let Some(token) = node.attribute(&markers.local_text).filter(|t| !t.is_empty()) {
			bound += self.bind_resolved(node, resolver.resolve(&token), apply_text);
		}

		for (name, value) in node.attributes() {
			if let Some(attr) = markers.bound_attribute(&name) {
				let attr = attr.to_string();
				bound += self.bind_resolved(node, resolver.resolve(&value), move |n, v| {
					n.set_attribute(&attr, &display_text(v))
				});
			} else if let Some(event) = markers.bound_event(&name) {
				self.bind_event(node, event, &value, Some(context.clone()));
				bound += 1;
			}
		}

		if let Some(marker) = node.attribute(&markers.class) {
			if let Some((class, token)) = split_class_marker(&marker) {
				let class = class.to_string();
				bound += self.bind_resolved(node, resolver.resolve(token), move |n, v| {
					apply_class(n, &class, v)
				});
			}
		}

		if let Some(token) = node.attribute(&markers.show).filter(|t| !t.is_empty()) {
			bound += self.bind_resolved(node, resolver.resolve(&token), apply_visibility);
		}

		if let Some(token) = node.attribute(&markers.model).filter(|t| !t.is_empty()) {
			let resolution = resolver.resolve(&token);
			match (resolution.source, resolution.value) {
				(Source::Global, value) => {
					self.bind_model(node, &resolution.property, value.as_ref());
					bound += 1;
				}
				(Source::Local, Some(value)) => {
					apply_model(node, &value);
					bound += 1;
				}
				_ => {}
			}
		}

		bound
	}

	/// Applies a resolved value; subscribes when it is global-sourced.
	fn bind_resolved<N, F>(&self, node: &N, resolution: Resolution, apply: F) -> usize
	where
		N: DomNode,
		F: Fn(&N, &Value) + 'static,
	{
		let Some(value) = resolution.value.as_ref() else {
			return 0;
		};
		if resolution.is_live() {
			self.bind_live(node, &resolution.property, Some(value), apply);
		} else {
			apply(node, value);
		}
		1
	}

	// ========================================================================
	// Binding primitives
	// ========================================================================

	/// Applies `initial` if defined, then re-applies on every write to `prop`.
	fn bind_live<N, F>(&self, node: &N, prop: &str, initial: Option<&Value>, apply: F)
	where
		N: DomNode,
		F: Fn(&N, &Value) + 'static,
	{
		if let Some(value) = initial {
			apply(node, value);
		}
		let target = node.clone();
		self.store.subscribe(prop, move |value| apply(&target, value));
	}

	/// Two-way value binding: state to node on every write, node to state on
	/// every `input` event.
	fn bind_model<N: DomNode>(&self, node: &N, prop: &str, initial: Option<&Value>) {
		self.bind_live(node, prop, initial, apply_model);

		let store = self.store.downgrade();
		let prop = prop.to_string();
		node.add_event_listener(
			"input",
			Rc::new(move |event: &Event| {
				let (Some(store), Some(text)) = (store.upgrade(), event.value()) else {
					return;
				};
				store.set(prop.as_str(), text);
			}),
		);
	}

	/// Attaches a listener that looks `method` up when the event fires.
	fn bind_event<N: DomNode>(
		&self,
		node: &N,
		event: &str,
		method: &str,
		context: Option<ItemContext>,
	) {
		let store = self.store.downgrade();
		let methods = self.methods.clone();
		let method = method.to_string();
		node.add_event_listener(
			event,
			Rc::new(move |event: &Event| {
				let Some(store) = store.upgrade() else {
					return;
				};
				match &context {
					Some(ItemContext { item, index }) => {
						methods.invoke(&method, &store, event, Some(item), Some(*index))
					}
					None => methods.invoke(&method, &store, event, None, None),
				};
			}),
		);
	}
}

/// Binder whose store is held weakly; store subscriptions capture this.
#[derive(Debug, Clone)]
pub(crate) struct WeakBinder {
	store: WeakStore,
	methods: MethodTable,
	markers: Rc<MarkerConfig>,
}

impl WeakBinder {
	pub(crate) fn upgrade(&self) -> Option<Binder> {
		Some(Binder::new(
			self.store.upgrade()?,
			self.methods.clone(),
			self.markers.clone(),
		))
	}
}
