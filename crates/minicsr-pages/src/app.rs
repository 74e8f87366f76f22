//! Application Façade
//!
//! [`App`] owns one store, one method table and one marker vocabulary, and
//! mounts them onto a document. Nothing here is process-global: any number
//! of apps can coexist, each with its own state and subscriptions.
//!
//! Mounting runs in a fixed order:
//!
//! 1. resolve the root node from a selector (absent root: nothing happens),
//! 2. attach every outermost repeated section under the root,
//! 3. bind every other node under the root against global state,
//! 4. run one computed recalculation pass,
//! 5. invoke the `mounted` callback.
//!
//! Mounting again (for instance after a router swapped the root's content)
//! binds the new nodes. Subscriptions made by earlier mounts stay registered.

use std::rc::Rc;

use minicsr_dom::{Document, DomNode, Event};
use minicsr_reactive::{Store, Value};
use tracing::debug;

use crate::binder::Binder;
use crate::config::{AppConfig, Method, MethodTable, MountedFn};
use crate::list::ListRenderer;
use crate::markers::MarkerConfig;

/// A configured application bound to a document.
pub struct App<D: Document> {
	document: D,
	store: Store,
	methods: MethodTable,
	markers: Rc<MarkerConfig>,
	mounted: Option<MountedFn>,
}

/// Builds an application over `document`. Equivalent to [`App::new`].
pub fn create_app<D: Document>(document: D, config: AppConfig) -> App<D> {
	App::new(document, config)
}

impl<D: Document> App<D> {
	/// Builds the store and bindings around `config`. Nothing is rendered
	/// until [`mount`](Self::mount).
	pub fn new(document: D, config: AppConfig) -> Self {
		let AppConfig {
			data,
			methods,
			computed,
			mounted,
			markers,
			max_notify_depth,
		} = config;
		Self {
			document,
			store: Store::with_max_notify_depth(data, computed, max_notify_depth),
			methods,
			markers: Rc::new(markers),
			mounted,
		}
	}

	/// The live state handle.
	pub fn state(&self) -> &Store {
		&self.store
	}

	/// The document this app mounts onto.
	pub fn document(&self) -> &D {
		&self.document
	}

	/// The method table shared with every event binding.
	pub fn methods(&self) -> &MethodTable {
		&self.methods
	}

	/// Registers (or replaces) a method. Markup bound earlier resolves it on
	/// the next event.
	pub fn define_method<F>(&self, name: impl Into<String>, handler: F)
	where
		F: Fn(&Store, &Event, Option<&Value>, Option<usize>) + 'static,
	{
		let method: Method = Rc::new(handler);
		self.methods.define(name, method);
	}

	fn binder(&self) -> Binder {
		Binder::new(
			self.store.clone(),
			self.methods.clone(),
			self.markers.clone(),
		)
	}

	/// Mounts onto the first node matching `selector`.
	///
	/// Returns false if no node matches; nothing is bound in that case.
	pub fn mount(&self, selector: &str) -> bool {
		let Some(root) = self.document.query_selector(selector) else {
			debug!(selector, "mount root not found");
			return false;
		};
		self.mount_node(&root);
		true
	}

	/// Mounts onto `root` directly.
	pub fn mount_node(&self, root: &D::Node) {
		let binder = self.binder();
		let repeat = self.markers.repeat.as_str();

		// Outermost sections only; a marker nested in a template belongs to it.
		let sections: Vec<D::Node> = root
			.descendants()
			.into_iter()
			.filter(|node| node.has_attribute(repeat))
			.filter(|node| {
				node.parent_element()
					.and_then(|parent| parent.closest(repeat))
					.is_none()
			})
			.collect();
		let lists = ListRenderer::new(binder.clone());
		let attached = sections.iter().filter(|s| lists.attach(*s)).count();

		let bindings: usize = root
			.descendants()
			.iter()
			.map(|node| binder.bind_global(node))
			.sum();

		let changed = self.store.recalculate();
		debug!(
			sections = attached,
			bindings,
			computed_changed = changed.len(),
			"mounted"
		);

		if let Some(mounted) = &self.mounted {
			mounted(&self.store);
		}
	}
}

impl<D: Document + std::fmt::Debug> std::fmt::Debug for App<D> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("App")
			.field("document", &self.document)
			.field("store", &self.store)
			.field("methods", &self.methods)
			.field("markers", &self.markers)
			.finish()
	}
}
