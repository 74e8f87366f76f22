//! List Renderer
//!
//! A repeated section is a container carrying the repeated-section marker.
//! Its first element child at attach time becomes the template: a detached
//! deep copy that is never mutated, only cloned. Every write to the bound
//! collection property clears the container and rebuilds it from scratch,
//! one bound clone per array element.
//!
//! There is no keyed reconciliation. Item identity, focus and any state held
//! by rendered nodes are lost on every rebuild.

use std::rc::Rc;

use minicsr_dom::DomNode;
use minicsr_reactive::Value;
use tracing::debug;

use crate::binder::Binder;

/// One attached repeated section.
#[derive(Debug)]
struct Section<N> {
	container: N,
	template: N,
	property: String,
}

impl<N: DomNode> Section<N> {
	/// Clears the container and renders one clone per element of `value`.
	///
	/// A missing or non-array value leaves the section empty.
	fn render(&self, binder: &Binder, value: Option<&Value>) -> usize {
		self.container.clear_children();
		let Some(items) = value.and_then(Value::as_array) else {
			debug!(property = %self.property, "list cleared, value is not an array");
			return 0;
		};
		for (index, item) in items.iter().enumerate() {
			let clone = self.template.deep_clone();
			binder.bind_item(&clone, item, index);
			self.container.append_child(&clone);
		}
		debug!(property = %self.property, items = items.len(), "list rebuilt");
		items.len()
	}
}

/// Attaches repeated sections.
#[derive(Debug, Clone)]
pub struct ListRenderer {
	binder: Binder,
}

impl ListRenderer {
	/// Creates a renderer binding clones through `binder`.
	pub fn new(binder: Binder) -> Self {
		Self { binder }
	}

	/// Captures the template of `container`, renders it once and subscribes
	/// to its collection property.
	///
	/// Returns false, leaving the container untouched, when it has no marker
	/// value or no element child to use as a template. Such a section stays
	/// inert.
	pub fn attach<N: DomNode>(&self, container: &N) -> bool {
		let markers = self.binder.markers();
		let Some(property) = container
			.attribute(&markers.repeat)
			.filter(|p| !p.is_empty())
		else {
			return false;
		};
		let Some(first) = container.first_element_child() else {
			debug!(property = %property, "repeated section has no template, left inert");
			return false;
		};

		let section = Rc::new(Section {
			container: container.clone(),
			template: first.deep_clone(),
			property,
		});
		let store = self.binder.store();
		section.render(&self.binder, store.get(&section.property).as_ref());

		let binder = self.binder.downgrade();
		let handle = section.clone();
		store.subscribe(section.property.as_str(), move |value| {
			if let Some(binder) = binder.upgrade() {
				handle.render(&binder, Some(value));
			}
		});
		true
	}
}
