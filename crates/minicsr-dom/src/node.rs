//! Capability traits for presentation nodes and documents.

use crate::event::EventHandler;
use crate::markup::MarkupError;
use crate::selector::Selector;

/// An element of a presentation tree.
///
/// Handles are cheap to clone and refer to the same underlying node. Only
/// element nodes are exposed; text nodes are reached through
/// [`text_content`](Self::text_content).
pub trait DomNode: Clone + 'static {
	/// Lower-case tag name.
	fn tag_name(&self) -> String;

	/// All element descendants in document (pre-)order, excluding `self`.
	fn descendants(&self) -> Vec<Self>;

	/// Direct element children.
	fn children(&self) -> Vec<Self>;

	/// The first direct element child, if any.
	fn first_element_child(&self) -> Option<Self>;

	/// The parent element, if attached.
	fn parent_element(&self) -> Option<Self>;

	/// `self` or the nearest ancestor carrying attribute `attr`.
	fn closest(&self, attr: &str) -> Option<Self>;

	/// Value of attribute `name`.
	fn attribute(&self, name: &str) -> Option<String>;

	/// All attributes as `(name, value)` pairs, in source order.
	fn attributes(&self) -> Vec<(String, String)>;

	/// Sets attribute `name`, replacing any previous value.
	fn set_attribute(&self, name: &str, value: &str);

	/// Returns true if attribute `name` is present.
	fn has_attribute(&self, name: &str) -> bool {
		self.attribute(name).is_some()
	}

	/// Concatenated text of the subtree.
	fn text_content(&self) -> String;

	/// Replaces all children with a single text node.
	fn set_text_content(&self, text: &str);

	/// Current form value (`input`, `textarea`, `select`).
	fn value(&self) -> String;

	/// Sets the current form value.
	fn set_value(&self, value: &str);

	/// Attaches a listener for `event`. Listeners are never removed.
	fn add_event_listener(&self, event: &str, handler: EventHandler);

	/// Adds a class to the class list.
	fn add_class(&self, class: &str);

	/// Removes a class from the class list.
	fn remove_class(&self, class: &str);

	/// Returns true if the class list contains `class`.
	fn has_class(&self, class: &str) -> bool;

	/// Shows or hides the node (`display: none`).
	fn set_visible(&self, visible: bool);

	/// Returns false if the node is hidden with `display: none`.
	fn is_visible(&self) -> bool;

	/// Detached deep copy: attributes and subtree, but no listeners.
	fn deep_clone(&self) -> Self;

	/// Removes every child.
	fn clear_children(&self);

	/// Appends `child`, detaching it from its current parent first.
	fn append_child(&self, child: &Self);

	/// Replaces the children with the nodes parsed from `markup`.
	fn set_inner_html(&self, markup: &str) -> Result<(), MarkupError>;
}

/// A document that can resolve selectors to nodes.
pub trait Document {
	/// The node type of this document.
	type Node: DomNode;

	/// The top-level element that selector lookups search.
	fn root(&self) -> Option<Self::Node>;

	/// Returns the first node (root included) matching `selector`.
	///
	/// An unsupported selector matches nothing.
	fn query_selector(&self, selector: &str) -> Option<Self::Node> {
		let selector = Selector::parse(selector).ok()?;
		let root = self.root()?;
		if selector.matches(&root) {
			return Some(root);
		}
		root.descendants()
			.into_iter()
			.find(|node| selector.matches(node))
	}

	/// Returns every node (root included) matching `selector`, in document order.
	fn query_selector_all(&self, selector: &str) -> Vec<Self::Node> {
		let (Ok(selector), Some(root)) = (Selector::parse(selector), self.root()) else {
			return Vec::new();
		};
		std::iter::once(root.clone())
			.chain(root.descendants())
			.filter(|node| selector.matches(node))
			.collect()
	}
}
