//! In-memory presentation tree.
//!
//! [`MemoryNode`] is a reference-counted element or text node with a weak
//! parent pointer. It implements [`DomNode`] with browser-like semantics where
//! the binder depends on them:
//!
//! - `class` and `style` are plain attributes; class and visibility helpers
//!   edit them in place, so serialization shows the effect.
//! - The form value is a property separate from the `value` attribute, which
//!   only provides its default.
//! - Deep clones copy attributes and children, never listeners.
//!
//! It also provides the test-side half of the event loop:
//! [`dispatch`](MemoryNode::dispatch), [`click`](MemoryNode::click) and
//! [`input`](MemoryNode::input).

use core::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::event::{Event, EventHandler};
use crate::markup::{MarkupError, escape_attribute, escape_text, is_void_element, parse_fragment};
use crate::node::{Document, DomNode};

const DISPLAY_NONE: &str = "display: none";

enum NodeKind {
	Element {
		tag: String,
		attributes: Vec<(String, String)>,
		value: Option<String>,
		listeners: Vec<(String, EventHandler)>,
	},
	Text(String),
}

struct NodeData {
	kind: NodeKind,
	parent: Weak<RefCell<NodeData>>,
	children: Vec<MemoryNode>,
}

/// A node of the in-memory tree.
#[derive(Clone)]
pub struct MemoryNode {
	inner: Rc<RefCell<NodeData>>,
}

impl MemoryNode {
	fn new(kind: NodeKind) -> Self {
		Self {
			inner: Rc::new(RefCell::new(NodeData {
				kind,
				parent: Weak::new(),
				children: Vec::new(),
			})),
		}
	}

	/// Creates a detached element.
	pub fn element(tag: &str) -> Self {
		Self::new(NodeKind::Element {
			tag: tag.to_ascii_lowercase(),
			attributes: Vec::new(),
			value: None,
			listeners: Vec::new(),
		})
	}

	/// Creates a detached text node.
	pub fn text(text: &str) -> Self {
		Self::new(NodeKind::Text(text.to_string()))
	}

	/// Returns true for element nodes.
	pub fn is_element(&self) -> bool {
		matches!(self.inner.borrow().kind, NodeKind::Element { .. })
	}

	/// Returns true if both handles refer to the same node.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}

	/// The parent element, if attached.
	pub fn parent(&self) -> Option<Self> {
		self.inner
			.borrow()
			.parent
			.upgrade()
			.map(|inner| Self { inner })
	}

	/// All child nodes, text nodes included.
	pub fn child_nodes(&self) -> Vec<Self> {
		self.inner.borrow().children.clone()
	}

	/// Appends any node (element or text), detaching it from its old parent.
	pub fn append_node(&self, child: &Self) {
		child.detach();
		child.inner.borrow_mut().parent = Rc::downgrade(&self.inner);
		self.inner.borrow_mut().children.push(child.clone());
	}

	/// Removes this node from its parent.
	pub fn detach(&self) {
		let Some(parent) = self.parent() else {
			return;
		};
		parent
			.inner
			.borrow_mut()
			.children
			.retain(|c| !c.ptr_eq(self));
		self.inner.borrow_mut().parent = Weak::new();
	}

	/// Invokes every listener registered for the event's type, in order.
	///
	/// Returns the number of listeners invoked.
	pub fn dispatch(&self, event: &Event) -> usize {
		let handlers: Vec<EventHandler> = match &self.inner.borrow().kind {
			NodeKind::Element { listeners, .. } => listeners
				.iter()
				.filter(|(name, _)| name == event.event_type())
				.map(|(_, handler)| handler.clone())
				.collect(),
			NodeKind::Text(_) => Vec::new(),
		};
		for handler in &handlers {
			handler(event);
		}
		handlers.len()
	}

	/// Simulates a click.
	pub fn click(&self) -> usize {
		self.dispatch(&Event::new("click"))
	}

	/// Simulates user input: sets the form value, then fires `input`.
	pub fn input(&self, value: &str) -> usize {
		self.set_value(value);
		self.dispatch(&Event::new("input").with_value(value))
	}

	/// Returns the number of listeners attached for `event`.
	pub fn listener_count(&self, event: &str) -> usize {
		match &self.inner.borrow().kind {
			NodeKind::Element { listeners, .. } => {
				listeners.iter().filter(|(name, _)| name == event).count()
			}
			NodeKind::Text(_) => 0,
		}
	}

	/// Serializes the node and its subtree.
	pub fn to_html(&self) -> String {
		let mut out = String::new();
		self.write_html(&mut out);
		out
	}

	/// Serializes the children only.
	pub fn inner_html(&self) -> String {
		let mut out = String::new();
		for child in self.child_nodes() {
			child.write_html(&mut out);
		}
		out
	}

	fn write_html(&self, out: &mut String) {
		let data = self.inner.borrow();
		match &data.kind {
			NodeKind::Text(text) => out.push_str(&escape_text(text)),
			NodeKind::Element {
				tag, attributes, ..
			} => {
				out.push('<');
				out.push_str(tag);
				for (name, value) in attributes {
					out.push(' ');
					out.push_str(name);
					out.push_str("=\"");
					out.push_str(&escape_attribute(value));
					out.push('"');
				}
				out.push('>');
				if is_void_element(tag) {
					return;
				}
				for child in &data.children {
					child.write_html(out);
				}
				out.push_str("</");
				out.push_str(tag);
				out.push('>');
			}
		}
	}

	fn remove_attribute(&self, name: &str) {
		if let NodeKind::Element { attributes, .. } = &mut self.inner.borrow_mut().kind {
			attributes.retain(|(n, _)| n != name);
		}
	}

	fn class_list(&self) -> Vec<String> {
		self.attribute("class")
			.map(|classes| classes.split_whitespace().map(str::to_string).collect())
			.unwrap_or_default()
	}

	fn collect_descendants(&self, out: &mut Vec<Self>) {
		for child in self.children() {
			out.push(child.clone());
			child.collect_descendants(out);
		}
	}

	fn collect_text(&self, out: &mut String) {
		let data = self.inner.borrow();
		match &data.kind {
			NodeKind::Text(text) => out.push_str(text),
			NodeKind::Element { .. } => {
				for child in &data.children {
					child.collect_text(out);
				}
			}
		}
	}
}

impl DomNode for MemoryNode {
	fn tag_name(&self) -> String {
		match &self.inner.borrow().kind {
			NodeKind::Element { tag, .. } => tag.clone(),
			NodeKind::Text(_) => "#text".to_string(),
		}
	}

	fn descendants(&self) -> Vec<Self> {
		let mut out = Vec::new();
		self.collect_descendants(&mut out);
		out
	}

	fn children(&self) -> Vec<Self> {
		self.inner
			.borrow()
			.children
			.iter()
			.filter(|c| c.is_element())
			.cloned()
			.collect()
	}

	fn first_element_child(&self) -> Option<Self> {
		self.inner
			.borrow()
			.children
			.iter()
			.find(|c| c.is_element())
			.cloned()
	}

	fn parent_element(&self) -> Option<Self> {
		self.parent()
	}

	fn closest(&self, attr: &str) -> Option<Self> {
		let mut current = Some(self.clone());
		while let Some(node) = current {
			if node.has_attribute(attr) {
				return Some(node);
			}
			current = node.parent();
		}
		None
	}

	fn attribute(&self, name: &str) -> Option<String> {
		match &self.inner.borrow().kind {
			NodeKind::Element { attributes, .. } => attributes
				.iter()
				.find(|(n, _)| n == name)
				.map(|(_, v)| v.clone()),
			NodeKind::Text(_) => None,
		}
	}

	fn attributes(&self) -> Vec<(String, String)> {
		match &self.inner.borrow().kind {
			NodeKind::Element { attributes, .. } => attributes.clone(),
			NodeKind::Text(_) => Vec::new(),
		}
	}

	fn set_attribute(&self, name: &str, value: &str) {
		if let NodeKind::Element { attributes, .. } = &mut self.inner.borrow_mut().kind {
			match attributes.iter_mut().find(|(n, _)| n == name) {
				Some((_, existing)) => *existing = value.to_string(),
				None => attributes.push((name.to_string(), value.to_string())),
			}
		}
	}

	fn text_content(&self) -> String {
		let mut out = String::new();
		self.collect_text(&mut out);
		out
	}

	fn set_text_content(&self, text: &str) {
		if let NodeKind::Text(existing) = &mut self.inner.borrow_mut().kind {
			*existing = text.to_string();
			return;
		}
		self.clear_children();
		if !text.is_empty() {
			self.append_node(&Self::text(text));
		}
	}

	fn value(&self) -> String {
		let from_property = match &self.inner.borrow().kind {
			NodeKind::Element { value, .. } => value.clone(),
			NodeKind::Text(_) => None,
		};
		from_property
			.or_else(|| self.attribute("value"))
			.unwrap_or_default()
	}

	fn set_value(&self, new_value: &str) {
		if let NodeKind::Element { value, .. } = &mut self.inner.borrow_mut().kind {
			*value = Some(new_value.to_string());
		}
	}

	fn add_event_listener(&self, event: &str, handler: EventHandler) {
		if let NodeKind::Element { listeners, .. } = &mut self.inner.borrow_mut().kind {
			listeners.push((event.to_string(), handler));
		}
	}

	fn add_class(&self, class: &str) {
		let mut classes = self.class_list();
		if classes.iter().any(|c| c == class) {
			return;
		}
		classes.push(class.to_string());
		self.set_attribute("class", &classes.join(" "));
	}

	fn remove_class(&self, class: &str) {
		let classes = self.class_list();
		if !classes.iter().any(|c| c == class) {
			return;
		}
		let remaining: Vec<String> = classes.into_iter().filter(|c| c != class).collect();
		self.set_attribute("class", &remaining.join(" "));
	}

	fn has_class(&self, class: &str) -> bool {
		self.class_list().iter().any(|c| c == class)
	}

	fn set_visible(&self, visible: bool) {
		let mut declarations: Vec<String> = self
			.attribute("style")
			.map(|style| {
				style
					.split(';')
					.map(str::trim)
					.filter(|d| !d.is_empty() && !d.starts_with("display"))
					.map(str::to_string)
					.collect()
			})
			.unwrap_or_default();
		if !visible {
			declarations.push(DISPLAY_NONE.to_string());
		}
		if declarations.is_empty() {
			self.remove_attribute("style");
		} else {
			self.set_attribute("style", &declarations.join("; "));
		}
	}

	fn is_visible(&self) -> bool {
		!self.attribute("style").is_some_and(|style| {
			style
				.split(';')
				.map(|d| d.split_whitespace().collect::<String>())
				.any(|d| d == "display:none")
		})
	}

	fn deep_clone(&self) -> Self {
		let kind = match &self.inner.borrow().kind {
			NodeKind::Element {
				tag, attributes, ..
			} => NodeKind::Element {
				tag: tag.clone(),
				attributes: attributes.clone(),
				value: None,
				listeners: Vec::new(),
			},
			NodeKind::Text(text) => NodeKind::Text(text.clone()),
		};
		let copy = Self::new(kind);
		for child in self.child_nodes() {
			copy.append_node(&child.deep_clone());
		}
		copy
	}

	fn clear_children(&self) {
		let children = std::mem::take(&mut self.inner.borrow_mut().children);
		for child in children {
			child.inner.borrow_mut().parent = Weak::new();
		}
	}

	fn append_child(&self, child: &Self) {
		self.append_node(child);
	}

	fn set_inner_html(&self, markup: &str) -> Result<(), MarkupError> {
		let nodes = parse_fragment(markup)?;
		self.clear_children();
		for node in &nodes {
			self.append_node(node);
		}
		Ok(())
	}
}

impl std::fmt::Debug for MemoryNode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("MemoryNode").field(&self.to_html()).finish()
	}
}

/// A document backed by a [`MemoryNode`] tree under a synthetic `<body>`.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
	body: MemoryNode,
}

impl Default for MemoryDocument {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryDocument {
	/// Creates an empty document.
	pub fn new() -> Self {
		Self {
			body: MemoryNode::element("body"),
		}
	}

	/// Creates a document whose body holds the parsed `markup`.
	pub fn parse(markup: &str) -> Result<Self, MarkupError> {
		let doc = Self::new();
		doc.body.set_inner_html(markup)?;
		Ok(doc)
	}

	/// The document body.
	pub fn body(&self) -> MemoryNode {
		self.body.clone()
	}

	/// Looks up an element by `id` attribute.
	pub fn get_element_by_id(&self, id: &str) -> Option<MemoryNode> {
		self.body
			.descendants()
			.into_iter()
			.find(|node| node.attribute("id").as_deref() == Some(id))
	}
}

impl Document for MemoryDocument {
	type Node = MemoryNode;

	fn root(&self) -> Option<MemoryNode> {
		Some(self.body.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use insta::assert_snapshot;
	use rstest::{fixture, rstest};
	use std::cell::Cell;

	#[fixture]
	fn doc() -> MemoryDocument {
		MemoryDocument::parse(
			r#"<div id="app"><ul data-for="todos"><li class="item"><span data-bind="name"></span></li></ul><input id="q" value="seed"></div>"#,
		)
		.unwrap()
	}

	#[rstest]
	fn test_descendants_are_preorder(doc: MemoryDocument) {
		let app = doc.get_element_by_id("app").unwrap();
		let tags: Vec<String> = app.descendants().iter().map(DomNode::tag_name).collect();
		assert_eq!(tags, vec!["ul", "li", "span", "input"]);
	}

	#[rstest]
	fn test_closest_includes_self(doc: MemoryDocument) {
		let list = doc.query_selector("[data-for]").unwrap();
		let span = doc.query_selector("span").unwrap();
		let input = doc.get_element_by_id("q").unwrap();

		assert!(list.closest("data-for").unwrap().ptr_eq(&list));
		assert!(span.closest("data-for").unwrap().ptr_eq(&list));
		assert!(input.closest("data-for").is_none());
	}

	#[rstest]
	fn test_deep_clone_is_detached_and_listener_free(doc: MemoryDocument) {
		let li = doc.query_selector("li").unwrap();
		li.add_event_listener("click", Rc::new(|_| {}));

		let copy = li.deep_clone();

		assert!(copy.parent().is_none());
		assert_eq!(copy.to_html(), li.to_html());
		assert_eq!(copy.listener_count("click"), 0);
		copy.set_attribute("class", "changed");
		assert_eq!(li.attribute("class").as_deref(), Some("item"));
	}

	#[rstest]
	fn test_append_child_moves_node(doc: MemoryDocument) {
		let list = doc.query_selector("ul").unwrap();
		let app = doc.get_element_by_id("app").unwrap();
		let li = list.first_element_child().unwrap();

		app.append_child(&li);

		assert!(list.children().is_empty());
		assert!(li.parent().unwrap().ptr_eq(&app));
	}

	#[rstest]
	fn test_value_property_shadows_attribute(doc: MemoryDocument) {
		let input = doc.get_element_by_id("q").unwrap();
		assert_eq!(input.value(), "seed");

		input.set_value("typed");
		assert_eq!(input.value(), "typed");
		assert_eq!(input.attribute("value").as_deref(), Some("seed"));
	}

	#[rstest]
	fn test_input_sets_value_then_fires(doc: MemoryDocument) {
		let input = doc.get_element_by_id("q").unwrap();
		let seen = Rc::new(RefCell::new(String::new()));
		{
			let seen = seen.clone();
			let target = input.clone();
			input.add_event_listener(
				"input",
				Rc::new(move |event| {
					*seen.borrow_mut() = format!("{}|{}", target.value(), event.value().unwrap_or(""));
				}),
			);
		}

		assert_eq!(input.input("abc"), 1);
		assert_eq!(*seen.borrow(), "abc|abc");
	}

	#[rstest]
	fn test_class_and_visibility_edit_attributes() {
		let node = MemoryNode::element("p");
		node.set_attribute("style", "color: red");

		node.add_class("done");
		node.add_class("done");
		node.add_class("red");
		node.set_visible(false);
		assert_snapshot!(node.to_html(), @r#"<p style="color: red; display: none" class="done red"></p>"#);
		assert!(!node.is_visible());

		node.remove_class("done");
		node.set_visible(true);
		assert_snapshot!(node.to_html(), @r#"<p style="color: red" class="red"></p>"#);
		assert!(node.is_visible());
	}

	#[rstest]
	fn test_set_text_content_replaces_children(doc: MemoryDocument) {
		let li = doc.query_selector("li").unwrap();
		li.set_text_content("a < b");
		assert_eq!(li.to_html(), r#"<li class="item">a &lt; b</li>"#);
		li.set_text_content("");
		assert!(li.child_nodes().is_empty());
	}

	#[rstest]
	fn test_dispatch_runs_matching_listeners_only() {
		let node = MemoryNode::element("button");
		let clicks = Rc::new(Cell::new(0));
		{
			let clicks = clicks.clone();
			node.add_event_listener("click", Rc::new(move |_| clicks.set(clicks.get() + 1)));
		}
		node.add_event_listener("input", Rc::new(|_| {}));

		assert_eq!(node.click(), 1);
		assert_eq!(node.dispatch(&Event::new("keyup")), 0);
		assert_eq!(clicks.get(), 1);
	}

	#[rstest]
	fn test_set_inner_html_replaces_content(doc: MemoryDocument) {
		let app = doc.get_element_by_id("app").unwrap();
		app.set_inner_html(r#"<div class="p-4">404</div>"#).unwrap();
		assert_eq!(app.inner_html(), r#"<div class="p-4">404</div>"#);
		assert!(doc.query_selector("ul").is_none());
	}
}
