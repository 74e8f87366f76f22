//! `web-sys` backend (wasm32 only).
//!
//! [`WebNode`] wraps a live `web_sys::Element`. Listeners are boxed into
//! `Closure`s and leaked on purpose: bindings live as long as the page, and
//! there is no removal path.

use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Element, HtmlElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};

use crate::event::{Event, EventHandler};
use crate::markup::MarkupError;
use crate::node::{Document, DomNode};

/// A live browser element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebNode(Element);

impl WebNode {
	/// Wraps an element.
	pub fn new(element: Element) -> Self {
		Self(element)
	}

	/// The underlying element.
	pub fn element(&self) -> &Element {
		&self.0
	}
}

fn form_value(element: &Element) -> Option<String> {
	if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
		return Some(input.value());
	}
	if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
		return Some(area.value());
	}
	element.dyn_ref::<HtmlSelectElement>().map(HtmlSelectElement::value)
}

impl DomNode for WebNode {
	fn tag_name(&self) -> String {
		self.0.tag_name().to_ascii_lowercase()
	}

	fn descendants(&self) -> Vec<Self> {
		let Ok(list) = self.0.query_selector_all("*") else {
			return Vec::new();
		};
		(0..list.length())
			.filter_map(|i| list.get(i))
			.filter_map(|node| node.dyn_into::<Element>().ok())
			.map(Self)
			.collect()
	}

	fn children(&self) -> Vec<Self> {
		let collection = self.0.children();
		(0..collection.length())
			.filter_map(|i| collection.item(i))
			.map(Self)
			.collect()
	}

	fn first_element_child(&self) -> Option<Self> {
		self.0.first_element_child().map(Self)
	}

	fn parent_element(&self) -> Option<Self> {
		self.0.parent_element().map(Self)
	}

	fn closest(&self, attr: &str) -> Option<Self> {
		let selector = format!("[{}]", attr.replace(':', "\\:"));
		self.0.closest(&selector).ok().flatten().map(Self)
	}

	fn attribute(&self, name: &str) -> Option<String> {
		self.0.get_attribute(name)
	}

	fn attributes(&self) -> Vec<(String, String)> {
		self.0
			.get_attribute_names()
			.iter()
			.filter_map(|name| name.as_string())
			.filter_map(|name| self.0.get_attribute(&name).map(|value| (name, value)))
			.collect()
	}

	fn set_attribute(&self, name: &str, value: &str) {
		if let Err(err) = self.0.set_attribute(name, value) {
			warn!(attribute = name, error = ?err, "set_attribute failed");
		}
	}

	fn text_content(&self) -> String {
		self.0.text_content().unwrap_or_default()
	}

	fn set_text_content(&self, text: &str) {
		self.0.set_text_content(Some(text));
	}

	fn value(&self) -> String {
		form_value(&self.0)
			.or_else(|| self.0.get_attribute("value"))
			.unwrap_or_default()
	}

	fn set_value(&self, value: &str) {
		if let Some(input) = self.0.dyn_ref::<HtmlInputElement>() {
			input.set_value(value);
		} else if let Some(area) = self.0.dyn_ref::<HtmlTextAreaElement>() {
			area.set_value(value);
		} else if let Some(select) = self.0.dyn_ref::<HtmlSelectElement>() {
			select.set_value(value);
		} else {
			self.set_attribute("value", value);
		}
	}

	fn add_event_listener(&self, event: &str, handler: EventHandler) {
		let target = self.0.clone();
		let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |raw: web_sys::Event| {
			let mut event = Event::new(raw.type_());
			if let Some(value) = form_value(&target) {
				event = event.with_value(value);
			}
			handler(&event);
		});
		if let Err(err) = self
			.0
			.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
		{
			warn!(event, error = ?err, "add_event_listener failed");
		}
		closure.forget();
	}

	fn add_class(&self, class: &str) {
		if let Err(err) = self.0.class_list().add_1(class) {
			warn!(class, error = ?err, "classList.add failed");
		}
	}

	fn remove_class(&self, class: &str) {
		if let Err(err) = self.0.class_list().remove_1(class) {
			warn!(class, error = ?err, "classList.remove failed");
		}
	}

	fn has_class(&self, class: &str) -> bool {
		self.0.class_list().contains(class)
	}

	fn set_visible(&self, visible: bool) {
		let Some(element) = self.0.dyn_ref::<HtmlElement>() else {
			return;
		};
		let style = element.style();
		let result = if visible {
			style.remove_property("display").map(|_| ())
		} else {
			style.set_property("display", "none")
		};
		if let Err(err) = result {
			warn!(error = ?err, "style.display update failed");
		}
	}

	fn is_visible(&self) -> bool {
		self.0
			.dyn_ref::<HtmlElement>()
			.and_then(|element| element.style().get_property_value("display").ok())
			.is_none_or(|display| display != "none")
	}

	fn deep_clone(&self) -> Self {
		match self
			.0
			.clone_node_with_deep(true)
			.ok()
			.and_then(|node| node.dyn_into::<Element>().ok())
		{
			Some(copy) => Self(copy),
			None => {
				warn!("cloneNode failed, reusing original element");
				self.clone()
			}
		}
	}

	fn clear_children(&self) {
		self.0.set_inner_html("");
	}

	fn append_child(&self, child: &Self) {
		if let Err(err) = self.0.append_child(&child.0) {
			warn!(error = ?err, "appendChild failed");
		}
	}

	fn set_inner_html(&self, markup: &str) -> Result<(), MarkupError> {
		self.0.set_inner_html(markup);
		Ok(())
	}
}

/// The live browser document.
#[derive(Debug, Clone)]
pub struct WebDocument(web_sys::Document);

impl WebDocument {
	/// The document of the current window, if any.
	pub fn current() -> Option<Self> {
		web_sys::window()?.document().map(Self)
	}

	/// Looks up an element by id.
	pub fn get_element_by_id(&self, id: &str) -> Option<WebNode> {
		self.0.get_element_by_id(id).map(WebNode)
	}
}

impl Document for WebDocument {
	type Node = WebNode;

	fn root(&self) -> Option<WebNode> {
		self.0.body().map(|body| WebNode(body.into()))
	}

	fn query_selector(&self, selector: &str) -> Option<WebNode> {
		self.0.query_selector(selector).ok().flatten().map(WebNode)
	}
}
