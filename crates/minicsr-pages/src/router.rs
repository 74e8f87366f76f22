//! Hash router
//!
//! Maps the location hash to a resource, loads its markup, swaps it into a
//! container node and then runs a callback, which usually re-mounts an
//! [`App`](crate::App) over the new content.
//!
//! Failures never reach the reactive core. They are rendered in place:
//!
//! - an unknown path renders `<div class="p-4">404</div>`,
//! - a loader or markup failure renders the text `Error loading <path>`.
//!   It is written as text content and never parsed as markup, so a path
//!   taken from the hash cannot inject elements.
//!
//! Navigations are not cancelled. When two overlap, whichever finishes last
//! owns the container.
//!
//! ## Example
//!
//! ```
//! use minicsr_dom::{DomNode, MemoryDocument};
//! use minicsr_pages::router::{MemoryLoader, Navigation, RouteTable, Router};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let doc = MemoryDocument::parse(r#"<main id="app"></main>"#).unwrap();
//! let routes = RouteTable::new().route("/", "pages/home.html");
//! let loader = MemoryLoader::new().resource("pages/home.html", "<h1>Home</h1>");
//! let router = Router::for_document(routes, &doc, "app", loader).unwrap();
//!
//! let outcome = router.navigate("").await;
//! assert!(matches!(outcome, Navigation::Rendered { .. }));
//! assert_eq!(doc.get_element_by_id("app").unwrap().text_content(), "Home");
//! # });
//! ```

use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use minicsr_dom::{Document, DomNode, MarkupError};
use tracing::{debug, warn};

/// Markup rendered for a path with no route.
pub const NOT_FOUND_MARKUP: &str = r#"<div class="p-4">404</div>"#;

/// Router failures.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
	/// No route matches the path.
	#[error("No route for path {0}")]
	NotFound(String),

	/// The resource could not be loaded.
	#[error("Failed to load {resource}: {message}")]
	Fetch {
		/// The resource identifier.
		resource: String,
		/// HTTP status, when a response was received.
		status: Option<u16>,
		/// Failure description.
		message: String,
	},

	/// The container node does not exist.
	#[error("Router container #{0} not found")]
	ContainerMissing(String),

	/// The host environment lacks something the router needs.
	#[error("Router unavailable: {0}")]
	Unavailable(String),

	/// The loaded markup could not be parsed.
	#[error(transparent)]
	Markup(#[from] MarkupError),
}

impl RouterError {
	/// Creates a [`RouterError::Fetch`].
	pub fn fetch(resource: &str, status: Option<u16>, message: impl Into<String>) -> Self {
		Self::Fetch {
			resource: resource.to_string(),
			status,
			message: message.into(),
		}
	}
}

/// Loads the markup behind a resource identifier.
#[async_trait(?Send)]
pub trait ResourceLoader {
	/// Returns the markup of `resource`.
	async fn load(&self, resource: &str) -> Result<String, RouterError>;
}

/// Path to resource mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
	routes: HashMap<String, String>,
}

impl RouteTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a route.
	pub fn route(mut self, path: impl Into<String>, resource: impl Into<String>) -> Self {
		self.insert(path, resource);
		self
	}

	/// Adds or replaces a route.
	pub fn insert(&mut self, path: impl Into<String>, resource: impl Into<String>) {
		self.routes.insert(path.into(), resource.into());
	}

	/// Returns the resource for `path`.
	pub fn resolve(&self, path: &str) -> Option<&str> {
		self.routes.get(path).map(String::as_str)
	}

	/// Number of routes.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Returns true if the table has no routes.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}
}

impl<P: Into<String>, R: Into<String>> FromIterator<(P, R)> for RouteTable {
	fn from_iter<I: IntoIterator<Item = (P, R)>>(iter: I) -> Self {
		let mut table = Self::new();
		for (path, resource) in iter {
			table.insert(path, resource);
		}
		table
	}
}

/// Derives the route path from a location hash: the leading `#` is
/// stripped and an empty hash means `/`.
pub fn path_from_hash(hash: &str) -> &str {
	let path = hash.strip_prefix('#').unwrap_or(hash);
	if path.is_empty() { "/" } else { path }
}

/// Resources held in memory, for hosts without a network and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
	resources: HashMap<String, String>,
}

impl MemoryLoader {
	/// Creates an empty loader.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a resource.
	pub fn resource(mut self, name: impl Into<String>, markup: impl Into<String>) -> Self {
		self.resources.insert(name.into(), markup.into());
		self
	}
}

#[async_trait(?Send)]
impl ResourceLoader for MemoryLoader {
	async fn load(&self, resource: &str) -> Result<String, RouterError> {
		self.resources
			.get(resource)
			.cloned()
			.ok_or_else(|| RouterError::fetch(resource, Some(404), "Not Found"))
	}
}

/// Result of one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
	/// The resource was loaded and swapped in.
	Rendered {
		/// The navigated path.
		path: String,
		/// The loaded resource.
		resource: String,
	},
	/// No route matched; the 404 placeholder was rendered.
	NotFound {
		/// The navigated path.
		path: String,
	},
	/// Loading or parsing failed; an inline error was rendered.
	Failed {
		/// The navigated path.
		path: String,
		/// What went wrong.
		error: RouterError,
	},
}

/// Callback run after a successful navigation.
pub type NavigatedFn = Rc<dyn Fn()>;

/// Swaps routed markup into a container node.
pub struct Router<N: DomNode, L: ResourceLoader> {
	routes: RouteTable,
	container: N,
	loader: L,
	on_navigated: Option<NavigatedFn>,
}

impl<N: DomNode, L: ResourceLoader> Router<N, L> {
	/// Creates a router rendering into `container`.
	pub fn new(routes: RouteTable, container: N, loader: L) -> Self {
		Self {
			routes,
			container,
			loader,
			on_navigated: None,
		}
	}

	/// Creates a router rendering into the element with id `container_id`.
	pub fn for_document<D>(
		routes: RouteTable,
		document: &D,
		container_id: &str,
		loader: L,
	) -> Result<Self, RouterError>
	where
		D: Document<Node = N>,
	{
		let container = document
			.query_selector(&format!("#{}", container_id))
			.ok_or_else(|| RouterError::ContainerMissing(container_id.to_string()))?;
		Ok(Self::new(routes, container, loader))
	}

	/// Sets the callback run after every successful navigation.
	pub fn on_navigated<F>(mut self, callback: F) -> Self
	where
		F: Fn() + 'static,
	{
		self.on_navigated = Some(Rc::new(callback));
		self
	}

	/// The route table.
	pub fn routes(&self) -> &RouteTable {
		&self.routes
	}

	/// The container node.
	pub fn container(&self) -> &N {
		&self.container
	}

	/// Navigates to the path named by `hash`.
	pub async fn navigate(&self, hash: &str) -> Navigation {
		let path = path_from_hash(hash).to_string();
		let Some(resource) = self.routes.resolve(&path) else {
			debug!(path = %path, "no route");
			if let Err(err) = self.container.set_inner_html(NOT_FOUND_MARKUP) {
				warn!(error = %err, "failed to render 404 placeholder");
			}
			return Navigation::NotFound { path };
		};
		let resource = resource.to_string();

		let loaded = self.loader.load(&resource).await.and_then(|markup| {
			self.container
				.set_inner_html(&markup)
				.map_err(RouterError::from)
		});
		match loaded {
			Ok(()) => {
				debug!(path = %path, resource = %resource, "navigated");
				if let Some(callback) = &self.on_navigated {
					callback();
				}
				Navigation::Rendered { path, resource }
			}
			Err(error) => {
				warn!(path = %path, error = %error, "navigation failed");
				self.container
					.set_text_content(&format!("Error loading {}", path));
				Navigation::Failed { path, error }
			}
		}
	}
}

impl<N: DomNode + std::fmt::Debug, L: ResourceLoader + std::fmt::Debug> std::fmt::Debug
	for Router<N, L>
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Router")
			.field("routes", &self.routes)
			.field("container", &self.container)
			.field("loader", &self.loader)
			.field("on_navigated", &self.on_navigated.is_some())
			.finish()
	}
}

#[cfg(target_arch = "wasm32")]
mod web {
	use std::rc::Rc;

	use async_trait::async_trait;
	use minicsr_dom::DomNode;
	use tracing::debug;
	use wasm_bindgen::JsCast;
	use wasm_bindgen::closure::Closure;
	use wasm_bindgen_futures::JsFuture;

	use super::{ResourceLoader, Router, RouterError};

	/// Loads resources with `window.fetch`.
	#[derive(Debug, Clone, Copy, Default)]
	pub struct FetchLoader;

	#[async_trait(?Send)]
	impl ResourceLoader for FetchLoader {
		async fn load(&self, resource: &str) -> Result<String, RouterError> {
			let window = web_sys::window()
				.ok_or_else(|| RouterError::Unavailable("no window".to_string()))?;
			let response = JsFuture::from(window.fetch_with_str(resource))
				.await
				.map_err(|err| RouterError::fetch(resource, None, format!("{:?}", err)))?;
			let response: web_sys::Response = response
				.dyn_into()
				.map_err(|_| RouterError::fetch(resource, None, "not a Response"))?;
			if !response.ok() {
				return Err(RouterError::fetch(
					resource,
					Some(response.status()),
					response.status_text(),
				));
			}
			let text = response
				.text()
				.map_err(|err| RouterError::fetch(resource, None, format!("{:?}", err)))?;
			JsFuture::from(text)
				.await
				.map_err(|err| RouterError::fetch(resource, None, format!("{:?}", err)))?
				.as_string()
				.ok_or_else(|| RouterError::fetch(resource, None, "body is not text"))
		}
	}

	fn current_hash() -> String {
		web_sys::window()
			.and_then(|window| window.location().hash().ok())
			.unwrap_or_default()
	}

	impl<N: DomNode, L: ResourceLoader + 'static> Router<N, L> {
		/// Navigates on every `hashchange` and on `load`.
		///
		/// The listeners are never removed.
		pub fn listen(self: Rc<Self>) -> Result<(), RouterError> {
			let window = web_sys::window()
				.ok_or_else(|| RouterError::Unavailable("no window".to_string()))?;
			for event in ["hashchange", "load"] {
				let router = self.clone();
				let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
					let router = router.clone();
					wasm_bindgen_futures::spawn_local(async move {
						router.navigate(&current_hash()).await;
					});
				});
				window
					.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
					.map_err(|err| RouterError::Unavailable(format!("{:?}", err)))?;
				closure.forget();
				debug!(event, "router listening");
			}
			Ok(())
		}
	}
}

#[cfg(target_arch = "wasm32")]
pub use web::FetchLoader;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("", "/")]
	#[case("#", "/")]
	#[case("#/", "/")]
	#[case("#/todos", "/todos")]
	#[case("/todos", "/todos")]
	fn test_path_from_hash(#[case] hash: &str, #[case] expected: &str) {
		assert_eq!(path_from_hash(hash), expected);
	}

	#[rstest]
	fn test_route_table_from_pairs() {
		let table: RouteTable = [("/", "pages/home.html"), ("/todos", "pages/todos.html")]
			.into_iter()
			.collect();

		assert_eq!(table.len(), 2);
		assert_eq!(table.resolve("/todos"), Some("pages/todos.html"));
		assert_eq!(table.resolve("/missing"), None);
	}

	#[rstest]
	fn test_fetch_error_display() {
		let err = RouterError::fetch("pages/x.html", Some(500), "Internal Server Error");
		assert_eq!(
			err.to_string(),
			"Failed to load pages/x.html: Internal Server Error"
		);
	}
}
