//! Router integration tests
//!
//! Success Criteria:
//! 1. Known paths swap the loaded markup into the container, then re-mount
//! 2. Unknown paths render the 404 placeholder without calling back
//! 3. Loader failures render an inline error without calling back
//! 4. Overlapping navigations resolve last-write-wins
//!
//! Test Categories:
//! - Happy Path: 2 tests
//! - Error Path: 5 tests
//! - Edge Cases: 1 test

#![cfg(feature = "router")]

use async_trait::async_trait;
use minicsr_dom::{Document, DomNode, MemoryDocument, MemoryNode};
use minicsr_pages::router::{MemoryLoader, NOT_FOUND_MARKUP};
use minicsr_pages::{
	AppConfig, Navigation, ResourceLoader, RouteTable, Router, RouterError, create_app,
};
use rstest::*;
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const HOME_PAGE: &str = include_str!("fixtures/home.html");
const TODOS_PAGE: &str = include_str!("fixtures/todos.html");

// ============================================================================
// Fixtures
// ============================================================================

#[fixture]
fn doc() -> MemoryDocument {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
	MemoryDocument::parse(r#"<nav></nav><main id="app"></main>"#).unwrap()
}

#[fixture]
fn routes() -> RouteTable {
	RouteTable::new()
		.route("/", "pages/home.html")
		.route("/todos", "pages/todos.html")
		.route("/broken", "pages/broken.html")
}

#[fixture]
fn loader() -> MemoryLoader {
	MemoryLoader::new()
		.resource("pages/home.html", HOME_PAGE)
		.resource("pages/todos.html", TODOS_PAGE)
		.resource("pages/broken.html", "<div><p></div>")
}

fn container(doc: &MemoryDocument) -> MemoryNode {
	doc.get_element_by_id("app").unwrap()
}

/// Loader that completes in the order its calls are released.
#[derive(Default)]
struct GatedLoader {
	gates: RefCell<Vec<(String, Rc<tokio::sync::Notify>)>>,
}

impl GatedLoader {
	fn gate(&self, resource: &str) -> Rc<tokio::sync::Notify> {
		let notify = Rc::new(tokio::sync::Notify::new());
		self.gates
			.borrow_mut()
			.push((resource.to_string(), notify.clone()));
		notify
	}
}

#[async_trait(?Send)]
impl ResourceLoader for GatedLoader {
	async fn load(&self, resource: &str) -> Result<String, RouterError> {
		let gate = self
			.gates
			.borrow()
			.iter()
			.find(|(name, _)| name == resource)
			.map(|(_, notify)| notify.clone());
		if let Some(gate) = gate {
			gate.notified().await;
		}
		Ok(format!("<p>{}</p>", resource))
	}
}

// ============================================================================
// Happy Path Tests (2 tests)
// ============================================================================

/// Empty hash routes to `/`
#[rstest]
#[tokio::test]
async fn test_empty_hash_renders_home(doc: MemoryDocument, routes: RouteTable, loader: MemoryLoader) {
	let router = Router::for_document(routes, &doc, "app", loader).unwrap();

	let outcome = router.navigate("").await;

	assert_eq!(
		outcome,
		Navigation::Rendered {
			path: "/".to_string(),
			resource: "pages/home.html".to_string(),
		}
	);
	assert!(container(&doc).text_content().contains("Open todos"));
}

/// The callback re-mounts the app over the swapped-in page
#[rstest]
#[tokio::test]
async fn test_navigation_remounts_app(doc: MemoryDocument, routes: RouteTable, loader: MemoryLoader) {
	let app = Rc::new(create_app(
		doc.clone(),
		AppConfig::new()
			.value("title", "Todos")
			.value("todos", json!([{ "name": "A", "isDone": true }]))
			.computed("done", |state| {
				let todos = state.array("todos")?;
				Ok(todos.iter().filter(|t| t["isDone"] == true).count().into())
			}),
	));
	let mounts = Rc::new(Cell::new(0));
	let router = {
		let app = app.clone();
		let mounts = mounts.clone();
		Router::for_document(routes, &doc, "app", loader)
			.unwrap()
			.on_navigated(move || {
				if app.mount("#app") {
					mounts.set(mounts.get() + 1);
				}
			})
	};

	router.navigate("#/todos").await;

	assert_eq!(mounts.get(), 1);
	assert_eq!(doc.query_selector("h1").unwrap().text_content(), "Todos");
	assert_eq!(doc.query_selector("#done").unwrap().text_content(), "1");
	assert_eq!(doc.query_selector("#todo-list").unwrap().children().len(), 1);
}

// ============================================================================
// Error Path Tests (5 tests)
// ============================================================================

/// Unknown paths render the placeholder and skip the callback
#[rstest]
#[tokio::test]
async fn test_unknown_path_renders_404(doc: MemoryDocument, routes: RouteTable, loader: MemoryLoader) {
	let called = Rc::new(Cell::new(false));
	let router = {
		let called = called.clone();
		Router::for_document(routes, &doc, "app", loader)
			.unwrap()
			.on_navigated(move || called.set(true))
	};

	let outcome = router.navigate("#/nowhere").await;

	assert_eq!(
		outcome,
		Navigation::NotFound {
			path: "/nowhere".to_string()
		}
	);
	assert_eq!(container(&doc).inner_html(), NOT_FOUND_MARKUP);
	assert!(!called.get());
}

/// A resource the loader cannot produce renders an inline error
#[rstest]
#[tokio::test]
async fn test_loader_failure_renders_inline_error(doc: MemoryDocument, loader: MemoryLoader) {
	let routes = RouteTable::new().route("/gone", "pages/gone.html");
	let router = Router::for_document(routes, &doc, "app", loader).unwrap();
	container(&doc).set_text_content("previous");

	let outcome = router.navigate("#/gone").await;

	assert!(matches!(
		outcome,
		Navigation::Failed {
			error: RouterError::Fetch {
				status: Some(404),
				..
			},
			..
		}
	));
	assert_eq!(container(&doc).inner_html(), "Error loading /gone");
}

/// Markup that does not parse is a load failure too
#[rstest]
#[tokio::test]
async fn test_unparsable_markup_renders_inline_error(
	doc: MemoryDocument,
	routes: RouteTable,
	loader: MemoryLoader,
) {
	let router = Router::for_document(routes, &doc, "app", loader).unwrap();

	let outcome = router.navigate("#/broken").await;

	assert!(matches!(
		outcome,
		Navigation::Failed {
			error: RouterError::Markup(_),
			..
		}
	));
	assert_eq!(container(&doc).text_content(), "Error loading /broken");
}

/// The inline error is text; markup in the path stays inert
#[rstest]
#[tokio::test]
async fn test_inline_error_is_not_parsed_as_markup(doc: MemoryDocument, loader: MemoryLoader) {
	let routes = RouteTable::new().route("/<b>bold</b>", "pages/gone.html");
	let router = Router::for_document(routes, &doc, "app", loader).unwrap();

	router.navigate("#/<b>bold</b>").await;

	assert!(container(&doc).children().is_empty());
	assert_eq!(container(&doc).text_content(), "Error loading /<b>bold</b>");
}

#[rstest]
fn test_missing_container_is_an_error(doc: MemoryDocument, routes: RouteTable, loader: MemoryLoader) {
	let err = Router::for_document(routes, &doc, "nope", loader).unwrap_err();
	assert_eq!(err, RouterError::ContainerMissing("nope".to_string()));
}

// ============================================================================
// Edge Cases (1 test)
// ============================================================================

/// The navigation that finishes last owns the container
#[rstest]
#[tokio::test]
async fn test_overlapping_navigations_last_write_wins(doc: MemoryDocument) {
	let loader = GatedLoader::default();
	let slow = loader.gate("slow");
	let fast = loader.gate("fast");
	let routes = RouteTable::new().route("/slow", "slow").route("/fast", "fast");
	let router = Router::for_document(routes, &doc, "app", loader).unwrap();

	let first = router.navigate("#/slow");
	let second = async {
		fast.notify_one();
		let outcome = router.navigate("#/fast").await;
		slow.notify_one();
		outcome
	};
	let (first, second) = tokio::join!(first, second);

	assert!(matches!(first, Navigation::Rendered { .. }));
	assert!(matches!(second, Navigation::Rendered { .. }));
	assert_eq!(container(&doc).inner_html(), "<p>slow</p>");
}
