//! End-to-end todo application tests through the facade crate
//!
//! Success Criteria:
//! 1. The classic two-todo scenario computes `done` as 1, then 2 after a toggle
//! 2. A shorter collection leaves exactly that many rendered items
//! 3. Markers can be renamed through `MarkerConfig`

use minicsr::prelude::*;
use rstest::*;
use serde_json::json;

fn todos_markup(repeat: &str, text: &str) -> String {
	format!(
		r#"<div id="app">
	<ul {repeat}="todos"><li data-on:click="toggleState"><span data-bind="name"></span></li></ul>
	<p><span id="done" {text}="done"></span>/<span id="total" {text}="total"></span></p>
</div>"#
	)
}

fn todo_config() -> AppConfig {
	AppConfig::new()
		.value(
			"todos",
			json!([
				{ "name": "MiniSCR", "isDone": true },
				{ "name": "Todo App", "isDone": false }
			]),
		)
		.method("toggleState", |state, _event, _item, index| {
			let Some(index) = index else { return };
			state.update("todos", |todos| {
				if let Some(todo) = todos.get_mut(index) {
					let done = todo["isDone"].as_bool().unwrap_or(false);
					todo["isDone"] = Value::Bool(!done);
				}
			});
		})
		.computed("total", |state| Ok(state.array("todos")?.len().into()))
		.computed("done", |state| {
			let todos = state.array("todos")?;
			Ok(todos.iter().filter(|t| t["isDone"] == true).count().into())
		})
}

fn rendered_items(doc: &MemoryDocument) -> Vec<MemoryNode> {
	doc.query_selector("ul").unwrap().children()
}

#[rstest]
fn test_done_count_follows_toggle() {
	let doc = MemoryDocument::parse(&todos_markup("data-for", "data-text")).unwrap();
	let app = create_app(doc.clone(), todo_config());
	assert!(app.mount("#app"));

	assert_eq!(app.state().get("done"), Some(json!(1)));
	assert_eq!(doc.get_element_by_id("done").unwrap().text_content(), "1");

	rendered_items(&doc)[1].click();

	assert_eq!(app.state().get("done"), Some(json!(2)));
	assert_eq!(doc.get_element_by_id("done").unwrap().text_content(), "2");
}

#[rstest]
#[case(json!([]), 0)]
#[case(json!([{ "name": "only" }]), 1)]
#[case(json!("not a list"), 0)]
fn test_rebuild_matches_collection_length(#[case] todos: Value, #[case] expected: usize) {
	let doc = MemoryDocument::parse(&todos_markup("data-for", "data-text")).unwrap();
	let app = create_app(doc.clone(), todo_config());
	app.mount("#app");

	app.state().set("todos", todos);

	assert_eq!(rendered_items(&doc).len(), expected);
}

#[rstest]
fn test_renamed_markers() {
	let doc = MemoryDocument::parse(&todos_markup("x-for", "x-text")).unwrap();
	let markers: MarkerConfig =
		serde_json::from_value(json!({ "repeat": "x-for", "text": "x-text" })).unwrap();
	let app = create_app(doc.clone(), todo_config().markers(markers));

	app.mount("#app");

	assert_eq!(rendered_items(&doc).len(), 2);
	assert_eq!(doc.get_element_by_id("total").unwrap().text_content(), "2");
}
