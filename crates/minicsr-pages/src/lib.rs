//! minicsr pages
//!
//! Declarative markers in, live bindings out. This crate connects the reactive
//! store of `minicsr-reactive` to a presentation tree from `minicsr-dom`.
//!
//! ## Architecture
//!
//! - [`ScopeResolver`]: item-local vs. global lookup inside repeated sections
//! - [`Binder`]: turns markers into text, attribute, event, class, visibility
//!   and two-way value bindings
//! - [`ListRenderer`]: captures a template per repeated section and rebuilds it
//!   on every change of the bound collection
//! - [`App`]: owns the store and mounts everything onto a document
//! - `router` (feature `router`): swaps routed markup into a container and
//!   re-mounts
//!
//! ## Markers
//!
//! | Marker | Meaning |
//! |--------|---------|
//! | `data-for="todos"` | repeat the first child once per element of `todos` |
//! | `data-text="done"` | text content (outside repeated sections) |
//! | `data-bind="name"` | text content (inside repeated sections) |
//! | `data-bind:title="tip"` | attribute value |
//! | `data-on:click="addTodo"` | call method `addTodo` on click |
//! | `data-class="done:isDone"` | toggle class `done` on the truthiness of `isDone` |
//! | `data-model="newTodo"` | two-way form value |
//! | `data-show="hasTodos"` | visibility |
//!
//! Inside a repeated section, `$name` forces `name` to resolve against global
//! state even when the item has a field of that name.
//!
//! ## Example
//!
//! ```
//! use minicsr_dom::{DomNode, MemoryDocument};
//! use minicsr_pages::{AppConfig, create_app};
//! use serde_json::json;
//!
//! let doc = MemoryDocument::parse(r#"
//!     <div id="app">
//!         <ul data-for="todos"><li data-class="done:isDone" data-bind="name"></li></ul>
//!         <p>Done: <span id="done" data-text="done"></span></p>
//!     </div>"#).unwrap();
//!
//! let config = AppConfig::new()
//!     .value("todos", json!([{ "name": "MiniSCR", "isDone": true }, { "name": "Todo App", "isDone": false }]))
//!     .computed("done", |state| {
//!         let todos = state.array("todos")?;
//!         Ok(todos.iter().filter(|t| t["isDone"] == true).count().into())
//!     });
//!
//! let app = create_app(doc.clone(), config);
//! assert!(app.mount("#app"));
//! assert_eq!(doc.get_element_by_id("done").unwrap().text_content(), "1");
//! ```

#![warn(missing_docs)]

pub mod app;
pub mod binder;
pub mod config;
pub mod list;
pub mod markers;
pub mod scope;

#[cfg(feature = "router")]
pub mod router;

pub use app::{App, create_app};
pub use binder::Binder;
pub use config::{AppConfig, ConfigError, Method, MethodTable, MountedFn};
pub use list::ListRenderer;
pub use markers::MarkerConfig;
pub use scope::{Resolution, ScopeResolver, Source};

#[cfg(feature = "router")]
pub use router::{Navigation, ResourceLoader, RouteTable, Router, RouterError};
