//! # minicsr
//!
//! A minimal reactive view-binding engine. A plain state object is kept in sync
//! with a tree of presentation nodes through declarative markers; every binding
//! is a direct, targeted mutation of one node property. There is no virtual
//! tree and no diffing.
//!
//! ## Feature Flags
//!
//! - `minimal` - Reactive state only (store, subscriptions, computed values)
//! - `reactive` - [`reactive`] module
//! - `dom` - [`dom`] module (presentation tree traits and in-memory tree)
//! - `pages` - [`pages`] module (binder, list renderer, application facade)
//! - `router` - hash router on top of `pages`
//! - `full` (default) - everything
//!
//! ## Quick Example
//!
//! ```
//! use minicsr::prelude::*;
//! use serde_json::json;
//!
//! let doc = MemoryDocument::parse(r#"
//!     <div id="app">
//!         <input id="name" data-model="name">
//!         <p>Hello, <span id="greeting" data-text="name"></span></p>
//!     </div>"#).unwrap();
//!
//! let app = create_app(doc.clone(), AppConfig::new().value("name", "world"));
//! app.mount("#app");
//!
//! let greeting = doc.get_element_by_id("greeting").unwrap();
//! assert_eq!(greeting.text_content(), "world");
//!
//! doc.get_element_by_id("name").unwrap().input("minicsr");
//! assert_eq!(greeting.text_content(), "minicsr");
//! assert_eq!(app.state().get("name"), Some(json!("minicsr")));
//! ```

#![warn(missing_docs)]

#[cfg(feature = "dom")]
pub mod dom;
#[cfg(feature = "pages")]
pub mod pages;
#[cfg(feature = "reactive")]
pub mod reactive;

#[cfg(feature = "reactive")]
pub use minicsr_reactive::{ComputeError, ComputedDef, Store};

#[cfg(feature = "pages")]
pub use minicsr_pages::{App, AppConfig, create_app};

/// Commonly used items.
pub mod prelude {
	#[cfg(feature = "reactive")]
	pub use minicsr_reactive::{ComputeError, ComputedDef, StateView, Store, Value};

	#[cfg(feature = "dom")]
	pub use minicsr_dom::{Document, DomNode, Event, MemoryDocument, MemoryNode};

	#[cfg(feature = "pages")]
	pub use minicsr_pages::{App, AppConfig, MarkerConfig, create_app};

	#[cfg(feature = "router")]
	pub use minicsr_pages::{Navigation, ResourceLoader, RouteTable, Router};
}
