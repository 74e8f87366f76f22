//! minicsr presentation tree
//!
//! The binder never talks to a concrete rendering surface. It works against
//! the capability set described by [`DomNode`] and [`Document`]:
//! enumerate descendants, read and write text, attributes and form values,
//! attach event listeners, toggle classes and visibility, clone and append.
//!
//! ## Backends
//!
//! - [`memory`]: an in-memory tree with a markup parser and serializer. Used by
//!   tests and anywhere a browser is not available.
//! - `web` (wasm32 only): `web-sys` elements of a live browser document.
//!
//! ## Example
//!
//! ```
//! use minicsr_dom::{Document, DomNode, MemoryDocument};
//!
//! let doc = MemoryDocument::parse(r#"<div id="app"><p class="note">hi</p></div>"#).unwrap();
//! let app = doc.query_selector("#app").unwrap();
//! let note = doc.query_selector("p.note").unwrap();
//!
//! note.set_text_content("hello");
//! assert_eq!(app.to_html(), r#"<div id="app"><p class="note">hello</p></div>"#);
//! ```

#![warn(missing_docs)]

pub mod event;
pub mod markup;
pub mod memory;
pub mod node;
pub mod selector;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use event::{Event, EventHandler};
pub use markup::{MarkupError, parse_fragment};
pub use memory::{MemoryDocument, MemoryNode};
pub use node::{Document, DomNode};
pub use selector::{Selector, SelectorError};

#[cfg(target_arch = "wasm32")]
pub use web::{WebDocument, WebNode};
