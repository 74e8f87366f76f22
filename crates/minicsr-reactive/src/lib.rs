//! minicsr reactive core
//!
//! The reactive half of minicsr: a plain mutable state object whose every write
//! is intercepted, deduplicated and broadcast to named subscribers, followed by
//! a full recalculation of the derived (computed) properties.
//!
//! ## Architecture
//!
//! - [`SubscriptionRegistry`]: property name -> ordered listener list
//! - [`ComputedEvaluator`]: recomputes every computed definition after a write
//! - [`Store`]: the intercepting wrapper that owns the state map and drives the two above
//!
//! There is no dependency tracking. Every successful [`Store::set`] notifies the
//! listeners of the written property and then re-evaluates *all* computed
//! definitions, re-broadcasting only the ones whose value actually changed.
//!
//! ## Example
//!
//! ```
//! use minicsr_reactive::{ComputedDef, Store};
//! use serde_json::json;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let data = json!({ "todos": [{ "isDone": true }, { "isDone": false }] });
//! let done = ComputedDef::new("done", |state| {
//!     let todos = state.array("todos")?;
//!     Ok(todos.iter().filter(|t| t["isDone"] == true).count().into())
//! });
//! let store = Store::new(data.as_object().cloned().unwrap_or_default(), vec![done]);
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = seen.clone();
//! store.subscribe("done", move |v| sink.borrow_mut().push(v.clone()));
//!
//! store.recalculate();
//! assert_eq!(store.get("done"), Some(json!(1)));
//!
//! store.set("todos", json!([{ "isDone": true }, { "isDone": true }]));
//! assert_eq!(*seen.borrow(), vec![json!(1), json!(2)]);
//! ```

#![warn(missing_docs)]

pub mod computed;
pub mod error;
pub mod registry;
pub mod store;
pub mod value;

pub use computed::{ComputeFn, ComputedDef, ComputedEvaluator, StateView};
pub use error::ComputeError;
pub use registry::{Listener, SubscriptionRegistry};
pub use store::{DEFAULT_MAX_NOTIFY_DEPTH, Store, WeakStore};
pub use value::{display_text, is_truthy};

/// State values are plain JSON values.
pub use serde_json::{Map, Value};

/// The state object: property name to value.
pub type StateMap = Map<String, Value>;
