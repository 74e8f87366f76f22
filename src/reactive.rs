//! Reactive state: the intercepting store, its subscription registry and
//! the computed evaluator.
//!
//! See [`minicsr_reactive`] for details.

pub use minicsr_reactive::*;
