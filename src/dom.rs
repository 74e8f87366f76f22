//! Presentation tree capability set and its backends.
//!
//! See [`minicsr_dom`] for details.

pub use minicsr_dom::*;
