//! Marker binding, repeated sections, the application facade and (with the
//! `router` feature) the hash router.
//!
//! See [`minicsr_pages`] for details.

pub use minicsr_pages::*;
