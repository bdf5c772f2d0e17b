//! Request middleware.
//!
//! Cross-cutting request concerns that sit outside the HTTP handlers.

pub mod trace;

pub use trace::Trace;
