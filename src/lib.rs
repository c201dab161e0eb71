//! Word suggestions for an on-screen keyboard.
//!
//! The algorithms live in `suggest_core`; this crate bundles them into a
//! per-session [`api::SuggestEngine`] with a background query worker.

pub mod api;
mod async_worker;
pub mod trace_init;

pub use suggest_core::{composer, dict, learning, settings, suggest, unicode};
