//! UI-agnostic view models for the three habit screens.
//!
//! # Responsibility
//! - Turn store state into render-ready rows and labels.
//! - Translate user actions (add, increase) into store calls.
//!
//! # Invariants
//! - Views never own the store; it is passed in per call.
//! - Mutations always address records by id, never by cached snapshot.

pub mod add_form;
pub mod detail;
pub mod list;
