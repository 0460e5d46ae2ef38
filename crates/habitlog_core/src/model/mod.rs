//! Habit domain model.
//!
//! # Responsibility
//! - Define the canonical activity record tracked by the store.
//!
//! # Invariants
//! - Every activity is identified by a stable, non-nil `ActivityId`.
//! - Activities are never deleted; counters only move forward.

pub mod activity;
