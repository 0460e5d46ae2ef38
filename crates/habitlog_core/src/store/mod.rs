//! Stateful activity container.
//!
//! # Responsibility
//! - Own the canonical ordered activity list.
//! - Keep the persisted snapshot synchronized after every mutation.
//!
//! # Invariants
//! - Records are addressed by `ActivityId`, never by structural equality.
//! - Persistence failures never roll back in-memory state.

pub mod activity_store;
