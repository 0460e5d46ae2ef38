//! Activity domain model.
//!
//! # Responsibility
//! - Define the single record shape persisted in the activity snapshot.
//! - Provide the counter-increase transition used by the detail view.
//!
//! # Invariants
//! - `id` is stable and never reassigned after creation.
//! - Constructors never produce a nil `id`; decoded snapshots keep whatever
//!   id was stored.
//! - `times` is monotonically non-decreasing for a record lifetime.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one tracked activity.
pub type ActivityId = Uuid;

/// Validation failures for activity records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityValidationError {
    /// `id` is the nil UUID and cannot identify a record.
    NilId,
}

impl Display for ActivityValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "activity id must not be the nil uuid"),
        }
    }
}

impl Error for ActivityValidationError {}

/// One tracked habit.
///
/// Serialized as `{ "id", "title", "description", "times" }`; the field names
/// are the persisted snapshot layout and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    /// Free-form; empty and duplicate titles are accepted.
    pub title: String,
    /// Free-form; may be empty.
    pub description: String,
    /// How many times the habit was done.
    pub times: u64,
}

impl Activity {
    /// Creates a new activity with a generated id and a zero counter.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            times: 0,
        }
    }

    /// Creates an activity with a caller-provided id and a zero counter.
    ///
    /// Used by import paths where identity already exists externally.
    ///
    /// # Errors
    /// - Returns `ActivityValidationError::NilId` for `Uuid::nil()`.
    pub fn with_id(
        id: ActivityId,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ActivityValidationError> {
        let activity = Self {
            id,
            title: title.into(),
            description: description.into(),
            times: 0,
        };
        activity.validate()?;
        Ok(activity)
    }

    pub fn validate(&self) -> Result<(), ActivityValidationError> {
        if self.id.is_nil() {
            return Err(ActivityValidationError::NilId);
        }
        Ok(())
    }

    /// Returns a copy with the counter raised by one.
    ///
    /// Identity, title and description are carried over unchanged. The
    /// counter saturates at `u64::MAX` instead of wrapping.
    pub fn incremented(&self) -> Self {
        Self {
            times: self.times.saturating_add(1),
            ..self.clone()
        }
    }
}
