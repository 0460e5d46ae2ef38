//! Add-activity form: two text inputs plus confirm/cancel.

use crate::model::activity::Activity;
use crate::storage::KeyValueStore;
use crate::store::activity_store::ActivityStore;

/// Editable form state; consumed by `confirm` or `cancel`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddActivityForm {
    pub title: String,
    pub description: String,
}

impl AddActivityForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Appends the entered activity as-is and closes the form.
    pub fn confirm<S: KeyValueStore>(self, store: &mut ActivityStore<S>) -> Activity {
        store.append(self.title, self.description)
    }

    /// Closes the form without touching the store.
    pub fn cancel(self) {}
}
