//! Detail screen for one activity with the "Increase" action.

use crate::model::activity::{Activity, ActivityId};
use crate::storage::KeyValueStore;
use crate::store::activity_store::{ActivityStore, StoreResult};

/// Detail view bound to one activity id.
///
/// Holds a render-time snapshot for display only. `increase` resolves the
/// record through the store, so the snapshot may be stale without harm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDetailView {
    snapshot: Activity,
}

impl ActivityDetailView {
    pub fn new(snapshot: Activity) -> Self {
        Self { snapshot }
    }

    /// Opens the detail view for `id` using the store's current record.
    pub fn open<S: KeyValueStore>(store: &ActivityStore<S>, id: ActivityId) -> Option<Self> {
        store.get(id).cloned().map(Self::new)
    }

    pub fn id(&self) -> ActivityId {
        self.snapshot.id
    }

    pub fn snapshot(&self) -> &Activity {
        &self.snapshot
    }

    pub fn title(&self) -> &str {
        &self.snapshot.title
    }

    pub fn description_line(&self) -> String {
        format!("Description: {}", self.snapshot.description)
    }

    pub fn times_line(&self) -> String {
        format!("Times done: {}", self.snapshot.times)
    }

    /// Raises the counter by one and refreshes the displayed snapshot.
    pub fn increase<S: KeyValueStore>(&mut self, store: &mut ActivityStore<S>) -> StoreResult<()> {
        self.snapshot = store.increment(self.snapshot.id)?;
        Ok(())
    }
}
