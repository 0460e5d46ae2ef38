//! List screen: every activity with its counter.

use crate::model::activity::{Activity, ActivityId};
use crate::storage::KeyValueStore;
use crate::store::activity_store::ActivityStore;

pub const LIST_TITLE: &str = "Habits";

/// One rendered list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow {
    pub id: ActivityId,
    pub title: String,
    pub description: String,
    pub times: u64,
}

impl From<&Activity> for ActivityRow {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.id,
            title: activity.title.clone(),
            description: activity.description.clone(),
            times: activity.times,
        }
    }
}

/// Stateless renderer for the activity list.
pub struct ActivityListView;

impl ActivityListView {
    /// Rows in store order.
    pub fn rows<S: KeyValueStore>(store: &ActivityStore<S>) -> Vec<ActivityRow> {
        store.activities().iter().map(ActivityRow::from).collect()
    }
}
