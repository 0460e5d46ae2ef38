//! Activity store over a key-value storage slot.
//!
//! # Responsibility
//! - Load the activity snapshot once at construction.
//! - Apply append/replace/increment mutations in list order.
//! - Re-encode and overwrite the full snapshot after each mutation, then
//!   notify observers.
//!
//! # Invariants
//! - Insertion order is preserved; replacement keeps the position.
//! - A failed mutation leaves the list, the snapshot and observers untouched.
//! - Load and persist failures are logged and swallowed.
//! - Log events carry counts and ids only, never titles or descriptions.

use crate::codec::{decode_activities, encode_activities, CodecError};
use crate::model::activity::{Activity, ActivityId};
use crate::storage::{KeyValueStore, StorageError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the encoded activity list.
pub const ACTIVITIES_KEY: &str = "activities";

pub type StoreResult<T> = Result<T, StoreError>;

/// Contract violations reported by store mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No activity with this id exists in the list.
    NotFound(ActivityId),
    /// A replacement tried to change the id of the record it replaces.
    IdentityChanged {
        expected: ActivityId,
        found: ActivityId,
    },
    /// A replacement tried to lower the completion counter.
    CounterDecreased {
        id: ActivityId,
        current: u64,
        requested: u64,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "activity not found: {id}"),
            Self::IdentityChanged { expected, found } => write!(
                f,
                "replacement id {found} does not match target activity {expected}"
            ),
            Self::CounterDecreased {
                id,
                current,
                requested,
            } => write!(
                f,
                "activity {id} counter cannot decrease from {current} to {requested}"
            ),
        }
    }
}

impl Error for StoreError {}

/// Why the most recent snapshot write did not happen.
#[derive(Debug)]
pub enum PersistError {
    Encode(CodecError),
    Storage(StorageError),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

/// Where the initial list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// A snapshot was present and decoded.
    Snapshot,
    /// No snapshot was stored; the list starts empty.
    Missing,
    /// A snapshot could not be read or decoded; the list starts empty.
    Unreadable,
}

/// Handle returned by `subscribe`, used to detach an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&[Activity])>;

/// In-memory owner of the activity list.
///
/// Injected into views and front ends; there is no process-wide instance.
pub struct ActivityStore<S: KeyValueStore> {
    storage: S,
    activities: Vec<Activity>,
    load_source: LoadSource,
    last_persist_error: Option<PersistError>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl<S: KeyValueStore> ActivityStore<S> {
    /// Loads the persisted snapshot from `storage`.
    ///
    /// Never fails: a missing, unreadable or undecodable snapshot yields an
    /// empty list. The fallback reason is available through `load_source()`.
    pub fn initialize(storage: S) -> Self {
        let (activities, load_source) = load_snapshot(&storage);
        Self {
            storage,
            activities,
            load_source,
            last_persist_error: None,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current list in insertion order.
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn get(&self, id: ActivityId) -> Option<&Activity> {
        self.activities.iter().find(|activity| activity.id == id)
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    /// Error of the most recent persist, or `None` when it succeeded.
    pub fn last_persist_error(&self) -> Option<&PersistError> {
        self.last_persist_error.as_ref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Appends a new activity with a fresh id and `times = 0`.
    ///
    /// Title and description are stored as given; empty values are accepted.
    pub fn append(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Activity {
        let activity = Activity::new(title, description);
        self.activities.push(activity.clone());
        info!(
            "event=activity_append module=store status=ok activity_id={} count={}",
            activity.id,
            self.activities.len()
        );
        self.commit();
        activity
    }

    /// Replaces the activity identified by `target` with `replacement`,
    /// keeping its list position.
    ///
    /// # Errors
    /// - `StoreError::IdentityChanged` when `replacement.id != target`.
    /// - `StoreError::NotFound` when `target` is not in the list.
    /// - `StoreError::CounterDecreased` when `replacement.times` is below the
    ///   current counter.
    pub fn replace(&mut self, target: ActivityId, replacement: Activity) -> StoreResult<()> {
        if replacement.id != target {
            return Err(StoreError::IdentityChanged {
                expected: target,
                found: replacement.id,
            });
        }
        let position = self
            .position_of(target)
            .ok_or(StoreError::NotFound(target))?;
        let current = self.activities[position].times;
        if replacement.times < current {
            return Err(StoreError::CounterDecreased {
                id: target,
                current,
                requested: replacement.times,
            });
        }

        self.activities[position] = replacement;
        info!(
            "event=activity_replace module=store status=ok activity_id={target} position={position}"
        );
        self.commit();
        Ok(())
    }

    /// Raises the counter of the activity identified by `id` by one.
    ///
    /// Looks the record up at call time, so a stale caller-side copy cannot
    /// overwrite newer state. Returns the updated record.
    pub fn increment(&mut self, id: ActivityId) -> StoreResult<Activity> {
        let next = self
            .get(id)
            .map(Activity::incremented)
            .ok_or(StoreError::NotFound(id))?;
        self.replace(id, next.clone())?;
        Ok(next)
    }

    /// Registers a callback invoked with the full list after each mutation.
    pub fn subscribe(&mut self, observer: impl FnMut(&[Activity]) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Detaches an observer. Returns `false` when the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(candidate, _)| *candidate != id);
        self.observers.len() != before
    }

    fn position_of(&self, id: ActivityId) -> Option<usize> {
        self.activities.iter().position(|activity| activity.id == id)
    }

    fn commit(&mut self) {
        self.persist();
        for (_, observer) in self.observers.iter_mut() {
            observer(&self.activities);
        }
    }

    fn persist(&mut self) {
        let result = encode_activities(&self.activities)
            .map_err(PersistError::Encode)
            .and_then(|bytes| {
                self.storage
                    .set(ACTIVITIES_KEY, &bytes)
                    .map(|()| bytes.len())
                    .map_err(PersistError::Storage)
            });

        match result {
            Ok(bytes) => {
                debug!(
                    "event=store_persist module=store status=ok count={} bytes={bytes}",
                    self.activities.len()
                );
                self.last_persist_error = None;
            }
            Err(err) => {
                warn!(
                    "event=store_persist module=store status=error count={} error={err}",
                    self.activities.len()
                );
                self.last_persist_error = Some(err);
            }
        }
    }
}

fn load_snapshot(storage: &impl KeyValueStore) -> (Vec<Activity>, LoadSource) {
    let bytes = match storage.get(ACTIVITIES_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            info!("event=store_load module=store status=ok source=missing count=0");
            return (Vec::new(), LoadSource::Missing);
        }
        Err(err) => {
            warn!(
                "event=store_load module=store status=fallback error_code=read_failed error={err}"
            );
            return (Vec::new(), LoadSource::Unreadable);
        }
    };

    match decode_activities(&bytes) {
        Ok(activities) => {
            info!(
                "event=store_load module=store status=ok source=snapshot count={}",
                activities.len()
            );
            (activities, LoadSource::Snapshot)
        }
        Err(err) => {
            warn!(
                "event=store_load module=store status=fallback error_code=decode_failed bytes={} error={err}",
                bytes.len()
            );
            (Vec::new(), LoadSource::Unreadable)
        }
    }
}
