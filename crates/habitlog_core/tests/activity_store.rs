use habitlog_core::db::open_db;
use habitlog_core::{
    encode_activities, Activity, ActivityStore, FileKeyValueStore, InMemoryKeyValueStore,
    KeyValueStore, LoadSource, PersistError, SqliteKeyValueStore, StorageError, StorageResult,
    StoreError, ACTIVITIES_KEY,
};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use uuid::Uuid;

/// Storage whose writes always fail; reads serve a fixed value.
struct ReadOnlyStorage {
    value: Option<Vec<u8>>,
}

impl KeyValueStore for ReadOnlyStorage {
    fn get(&self, _key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.value.clone())
    }

    fn set(&self, _key: &str, _value: &[u8]) -> StorageResult<()> {
        Err(StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        )))
    }
}

struct UnreadableStorage;

impl KeyValueStore for UnreadableStorage {
    fn get(&self, _key: &str) -> StorageResult<Option<Vec<u8>>> {
        Err(StorageError::Io(std::io::Error::other("disk gone")))
    }

    fn set(&self, _key: &str, _value: &[u8]) -> StorageResult<()> {
        Ok(())
    }
}

#[test]
fn run_scenario_survives_reload() {
    let storage = InMemoryKeyValueStore::new();
    let mut store = ActivityStore::initialize(&storage);
    assert!(store.is_empty());

    let run = store.append("Run", "Daily 5k");
    assert_eq!(store.activities(), &[run.clone()]);
    assert_eq!(run.times, 0);

    store.increment(run.id).unwrap();
    let after_increase = store.activities().to_vec();
    assert_eq!(after_increase.len(), 1);
    assert_eq!(after_increase[0].id, run.id);
    assert_eq!(after_increase[0].title, "Run");
    assert_eq!(after_increase[0].description, "Daily 5k");
    assert_eq!(after_increase[0].times, 1);
    drop(store);

    let reloaded = ActivityStore::initialize(&storage);
    assert_eq!(reloaded.load_source(), LoadSource::Snapshot);
    assert_eq!(reloaded.activities(), after_increase.as_slice());
}

#[test]
fn snapshot_round_trips_through_sqlite_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("habitlog.sqlite3");

    let expected = {
        let conn = open_db(&path).unwrap();
        let mut store = ActivityStore::initialize(SqliteKeyValueStore::try_new(&conn).unwrap());
        let read = store.append("Read", "20 pages");
        store.append("Stretch", "");
        store.increment(read.id).unwrap();
        store.increment(read.id).unwrap();
        store.activities().to_vec()
    };

    let conn = open_db(&path).unwrap();
    let store = ActivityStore::initialize(SqliteKeyValueStore::try_new(&conn).unwrap());
    assert_eq!(store.activities(), expected.as_slice());
    assert_eq!(store.activities()[0].times, 2);
}

#[test]
fn snapshot_round_trips_through_file_store() {
    let dir = tempfile::tempdir().unwrap();

    let expected = {
        let mut store = ActivityStore::initialize(FileKeyValueStore::open(dir.path()).unwrap());
        store.append("Journal", "one line");
        store.activities().to_vec()
    };

    let store = ActivityStore::initialize(FileKeyValueStore::open(dir.path()).unwrap());
    assert_eq!(store.activities(), expected.as_slice());
}

#[test]
fn initialize_restores_prewritten_snapshot_in_order() {
    let mut first = Activity::new("A", "first");
    first.times = 9;
    let second = Activity::new("B", "second");
    let storage = InMemoryKeyValueStore::new();
    storage
        .set(
            ACTIVITIES_KEY,
            &encode_activities(&[first.clone(), second.clone()]).unwrap(),
        )
        .unwrap();

    let store = ActivityStore::initialize(&storage);
    assert_eq!(store.activities(), &[first, second]);
}

#[test]
fn undecodable_snapshot_falls_back_to_empty() {
    let payloads: [&[u8]; 4] = [
        b"not json",
        b"{\"activities\":[]}",
        br#"[{"id":"not-a-uuid","title":"x","description":"y","times":0}]"#,
        br#"[{"id":"e621e1f8-c36c-495a-93fc-0c247a3e6e5f","title":"x","description":"y","times":1},{"title":"partial"}]"#,
    ];

    for payload in payloads {
        let storage = InMemoryKeyValueStore::new();
        storage.set(ACTIVITIES_KEY, payload).unwrap();

        let store = ActivityStore::initialize(&storage);
        assert!(store.is_empty(), "payload should not decode: {payload:?}");
        assert_eq!(store.load_source(), LoadSource::Unreadable);
    }
}

#[test]
fn stored_nil_id_does_not_discard_other_habits() {
    let storage = InMemoryKeyValueStore::new();
    storage
        .set(
            ACTIVITIES_KEY,
            br#"[{"id":"e621e1f8-c36c-495a-93fc-0c247a3e6e5f","title":"Run","description":"","times":41},{"id":"00000000-0000-0000-0000-000000000000","title":"Old","description":"","times":3}]"#,
        )
        .unwrap();

    let mut store = ActivityStore::initialize(&storage);
    assert_eq!(store.load_source(), LoadSource::Snapshot);
    assert_eq!(store.len(), 2);
    assert_eq!(store.activities()[0].times, 41);

    let updated = store.increment(Uuid::nil()).unwrap();
    assert_eq!(updated.times, 4);
}

#[test]
fn read_failure_falls_back_to_empty() {
    let store = ActivityStore::initialize(UnreadableStorage);
    assert!(store.is_empty());
    assert_eq!(store.load_source(), LoadSource::Unreadable);
}

#[test]
fn undecodable_snapshot_is_overwritten_by_next_mutation() {
    let storage = InMemoryKeyValueStore::new();
    storage.set(ACTIVITIES_KEY, b"garbage").unwrap();

    let mut store = ActivityStore::initialize(&storage);
    let run = store.append("Run", "");
    drop(store);

    let reloaded = ActivityStore::initialize(&storage);
    assert_eq!(reloaded.activities(), &[run]);
}

#[test]
fn append_n_times_keeps_call_order_and_unique_ids() {
    let storage = InMemoryKeyValueStore::new();
    let mut store = ActivityStore::initialize(&storage);

    let created: Vec<Activity> = (0..25).map(|_| store.append("A", "B")).collect();

    assert_eq!(store.len(), 25);
    assert_eq!(store.activities(), created.as_slice());
    assert!(store.activities().iter().all(|activity| activity.times == 0));
    let ids: HashSet<Uuid> = store.activities().iter().map(|activity| activity.id).collect();
    assert_eq!(ids.len(), 25);
}

#[test]
fn append_does_not_touch_existing_records() {
    let storage = InMemoryKeyValueStore::new();
    let mut store = ActivityStore::initialize(&storage);
    let run = store.append("Run", "Daily 5k");
    store.increment(run.id).unwrap();
    let before = store.activities().to_vec();

    store.append("Read", "");

    assert_eq!(&store.activities()[..1], before.as_slice());
    assert_eq!(store.len(), 2);
}

#[test]
fn increment_only_changes_target_counter() {
    let storage = InMemoryKeyValueStore::new();
    let mut store = ActivityStore::initialize(&storage);
    let a = store.append("A", "a");
    let b = store.append("B", "b");
    let c = store.append("C", "c");
    store.increment(b.id).unwrap();
    store.increment(b.id).unwrap();

    let updated = store.increment(b.id).unwrap();
    assert_eq!(updated.times, 3);
    assert_eq!(store.activities()[0], a);
    assert_eq!(store.activities()[1], updated);
    assert_eq!(store.activities()[2], c);
}

#[test]
fn structurally_identical_records_are_addressed_by_id() {
    let storage = InMemoryKeyValueStore::new();
    let mut store = ActivityStore::initialize(&storage);
    let first = store.append("Run", "same");
    let second = store.append("Run", "same");

    store.increment(second.id).unwrap();

    assert_eq!(store.get(first.id).unwrap().times, 0);
    assert_eq!(store.get(second.id).unwrap().times, 1);
}

#[test]
fn replace_unknown_id_reports_not_found_and_keeps_state() {
    let storage = InMemoryKeyValueStore::new();
    let mut store = ActivityStore::initialize(&storage);
    store.append("Run", "");
    let snapshot_before = storage.get(ACTIVITIES_KEY).unwrap();

    let stranger = Activity::new("Ghost", "");
    let err = store.replace(stranger.id, stranger.clone()).unwrap_err();
    assert_eq!(err, StoreError::NotFound(stranger.id));

    let err = store.increment(stranger.id).unwrap_err();
    assert_eq!(err, StoreError::NotFound(stranger.id));
    assert_eq!(store.len(), 1);
    assert_eq!(storage.get(ACTIVITIES_KEY).unwrap(), snapshot_before);
}

#[test]
fn replace_keeps_position() {
    let storage = InMemoryKeyValueStore::new();
    let mut store = ActivityStore::initialize(&storage);
    store.append("A", "");
    let middle = store.append("B", "");
    store.append("C", "");

    let mut renamed = middle.clone();
    renamed.title = "B2".to_string();
    store.replace(middle.id, renamed.clone()).unwrap();

    assert_eq!(store.activities()[1], renamed);
    assert_eq!(store.len(), 3);
}

#[test]
fn every_mutation_persists_full_list() {
    let storage = InMemoryKeyValueStore::new();
    let mut store = ActivityStore::initialize(&storage);

    let run = store.append("Run", "");
    let persisted = storage.get(ACTIVITIES_KEY).unwrap().unwrap();
    assert_eq!(persisted, encode_activities(store.activities()).unwrap());

    store.increment(run.id).unwrap();
    let persisted = storage.get(ACTIVITIES_KEY).unwrap().unwrap();
    assert_eq!(persisted, encode_activities(store.activities()).unwrap());
}

#[test]
fn persist_failure_keeps_in_memory_state() {
    let mut store = ActivityStore::initialize(ReadOnlyStorage { value: None });

    let run = store.append("Run", "Daily 5k");
    assert!(matches!(
        store.last_persist_error(),
        Some(PersistError::Storage(StorageError::Io(_)))
    ));

    let updated = store.increment(run.id).unwrap();
    assert_eq!(updated.times, 1);
    assert_eq!(store.activities(), &[updated]);
    assert!(store.last_persist_error().is_some());
}

#[test]
fn successful_persist_clears_previous_error() {
    let storage = InMemoryKeyValueStore::new();
    let mut store = ActivityStore::initialize(&storage);
    store.append("Run", "");
    assert!(store.last_persist_error().is_none());
}

#[test]
fn observers_see_each_successful_mutation() {
    let storage = InMemoryKeyValueStore::new();
    let mut store = ActivityStore::initialize(&storage);
    let seen: Rc<RefCell<Vec<usize>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let subscription = store.subscribe(move |activities| sink.borrow_mut().push(activities.len()));

    let run = store.append("Run", "");
    store.increment(run.id).unwrap();
    let _ = store.increment(Uuid::new_v4());
    assert_eq!(*seen.borrow(), vec![1, 1]);

    assert!(store.unsubscribe(subscription));
    store.append("Read", "");
    assert_eq!(*seen.borrow(), vec![1, 1]);
}

#[test]
fn observers_run_after_snapshot_is_written() {
    let storage = Rc::new(InMemoryKeyValueStore::new());
    let mut store = ActivityStore::initialize(Rc::clone(&storage));
    let observed: Rc<RefCell<Option<Vec<u8>>>> = Rc::default();
    let (probe, sink) = (Rc::clone(&storage), Rc::clone(&observed));
    store.subscribe(move |_| *sink.borrow_mut() = probe.get(ACTIVITIES_KEY).unwrap());

    store.append("Run", "");

    let expected = encode_activities(store.activities()).unwrap();
    assert_eq!(observed.borrow().as_deref(), Some(expected.as_slice()));
}
