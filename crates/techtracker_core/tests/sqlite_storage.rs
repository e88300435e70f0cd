use rusqlite::Connection;
use techtracker_core::kv::schema::latest_schema_version;
use techtracker_core::kv::{DARK_MODE_KEY, TECHNOLOGIES_KEY};
use techtracker_core::{KvError, KvStore, NewTechnology, Preferences, RecordStore, SqliteKvStore};

#[test]
fn open_in_memory_creates_latest_schema() {
    let kv = SqliteKvStore::open_in_memory().unwrap();

    assert_eq!(kv.schema_version().unwrap(), latest_schema_version());
    kv.set(TECHNOLOGIES_KEY, "[]").unwrap();
    assert_eq!(kv.get(TECHNOLOGIES_KEY).unwrap().as_deref(), Some("[]"));
}

#[test]
fn opening_file_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match SqliteKvStore::open(&path) {
        Err(KvError::SchemaTooNew { found, supported }) => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_schema_version());
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected schema version error"),
    }
}

#[test]
fn records_and_theme_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tech-tracker.sqlite3");

    let created = {
        let kv = SqliteKvStore::open(&path).unwrap();
        let mut store = RecordStore::load(&kv);
        let mut prefs = Preferences::load(&kv);
        prefs.set_dark_mode(true);
        let record = store
            .create(
                NewTechnology::new("Kubernetes", "Container orchestration")
                    .with_category("devops"),
            )
            .unwrap();
        store.set_status(record.id, "in-progress").unwrap()
    };

    let kv = SqliteKvStore::open(&path).unwrap();
    let store = RecordStore::load(&kv);
    assert_eq!(store.list(), &[created]);
    assert!(Preferences::load(&kv).dark_mode());
}

#[test]
fn keys_are_independent() {
    let kv = SqliteKvStore::open_in_memory().unwrap();

    let mut store = RecordStore::load(&kv);
    store
        .create(NewTechnology::new("Docker", "Container runtime and tooling"))
        .unwrap();
    store.clear();
    Preferences::load(&kv).set_dark_mode(false);

    assert_eq!(kv.get(TECHNOLOGIES_KEY).unwrap().as_deref(), Some("[]"));
    assert_eq!(kv.get(DARK_MODE_KEY).unwrap().as_deref(), Some("false"));
    kv.remove(DARK_MODE_KEY).unwrap();
    assert!(kv.get(DARK_MODE_KEY).unwrap().is_none());
    assert!(kv.get(TECHNOLOGIES_KEY).unwrap().is_some());
}
