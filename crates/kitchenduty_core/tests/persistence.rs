use kitchenduty_core::{
    ChangeKind, DutyConfig, DutyEngine, KvStore, MemoryKvStore, Namespace, SqliteKvStore,
    TieredStore,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[test]
fn sqlite_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kitchenduty.db");

    {
        let store = SqliteKvStore::open(&path).unwrap();
        let mut engine = DutyEngine::load(DutyConfig::default(), store).unwrap();
        engine.propose_swap(49, 2025, "Alessandro").unwrap();
        engine.mark_done(51, 2025).unwrap();
    }

    let store = SqliteKvStore::open(&path).unwrap();
    let engine = DutyEngine::load(DutyConfig::default(), store).unwrap();
    assert_eq!(engine.assign(49, 2025).unwrap(), "Alessandro");
    assert_eq!(engine.assign(51, 2025).unwrap(), "Joya");
    assert!(engine.is_done(51, 2025).unwrap());
}

#[test]
fn unreachable_store_starts_empty_and_keeps_working_read_only() {
    let store = Arc::new(MemoryKvStore::new());
    store.set_online(false);

    let engine = DutyEngine::load(DutyConfig::default(), store).unwrap();
    assert!(engine.swaps().is_empty());
    assert_eq!(engine.assign(49, 2025).unwrap(), "Joya");
}

#[test]
fn invalid_persisted_keys_are_skipped() {
    let store = MemoryKvStore::new();
    store
        .save(
            Namespace::Swaps,
            &json!({ "2025-W49": "Filippo", "2025-W0": "Joya", "garbage": "Joya" }),
        )
        .unwrap();

    let engine = DutyEngine::load(DutyConfig::default(), store).unwrap();
    assert_eq!(engine.swaps().len(), 1);
    assert_eq!(engine.assign(49, 2025).unwrap(), "Filippo");
}

#[test]
fn tiered_store_commits_locally_while_remote_is_down() {
    let local = Arc::new(MemoryKvStore::new());
    let remote = Arc::new(MemoryKvStore::new());
    let store = Arc::new(TieredStore::new(local.clone(), remote.clone()));
    remote.set_online(false);

    let mut engine = DutyEngine::load(DutyConfig::default(), store.clone()).unwrap();
    engine.propose_swap(49, 2025, "Alessandro").unwrap();

    assert!(store.is_degraded());
    assert_eq!(
        local.load(Namespace::Swaps).unwrap(),
        Some(json!({ "2025-W49": "Alessandro", "2025-W51": "Joya" }))
    );

    remote.set_online(true);
    assert!(engine.refresh().is_empty());
    assert_eq!(engine.assign(49, 2025).unwrap(), "Alessandro");
    assert_eq!(
        remote.load(Namespace::Swaps).unwrap(),
        Some(json!({ "2025-W49": "Alessandro", "2025-W51": "Joya" }))
    );
}

#[test]
fn writes_made_during_outage_survive_refresh_over_older_remote() {
    let local = Arc::new(MemoryKvStore::new());
    let remote = Arc::new(MemoryKvStore::new());
    let store = Arc::new(TieredStore::new(local.clone(), remote.clone()));
    let mut engine = DutyEngine::load(DutyConfig::default(), store.clone()).unwrap();

    engine.mark_done(49, 2025).unwrap();
    assert_eq!(
        remote
            .load(Namespace::History)
            .unwrap()
            .and_then(|value| value.as_array().map(Vec::len)),
        Some(1)
    );

    remote.set_online(false);
    engine.propose_swap(51, 2025, "Filippo").unwrap();
    engine.mark_done(51, 2025).unwrap();
    assert!(store.is_degraded());

    remote.set_online(true);
    assert!(engine.refresh().is_empty());
    assert!(!store.is_degraded());

    assert!(engine.is_done(49, 2025).unwrap());
    assert!(engine.is_done(51, 2025).unwrap());
    assert_eq!(engine.assign(51, 2025).unwrap(), "Filippo");
    assert_eq!(engine.assign(1, 2026).unwrap(), "Alessandro");
    assert_eq!(
        remote
            .load(Namespace::History)
            .unwrap()
            .and_then(|value| value.as_array().map(Vec::len)),
        Some(2)
    );
    assert_eq!(
        remote.load(Namespace::Swaps).unwrap(),
        Some(json!({ "2025-W51": "Filippo", "2026-W1": "Alessandro" }))
    );
}

#[test]
fn sqlite_mirror_remembers_unpushed_writes_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kitchenduty.db");
    let remote = Arc::new(MemoryKvStore::new());
    remote.save(Namespace::Swaps, &json!({})).unwrap();
    remote.set_online(false);

    {
        let store = TieredStore::new(SqliteKvStore::open(&path).unwrap(), remote.clone());
        let mut engine = DutyEngine::load(DutyConfig::default(), store).unwrap();
        engine.propose_swap(49, 2025, "Alessandro").unwrap();
    }

    remote.set_online(true);
    let store = TieredStore::new(SqliteKvStore::open(&path).unwrap(), remote.clone());
    let mut engine = DutyEngine::load(DutyConfig::default(), store).unwrap();
    engine.refresh();

    assert_eq!(engine.assign(49, 2025).unwrap(), "Alessandro");
    assert_eq!(
        remote.load(Namespace::Swaps).unwrap(),
        Some(json!({ "2025-W49": "Alessandro", "2025-W51": "Joya" }))
    );
    assert!(!engine.store().local().is_pending(Namespace::Swaps).unwrap());
}

#[test]
fn refresh_installs_remote_changes_and_notifies() {
    let local = Arc::new(MemoryKvStore::new());
    let remote = Arc::new(MemoryKvStore::new());
    let store = TieredStore::new(local.clone(), remote.clone());
    let mut engine = DutyEngine::load(DutyConfig::default(), store).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    engine.on_change(move |kind| sink.lock().unwrap().push(kind));

    // Another device swapped and completed a week.
    remote
        .save(Namespace::Swaps, &json!({ "2025-W49": "Filippo", "2026-W1": "Joya" }))
        .unwrap();
    remote
        .save(
            Namespace::History,
            &json!([{ "week": "2025-W49", "person": "Filippo", "date": "2025-12-05T19:00:00Z" }]),
        )
        .unwrap();

    let changed = engine.refresh();
    assert_eq!(changed, vec![ChangeKind::History, ChangeKind::Swaps]);
    assert_eq!(*seen.lock().unwrap(), changed);
    assert_eq!(engine.assign(49, 2025).unwrap(), "Filippo");
    assert!(engine.is_done(49, 2025).unwrap());
    assert_eq!(
        local.load(Namespace::Swaps).unwrap(),
        Some(json!({ "2025-W49": "Filippo", "2026-W1": "Joya" }))
    );

    // Nothing new upstream.
    assert!(engine.refresh().is_empty());
}

#[test]
fn apply_remote_replaces_working_copy() {
    let mut engine = DutyEngine::load(DutyConfig::default(), MemoryKvStore::new()).unwrap();
    engine.propose_swap(49, 2025, "Alessandro").unwrap();

    assert!(engine.apply_remote(Namespace::Swaps, &json!({})));
    assert_eq!(engine.assign(49, 2025).unwrap(), "Joya");
    assert!(!engine.apply_remote(Namespace::Swaps, &json!({})));
}

#[test]
fn week_state_round_trips_through_store() {
    let store = Arc::new(MemoryKvStore::new());
    let mut engine = DutyEngine::load(DutyConfig::default(), store.clone()).unwrap();

    engine
        .set_week_state(49, 2025, json!({ "note": "oven cleaned" }))
        .unwrap();
    assert_eq!(
        engine.week_state(49, 2025).unwrap(),
        Some(&json!({ "note": "oven cleaned" }))
    );
    assert_eq!(engine.week_state(50, 2025).unwrap(), None);
    assert_eq!(
        store.load(Namespace::WeekStates).unwrap(),
        Some(json!({ "2025-W49": { "note": "oven cleaned" } }))
    );

    let reloaded = DutyEngine::load(DutyConfig::default(), store).unwrap();
    assert!(reloaded.week_state(49, 2025).unwrap().is_some());
}
