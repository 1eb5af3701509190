use kitchenduty_core::{
    DutyConfig, DutyEngine, EngineError, KvStore, MemoryKvStore, Namespace, WeekKey,
};
use serde_json::json;
use std::sync::Arc;

fn engine() -> (DutyEngine<Arc<MemoryKvStore>>, Arc<MemoryKvStore>) {
    let store = Arc::new(MemoryKvStore::new());
    let engine = DutyEngine::load(DutyConfig::default(), store.clone()).unwrap();
    (engine, store)
}

#[test]
fn swap_exchanges_both_weeks() {
    let (mut engine, store) = engine();

    let outcome = engine.propose_swap(49, 2025, "Alessandro").unwrap();
    assert_eq!(outcome.week_a.to_string(), "2025-W49");
    assert_eq!(outcome.person_a, "Joya");
    assert_eq!(outcome.week_b.to_string(), "2025-W51");
    assert_eq!(outcome.person_b, "Alessandro");

    assert_eq!(engine.assign(49, 2025).unwrap(), "Alessandro");
    assert_eq!(engine.assign(51, 2025).unwrap(), "Joya");
    assert_eq!(
        store.load(Namespace::Swaps).unwrap(),
        Some(json!({ "2025-W49": "Alessandro", "2025-W51": "Joya" }))
    );
}

#[test]
fn swap_with_special_participant_takes_next_special_week() {
    let (mut engine, _store) = engine();
    let outcome = engine.propose_swap(49, 2025, "Maria").unwrap();
    assert_eq!(outcome.week_b.to_string(), "2025-W50");
    assert_eq!(engine.assign(50, 2025).unwrap(), "Joya");
}

#[test]
fn swap_across_year_boundary() {
    let (mut engine, _store) = engine();
    let outcome = engine.propose_swap(51, 2025, "Filippo").unwrap();
    assert_eq!(outcome.week_b.to_string(), "2026-W1");
}

#[test]
fn missing_reciprocal_week_leaves_table_unchanged() {
    let (mut engine, store) = engine();

    let err = engine.propose_swap(49, 2025, "Nobody").unwrap_err();
    assert!(matches!(err, EngineError::NoSlotFound { ref target, .. } if target == "Nobody"));
    assert!(engine.swaps().is_empty());
    assert_eq!(store.load(Namespace::Swaps).unwrap(), None);
}

#[test]
fn swapping_with_yourself_finds_no_slot() {
    let (mut engine, _store) = engine();
    let err = engine.propose_swap(49, 2025, "Joya").unwrap_err();
    assert!(matches!(err, EngineError::NoSlotFound { .. }));
    assert!(engine.swaps().is_empty());
}

#[test]
fn single_member_roster_cannot_swap_with_itself() {
    let config = DutyConfig {
        roster: vec!["Joya".into()],
        ..DutyConfig::default()
    };
    let store = Arc::new(MemoryKvStore::new());
    let mut engine = DutyEngine::load(config, store.clone()).unwrap();
    assert_eq!(engine.assign(49, 2025).unwrap(), "Joya");
    assert_eq!(engine.assign(51, 2025).unwrap(), "Joya");

    let err = engine.propose_swap(49, 2025, "Joya").unwrap_err();
    assert!(matches!(err, EngineError::NoSlotFound { ref target, .. } if target == "Joya"));
    assert!(engine.swaps().is_empty());
    assert_eq!(store.load(Namespace::Swaps).unwrap(), None);
}

#[test]
fn chained_swap_sees_earlier_override() {
    let (mut engine, store) = engine();
    engine.propose_swap(49, 2025, "Alessandro").unwrap();

    // Joya now holds 2025-W51 through the first swap.
    let outcome = engine.propose_swap(50, 2025, "Joya").unwrap();
    assert_eq!(outcome.week_a.to_string(), "2025-W50");
    assert_eq!(outcome.person_a, "Maria");
    assert_eq!(outcome.week_b.to_string(), "2025-W51");

    assert_eq!(engine.assign(49, 2025).unwrap(), "Alessandro");
    assert_eq!(engine.assign(50, 2025).unwrap(), "Joya");
    assert_eq!(engine.assign(51, 2025).unwrap(), "Maria");
    assert_eq!(
        store.load(Namespace::Swaps).unwrap(),
        Some(json!({ "2025-W49": "Alessandro", "2025-W50": "Joya", "2025-W51": "Maria" }))
    );
}

#[test]
fn swap_leaves_surrounding_weeks_on_cadence() {
    let (mut engine, _store) = engine();
    engine.propose_swap(49, 2025, "Alessandro").unwrap();

    let last = WeekKey::new(2026, 3).unwrap();
    let mut key = WeekKey::new(2025, 47).unwrap();
    let mut checked = 0;
    while key <= last {
        if key.week() != 49 && key.week() != 51 {
            assert_eq!(
                engine.assign_key(key),
                engine.rotation().scheduled(key),
                "{key} moved"
            );
            checked += 1;
        }
        key = key.next().unwrap();
    }
    assert_eq!(checked, 7);
}

#[test]
fn target_beyond_horizon_finds_no_slot() {
    let config = DutyConfig {
        swap_horizon_weeks: 4,
        ..DutyConfig::default()
    };
    let mut engine = DutyEngine::load(config, MemoryKvStore::new()).unwrap();
    // Cédric's next week after 2025-W49 is 2026-W3, six weeks out.
    assert!(matches!(
        engine.propose_swap(49, 2025, "Cédric"),
        Err(EngineError::NoSlotFound { .. })
    ));
}

#[test]
fn failed_save_keeps_previous_swaps() {
    let (mut engine, store) = engine();
    store.set_online(false);

    let err = engine.propose_swap(49, 2025, "Alessandro").unwrap_err();
    assert!(matches!(err, EngineError::PersistenceUnavailable(_)));
    assert_eq!(engine.assign(49, 2025).unwrap(), "Joya");
    assert!(engine.swaps().is_empty());
}

#[test]
fn invalid_week_input_is_rejected() {
    let (mut engine, _store) = engine();
    assert!(matches!(
        engine.propose_swap(54, 2025, "Alessandro"),
        Err(EngineError::InvalidWeekInput(_))
    ));
    assert!(matches!(
        engine.assign(0, 2025),
        Err(EngineError::InvalidWeekInput(_))
    ));
}

#[test]
fn swap_candidates_exclude_current_holder() {
    let (engine, _store) = engine();
    let candidates = engine.swap_candidates(49, 2025).unwrap();
    assert_eq!(candidates, ["Alessandro", "Filippo", "Cédric", "Maria"]);
}

#[test]
fn subscribers_hear_about_swaps() {
    use kitchenduty_core::ChangeKind;
    use std::sync::Mutex;

    let (mut engine, _store) = engine();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    engine.on_change(move |kind| sink.lock().unwrap().push(kind));

    engine.propose_swap(49, 2025, "Alessandro").unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![ChangeKind::Swaps]);
}
