use std::collections::HashMap;
use std::sync::Arc;

use cortex_core::config::SessionConfig;
use cortex_core::traits::ISessionStorage;
use cortex_core::CortexError;
use cortex_session::{analytics, filter_duplicates, SessionManager};
use cortex_storage::StorageEngine;

fn manager() -> SessionManager {
    SessionManager::new(SessionConfig {
        persist_sessions: false,
        ..Default::default()
    })
}

#[test]
fn deduplication_filters_already_sent_memories() {
    let manager = manager();
    let sid = manager.create_session(None).unwrap();

    manager
        .track_memories_sent(&sid, &[("mem1".to_string(), 100, 1)])
        .unwrap();

    let candidates = vec!["mem1".to_string(), "mem2".to_string(), "mem3".to_string()];
    let mut estimates = HashMap::new();
    estimates.insert("mem1".to_string(), 100);
    estimates.insert("mem2".to_string(), 200);
    estimates.insert("mem3".to_string(), 150);

    let result = filter_duplicates(&manager, &sid, &candidates, &estimates);

    assert_eq!(result.to_send.len(), 2, "should send 2 new memories");
    assert_eq!(result.filtered.len(), 1, "should filter 1 duplicate");
    assert!(result.filtered.contains(&"mem1".to_string()));
    assert_eq!(result.tokens_saved, 100, "should save 100 tokens");
}

#[test]
fn loaded_sets_are_monotone_and_tokens_accumulate() {
    let manager = manager();
    let sid = manager.create_session(None).unwrap();

    manager
        .track_memories_sent(
            &sid,
            &[
                ("mem1".to_string(), 150, 1),
                ("mem2".to_string(), 200, 2),
                ("mem3".to_string(), 350, 2),
            ],
        )
        .unwrap();

    let ctx = manager.get_session(&sid).unwrap();
    assert_eq!(ctx.tokens_sent, 700);
    assert_eq!(ctx.loaded_memories.len(), 3);
    assert_eq!(ctx.level_counts.get(&2), Some(&2));

    // Re-sending the same id never shrinks the set.
    manager
        .track_memories_sent(&sid, &[("mem1".to_string(), 150, 1)])
        .unwrap();
    assert_eq!(manager.get_session(&sid).unwrap().loaded_memories.len(), 3);
}

#[test]
fn ended_sessions_reject_mutation() {
    let manager = manager();
    let sid = manager.create_session(None).unwrap();
    manager.end_session(&sid).unwrap();

    let err = manager
        .track_memories_sent(&sid, &[("mem1".to_string(), 10, 0)])
        .unwrap_err();
    assert!(matches!(err, CortexError::Conflict { .. }));

    let err = manager.record_query(&sid).unwrap_err();
    assert!(matches!(err, CortexError::Conflict { .. }));
}

#[test]
fn unknown_session_is_an_error() {
    let manager = manager();
    let err = manager.record_query("sess_ghost").unwrap_err();
    assert!(matches!(err, CortexError::RetrievalError(_)));
}

#[test]
fn cleanup_seals_idle_sessions() {
    let manager = SessionManager::new(SessionConfig {
        inactivity_timeout_minutes: 0,
        persist_sessions: false,
        ..Default::default()
    });
    let sid = manager.create_session(None).unwrap();

    // With a zero-minute timeout, any session is instantly idle.
    let (sealed, dropped) = manager.cleanup().unwrap();
    assert_eq!(sealed, 1);
    assert_eq!(dropped, 0);
    assert!(manager.get_session(&sid).unwrap().is_ended());
}

#[test]
fn concurrent_session_access_no_corruption() {
    use std::thread;

    let manager = Arc::new(manager());
    let mut session_ids = Vec::new();
    for _ in 0..4 {
        session_ids.push(manager.create_session(None).unwrap());
    }

    let mut handles = vec![];
    for sid in &session_ids {
        let mgr = Arc::clone(&manager);
        let sid = sid.clone();
        handles.push(thread::spawn(move || {
            for j in 0..100 {
                mgr.track_memories_sent(&sid, &[(format!("mem_{j}"), 10, 1)])
                    .unwrap();
                mgr.record_query(&sid).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    for sid in &session_ids {
        let ctx = manager.get_session(sid).unwrap();
        assert_eq!(ctx.queries_made, 100);
        assert_eq!(ctx.loaded_memories.len(), 100);
        assert_eq!(ctx.tokens_sent, 1000);
    }
}

#[test]
fn stats_track_dedup_efficiency() {
    let manager = manager();
    let sid = manager.create_session(None).unwrap();
    manager
        .track_memories_sent(&sid, &[("mem1".to_string(), 100, 1)])
        .unwrap();

    let estimates = HashMap::from([("mem1".to_string(), 100)]);
    let candidates = vec!["mem1".to_string(), "mem2".to_string()];
    filter_duplicates(&manager, &sid, &candidates, &estimates);

    let stats = analytics::session_stats(&manager.get_session(&sid).unwrap());
    assert!((stats.dedup_efficiency - 0.5).abs() < f64::EPSILON);
    assert_eq!(stats.tokens_saved, 100);
}

#[test]
fn sessions_persist_and_restore() {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let manager = SessionManager::with_persistence(
        SessionConfig::default(),
        Arc::clone(&storage) as Arc<dyn ISessionStorage>,
    )
    .unwrap();

    let sid = manager.create_session(None).unwrap();
    manager
        .track_memories_sent(&sid, &[("mem1".to_string(), 42, 1)])
        .unwrap();

    // A second manager over the same storage sees the open session.
    let restored = SessionManager::with_persistence(
        SessionConfig::default(),
        Arc::clone(&storage) as Arc<dyn ISessionStorage>,
    )
    .unwrap();
    let ctx = restored.get_session(&sid).unwrap();
    assert!(ctx.is_memory_sent("mem1"));
    assert_eq!(ctx.tokens_sent, 42);
}
