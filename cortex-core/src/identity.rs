//! Memory id generation and monotonic timestamps.
//!
//! Ids are `{domain}_{base36 millis}_{8 hex random}` — sortable by creation
//! time within a domain, collision-resistant via the random suffix.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};

/// Opaque memory identifier. Stable for the lifetime of the record.
pub type MemoryId = String;

static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Current time, guaranteed non-decreasing across calls in this process.
///
/// Wall clocks can step backwards (NTP); persisted ordering must not.
pub fn monotonic_now() -> DateTime<Utc> {
    let wall = Utc::now().timestamp_millis();
    let mut prev = LAST_MILLIS.load(Ordering::Relaxed);
    loop {
        let next = wall.max(prev);
        match LAST_MILLIS.compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => {
                return Utc
                    .timestamp_millis_opt(next)
                    .single()
                    .unwrap_or_else(Utc::now)
            }
            Err(observed) => prev = observed,
        }
    }
}

/// Generate a new memory id in the given domain, e.g. `mem_lx3k2a9f_3fa4b21c`.
pub fn new_id(domain: &str) -> MemoryId {
    let millis = monotonic_now().timestamp_millis();
    let entropy = uuid::Uuid::new_v4().simple().to_string();
    format!("{domain}_{}_{}", to_base36(millis), &entropy[..8])
}

/// Generate an id for a memory record.
pub fn new_memory_id() -> MemoryId {
    new_id("mem")
}

/// Generate an id for a causal edge.
pub fn new_edge_id() -> String {
    new_id("edge")
}

/// Generate an id for a session.
pub fn new_session_id() -> String {
    new_id("sess")
}

/// Generate an id for a consolidation run.
pub fn new_run_id() -> String {
    new_id("run")
}

fn to_base36(mut n: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n <= 0 {
        return "0".to_string();
    }
    let mut buf = Vec::with_capacity(9);
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(new_memory_id()));
        }
    }

    #[test]
    fn id_has_three_segments() {
        let id = new_memory_id();
        let parts: Vec<&str> = id.splitn(3, '_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "mem");
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn monotonic_now_never_decreases() {
        let mut prev = monotonic_now();
        for _ in 0..100 {
            let next = monotonic_now();
            assert!(next >= prev);
            prev = next;
        }
    }

    #[test]
    fn base36_round_trip() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
