//! Connection tuning. Writers get the durability/performance posture for a
//! long-lived embedded store; readers get a locked-down query-only setup.

use rusqlite::Connection;

use cortex_core::errors::CortexResult;

use crate::to_storage_err;

/// Writer posture: WAL so readers never block on commits, NORMAL sync (WAL
/// makes FULL redundant for this workload), a 128MB mmap window, 32MB page
/// cache, 5s busy wait, enforced foreign keys, incremental vacuum.
const WRITER_PRAGMAS: &str = "
    PRAGMA journal_mode = WAL;
    PRAGMA synchronous = NORMAL;
    PRAGMA mmap_size = 134217728;
    PRAGMA cache_size = -32000;
    PRAGMA busy_timeout = 5000;
    PRAGMA foreign_keys = ON;
    PRAGMA auto_vacuum = INCREMENTAL;
";

/// Reader posture: same busy wait, and query_only so a read connection can
/// never mutate even if handed the wrong SQL.
const READER_PRAGMAS: &str = "
    PRAGMA busy_timeout = 5000;
    PRAGMA query_only = ON;
";

pub fn configure_writer(conn: &Connection) -> CortexResult<()> {
    conn.execute_batch(WRITER_PRAGMAS)
        .map_err(|e| to_storage_err(format!("writer pragmas: {e}")))
}

pub fn configure_reader(conn: &Connection) -> CortexResult<()> {
    conn.execute_batch(READER_PRAGMAS)
        .map_err(|e| to_storage_err(format!("reader pragmas: {e}")))
}

/// Whether the connection's journal mode actually ended up as WAL.
/// `journal_mode = WAL` is a request, not a guarantee (e.g. in-memory
/// databases report `memory`).
pub fn wal_active(conn: &Connection) -> CortexResult<bool> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| to_storage_err(format!("journal_mode query: {e}")))?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
