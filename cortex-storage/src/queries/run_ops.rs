//! Run history: consolidation metrics and validation findings.

use rusqlite::{params, Connection};

use cortex_core::errors::CortexResult;
use cortex_core::models::{ConsolidationReport, HealingOutcome, ValidationReport};

use crate::{to_serialization_err, to_storage_err};

pub fn record_consolidation_run(
    conn: &Connection,
    report: &ConsolidationReport,
) -> CortexResult<()> {
    let metrics_json =
        serde_json::to_string(report).map_err(|e| to_serialization_err(e.to_string()))?;
    conn.execute(
        "INSERT OR REPLACE INTO consolidation_runs (id, started_at, ended_at, metrics)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            report.run_id,
            report.started_at.to_rfc3339(),
            report.ended_at.to_rfc3339(),
            metrics_json,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// One row per issue; healed issues carry the actions taken.
pub fn record_validation_run(
    conn: &Connection,
    report: &ValidationReport,
    healed: Option<&HealingOutcome>,
) -> CortexResult<()> {
    let actions_json = healed
        .map(|h| serde_json::to_string(&h.actions))
        .transpose()
        .map_err(|e| to_serialization_err(e.to_string()))?;
    let healed_at = healed.map(|h| h.healed_at.to_rfc3339());

    for issue in &report.issues {
        conn.execute(
            "INSERT INTO validation_runs (memory_id, at, dimension, severity, description, healed_at, actions)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                report.memory_id,
                report.validated_at.to_rfc3339(),
                issue.dimension.as_str(),
                format!("{:?}", issue.severity).to_lowercase(),
                issue.description,
                healed_at,
                actions_json,
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    Ok(())
}
