/// Validation and healing errors.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("cited file unreadable: {path}: {reason}")]
    FileUnreadable { path: String, reason: String },

    #[error("citation region out of range: {path}:{line_start}-{line_end}")]
    RegionOutOfRange {
        path: String,
        line_start: u32,
        line_end: u32,
    },

    #[error("healing not applicable for issue kind {kind}")]
    NotHealable { kind: String },
}
