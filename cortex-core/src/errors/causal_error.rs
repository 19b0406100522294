/// Causal graph errors.
#[derive(Debug, thiserror::Error)]
pub enum CausalError {
    #[error("cycle detected in causal graph: {path}")]
    CycleDetected { path: String },

    #[error("self-loop rejected for memory {id}")]
    SelfLoop { id: String },

    #[error("edge endpoint does not exist: {id}")]
    MissingEndpoint { id: String },

    #[error("invalid relation: {reason}")]
    InvalidRelation { reason: String },

    #[error("graph inconsistency: {details}")]
    GraphInconsistency { details: String },
}
