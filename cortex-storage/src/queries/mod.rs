//! SQL modules, one per concern. All take a `&Connection`; transactions are
//! managed inside the ops that need multi-statement atomicity.

pub mod aggregation;
pub mod bitemporal;
pub mod causal_ops;
pub mod embedding_ops;
pub mod link_ops;
pub mod maintenance;
pub mod memory_crud;
pub mod memory_query;
pub mod memory_search;
pub mod relationship_ops;
pub mod run_ops;
pub mod session_ops;
pub mod vector_search;
