//! The `supersedes` relation must stay a DAG. Before inserting
//! `source --supersedes--> target`, check that `source` is not already
//! reachable from `target` along supersedes edges.

use std::collections::{HashSet, VecDeque};

use cortex_core::errors::CortexResult;
use cortex_core::models::CausalRelation;
use cortex_core::traits::ICausalStorage;

/// True when adding `source → target` would close a supersedes cycle.
pub fn would_create_cycle(
    storage: &dyn ICausalStorage,
    source_id: &str,
    target_id: &str,
) -> CortexResult<bool> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue = VecDeque::new();
    queue.push_back(target_id.to_string());

    while let Some(current) = queue.pop_front() {
        if current == source_id {
            return Ok(true);
        }
        if !visited.insert(current.clone()) {
            continue;
        }
        for edge in storage.get_edges_from(&current)? {
            if edge.relation == CausalRelation::Supersedes {
                queue.push_back(edge.target_id);
            }
        }
    }
    Ok(false)
}
