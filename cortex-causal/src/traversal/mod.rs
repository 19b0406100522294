//! Bounded traversal over the causal table.
//!
//! Edges are rows, not an object graph; a traversal loads the relevant rows
//! into a petgraph snapshot and walks it breadth-first under the depth, node,
//! strength, and relation bounds.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use cortex_core::errors::CortexResult;
use cortex_core::models::{CausalChain, CausalEdge, CausalRelation, ChainNode};
use cortex_core::traits::ICausalStorage;

/// Bounds and filters for a traversal.
#[derive(Debug, Clone)]
pub struct TraversalOptions {
    pub max_depth: usize,
    pub min_strength: f64,
    /// `None` means every relation is followed.
    pub relation_types: Option<Vec<CausalRelation>>,
    pub include_inferred: bool,
    pub max_nodes: usize,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            max_depth: 5,
            min_strength: 0.0,
            relation_types: None,
            include_inferred: true,
            max_nodes: 200,
        }
    }
}

impl TraversalOptions {
    fn admits(&self, edge: &CausalEdge) -> bool {
        if edge.tombstone {
            return false;
        }
        if edge.strength < self.min_strength {
            return false;
        }
        if !self.include_inferred && edge.inferred {
            return false;
        }
        match &self.relation_types {
            Some(relations) => relations.contains(&edge.relation),
            None => true,
        }
    }
}

/// Breadth-first traversal of outgoing edges from a root memory.
pub fn traverse(
    storage: &dyn ICausalStorage,
    root_id: &str,
    options: &TraversalOptions,
) -> CortexResult<CausalChain> {
    let snapshot = load_snapshot(storage, root_id, options)?;
    Ok(walk(root_id, &snapshot, options))
}

/// Everything that would be affected if the root were removed: forward
/// traversal over the dependency-carrying relations.
pub fn counterfactual(
    storage: &dyn ICausalStorage,
    root_id: &str,
    options: &TraversalOptions,
) -> CortexResult<CausalChain> {
    let options = TraversalOptions {
        relation_types: Some(CausalRelation::COUNTERFACTUAL.to_vec()),
        ..options.clone()
    };
    traverse(storage, root_id, &options)
}

/// The in-memory snapshot: a petgraph DiGraph plus a node index.
struct Snapshot {
    graph: DiGraph<String, CausalEdge>,
    index: HashMap<String, NodeIndex>,
}

/// Load the reachable neighborhood of the root into a graph, stopping once
/// the traversal bounds cannot be exceeded anyway.
fn load_snapshot(
    storage: &dyn ICausalStorage,
    root_id: &str,
    options: &TraversalOptions,
) -> CortexResult<Snapshot> {
    let mut graph = DiGraph::new();
    let mut index: HashMap<String, NodeIndex> = HashMap::new();
    let mut loaded: HashSet<String> = HashSet::new();
    let mut frontier = VecDeque::from([(root_id.to_string(), 0usize)]);

    let root_idx = graph.add_node(root_id.to_string());
    index.insert(root_id.to_string(), root_idx);

    while let Some((current, depth)) = frontier.pop_front() {
        if depth >= options.max_depth || !loaded.insert(current.clone()) {
            continue;
        }
        if index.len() > options.max_nodes * 2 {
            break;
        }
        for edge in storage.get_edges_from(&current)? {
            if !options.admits(&edge) {
                continue;
            }
            let source_idx = *index
                .entry(edge.source_id.clone())
                .or_insert_with(|| graph.add_node(edge.source_id.clone()));
            let target_idx = *index
                .entry(edge.target_id.clone())
                .or_insert_with(|| graph.add_node(edge.target_id.clone()));
            frontier.push_back((edge.target_id.clone(), depth + 1));
            graph.add_edge(source_idx, target_idx, edge);
        }
    }

    Ok(Snapshot { graph, index })
}

/// BFS over the snapshot computing per-node path strengths, then aggregate
/// chain confidence: product of strengths along a path, max across branches.
fn walk(root_id: &str, snapshot: &Snapshot, options: &TraversalOptions) -> CausalChain {
    let mut chain = CausalChain {
        root_id: root_id.to_string(),
        nodes: Vec::new(),
        edges: Vec::new(),
        max_depth: 0,
        total_memories: 0,
        chain_confidence: 0.0,
    };

    let root_idx = match snapshot.index.get(root_id) {
        Some(idx) => *idx,
        None => return chain,
    };

    let mut visited: HashSet<NodeIndex> = HashSet::from([root_idx]);
    let mut queue = VecDeque::from([(root_idx, 0usize, 1.0f64)]);
    let mut edge_ids: HashSet<String> = HashSet::new();
    let mut has_children: HashMap<NodeIndex, bool> = HashMap::new();
    let mut node_strengths: Vec<(NodeIndex, f64)> = Vec::new();

    while let Some((current, depth, path_strength)) = queue.pop_front() {
        if depth >= options.max_depth || chain.nodes.len() >= options.max_nodes {
            continue;
        }
        for neighbor in snapshot.graph.neighbors_directed(current, Direction::Outgoing) {
            if chain.nodes.len() >= options.max_nodes {
                break;
            }
            if visited.contains(&neighbor) {
                continue;
            }
            let Some(edge_idx) = snapshot.graph.find_edge(current, neighbor) else {
                continue;
            };
            let Some(edge) = snapshot.graph.edge_weight(edge_idx) else {
                continue;
            };

            let new_depth = depth + 1;
            let new_strength = path_strength * edge.strength;
            visited.insert(neighbor);
            has_children.insert(current, true);

            chain.max_depth = chain.max_depth.max(new_depth);
            chain.nodes.push(ChainNode {
                memory_id: snapshot.graph[neighbor].clone(),
                depth: new_depth,
                path_strength: new_strength,
            });
            node_strengths.push((neighbor, new_strength));
            if edge_ids.insert(edge.id.clone()) {
                chain.edges.push(edge.clone());
            }

            queue.push_back((neighbor, new_depth, new_strength));
        }
    }

    chain.total_memories = chain.nodes.len();
    // Leaves of the traversal tree carry the complete path products.
    chain.chain_confidence = node_strengths
        .iter()
        .filter(|(idx, _)| !has_children.get(idx).copied().unwrap_or(false))
        .map(|(_, strength)| *strength)
        .fold(0.0, f64::max);
    chain
}
