use std::collections::{HashMap, VecDeque};

use tracing::debug;

use flowdeck_core::types::NodeId;

use crate::canvas::Edge;
use crate::node::NodeInstance;

/// Compute the run order for a node set.
///
/// Kahn's algorithm over the edge set, seeded with in-degree-zero nodes in
/// creation order. If the produced order does not cover every node (a cycle
/// slipped in), the partial order is discarded and plain creation order is
/// returned, so a malformed graph still runs, just without ordering guarantees.
pub fn execution_order(nodes: &[NodeInstance], edges: &[Edge]) -> Vec<NodeId> {
    let mut in_degree: HashMap<NodeId, usize> =
        nodes.iter().map(|n| (n.id, 0)).collect();
    let mut out_neighbors: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

    for edge in edges {
        if let Some(deg) = in_degree.get_mut(&edge.to) {
            *deg += 1;
        }
        out_neighbors.entry(edge.from).or_default().push(edge.to);
    }

    // Seed with roots in creation order (the node slice is creation order).
    let mut queue: VecDeque<NodeId> = nodes
        .iter()
        .filter(|n| in_degree.get(&n.id) == Some(&0))
        .map(|n| n.id)
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(id) = queue.pop_front() {
        order.push(id);
        if let Some(neighbors) = out_neighbors.get(&id) {
            for &next in neighbors {
                if let Some(deg) = in_degree.get_mut(&next) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(next);
                    }
                }
            }
        }
    }

    if order.len() != nodes.len() {
        debug!(
            ordered = order.len(),
            total = nodes.len(),
            "Topological order incomplete, falling back to creation order"
        );
        return nodes.iter().map(|n| n.id).collect();
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NodeKind;
    use flowdeck_core::types::WorldPoint;

    fn node(id: u64) -> NodeInstance {
        NodeInstance::new(
            NodeId(id),
            NodeKind::Compute,
            format!("Compute {id}"),
            WorldPoint::new(0.0, 0.0),
        )
    }

    fn edge(from: u64, to: u64) -> Edge {
        Edge {
            from: NodeId(from),
            to: NodeId(to),
        }
    }

    #[test]
    fn test_chain_is_ordered() {
        let nodes = vec![node(1), node(2), node(3)];
        let edges = vec![edge(1, 2), edge(2, 3)];
        assert_eq!(
            execution_order(&nodes, &edges),
            vec![NodeId(1), NodeId(2), NodeId(3)]
        );
    }

    #[test]
    fn test_predecessors_come_first_in_diamond() {
        // 1 -> 2, 1 -> 3, 2 -> 4, 3 -> 4
        let nodes = vec![node(1), node(2), node(3), node(4)];
        let edges = vec![edge(1, 2), edge(1, 3), edge(2, 4), edge(3, 4)];
        let order = execution_order(&nodes, &edges);

        let pos = |id: u64| order.iter().position(|n| *n == NodeId(id)).unwrap();
        assert_eq!(order.len(), 4);
        for (from, to) in [(1, 2), (1, 3), (2, 4), (3, 4)] {
            assert!(pos(from) < pos(to), "{from} must run before {to}");
        }
    }

    #[test]
    fn test_roots_seed_in_creation_order() {
        let nodes = vec![node(5), node(2), node(9)];
        let order = execution_order(&nodes, &[]);
        assert_eq!(order, vec![NodeId(5), NodeId(2), NodeId(9)]);
    }

    #[test]
    fn test_cycle_falls_back_to_creation_order() {
        let nodes = vec![node(1), node(2), node(3)];
        let edges = vec![edge(1, 2), edge(2, 1)];
        let order = execution_order(&nodes, &edges);
        assert_eq!(order, vec![NodeId(1), NodeId(2), NodeId(3)]);
        assert_eq!(order.len(), nodes.len());
    }

    #[test]
    fn test_disconnected_components_all_covered() {
        let nodes = vec![node(1), node(2), node(3), node(4)];
        let edges = vec![edge(1, 2), edge(3, 4)];
        let order = execution_order(&nodes, &edges);
        assert_eq!(order.len(), 4);
        let pos = |id: u64| order.iter().position(|n| *n == NodeId(id)).unwrap();
        assert!(pos(1) < pos(2));
        assert!(pos(3) < pos(4));
    }

    #[test]
    fn test_empty_graph() {
        assert!(execution_order(&[], &[]).is_empty());
    }
}
