use super::RelationTable;
use crate::analysis::LogicalContainer;
use crate::machine::{MachineGraph, NodeId, PhysicalNode};

/// Whether `node` can host `container`: same class, enough ports, a superset
/// of the required functions and working ranges covering the required ones.
pub fn accepts(node: &PhysicalNode, container: &LogicalContainer) -> bool {
    let PhysicalNode::Container {
        ports,
        class,
        capabilities,
        ..
    } = node
    else {
        return false;
    };
    if *class != container.class() || *ports < container.minimum_ports() {
        return false;
    }
    if !node.functions().is_superset(&container.functions()) {
        return false;
    }
    container.working_ranges().iter().all(|(function, needed)| {
        capabilities
            .iter()
            .any(|c| c.function == *function && c.range.covers(needed))
    })
}

/// Lower bound on the cost of completing a partial assignment.
///
/// Each unassigned container adds `d / (d + 1)`, where `d` is the hop
/// distance from the nodes of its already placed neighbours to the nearest
/// unused node able to host it. That is always below the unit cost of the
/// assignment still to be made, so the estimate never overestimates.
/// Containers with no placed neighbour add nothing; a container no unused
/// node can host makes the state a dead end.
#[derive(Debug)]
pub struct TopologyHeuristic<'a> {
    graph: &'a MachineGraph,
    candidates: Vec<Vec<NodeId>>,
}

impl<'a> TopologyHeuristic<'a> {
    /// `containers` must be in search order; candidates are computed once.
    pub fn new(graph: &'a MachineGraph, containers: &[LogicalContainer]) -> Self {
        let candidates = containers
            .iter()
            .map(|container| {
                graph
                    .containers()
                    .filter(|(_, node)| accepts(node, container))
                    .map(|(id, _)| id)
                    .collect()
            })
            .collect();
        Self { graph, candidates }
    }

    /// Nodes able to host the container at `index`, ignoring usage.
    pub fn candidates(&self, index: usize) -> &[NodeId] {
        self.candidates.get(index).map_or(&[], Vec::as_slice)
    }

    pub fn estimate(&self, relation: &RelationTable, containers: &[LogicalContainer]) -> f64 {
        let mut total = 0.0;
        for (index, container) in containers.iter().enumerate() {
            if relation.get(container.name()).is_some() {
                continue;
            }
            let free: Vec<NodeId> = self
                .candidates(index)
                .iter()
                .copied()
                .filter(|n| !relation.contains_node(*n))
                .collect();
            if free.is_empty() {
                return f64::INFINITY;
            }

            let placed: Vec<NodeId> = container
                .neighbours()
                .filter_map(|name| relation.get(name))
                .collect();
            if placed.is_empty() {
                continue;
            }
            let distances = self.graph.hop_distances(&placed);
            let nearest = free.iter().filter_map(|n| distances[*n]).min();
            match nearest {
                Some(d) => total += d as f64 / (d as f64 + 1.0),
                None => return f64::INFINITY,
            }
        }
        total
    }
}
