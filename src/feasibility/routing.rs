use super::FeasibilityBackend;
use crate::flow::{Rate, TimeWindow};
use crate::machine::node::merge_groups;
use crate::machine::{
    Attachment, ContainerClass, MachineGraph, NodeId, PhysicalNode, PumpDirection, TruthTable,
};
use crate::search::RelationTable;
use ahash::{AHashMap, AHashSet};
use std::collections::BTreeSet;

/// Node crossed by a route between two mapped containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hop {
    Valve { node: NodeId, entry: u16, exit: u16 },
    Pump { node: NodeId, entry: u16, exit: u16 },
    /// An unassigned closed container the liquid passes through.
    Chamber,
}

/// Flow demand between two consecutive containers of a path.
struct Segment {
    path: usize,
    from: NodeId,
    to: NodeId,
    rate: Rate,
}

#[derive(Debug, Clone)]
struct PumpUse {
    rate: Rate,
    directions: Vec<(u16, u16)>,
}

/// Valves and pumps claimed by the routes chosen so far in one window.
#[derive(Debug, Clone, Default)]
struct Usage {
    valves: AHashMap<NodeId, Vec<(u16, u16)>>,
    pumps: AHashMap<NodeId, PumpUse>,
    /// Paths already crossing a pump.
    pumped: AHashSet<usize>,
}

fn components(pairs: &[(u16, u16)]) -> Vec<BTreeSet<u16>> {
    merge_groups(
        pairs
            .iter()
            .map(|(a, b)| BTreeSet::from([*a, *b]))
            .collect(),
    )
}

fn truth_table(graph: &MachineGraph, node: NodeId) -> Option<&TruthTable> {
    match graph.node(node) {
        Ok(PhysicalNode::Valve { table, .. }) => Some(table),
        _ => None,
    }
}

impl Usage {
    /// Claims `hop` for `segment`; fails when it conflicts with earlier claims.
    fn claim(&mut self, graph: &MachineGraph, hop: Hop, segment: &Segment) -> bool {
        match hop {
            Hop::Valve { node, entry, exit } => {
                let pairs = self.valves.entry(node).or_default();
                pairs.push((entry, exit));
                truth_table(graph, node).is_some_and(|table| table.admits(&components(pairs)))
            }
            Hop::Pump { node, entry, exit } => {
                let bidirectional = matches!(
                    graph.node(node),
                    Ok(PhysicalNode::Pump {
                        direction: PumpDirection::Bidirectional,
                        ..
                    })
                );
                let pump = self.pumps.entry(node).or_insert(PumpUse {
                    rate: segment.rate,
                    directions: Vec::new(),
                });
                if pump.rate != segment.rate {
                    return false;
                }
                if bidirectional && pump.directions.contains(&(exit, entry)) {
                    return false;
                }
                pump.directions.push((entry, exit));
                self.pumped.insert(segment.path);
                true
            }
            Hop::Chamber => true,
        }
    }

    /// Every used valve must sit in a configuration connecting exactly the
    /// ports in use.
    fn valves_exact(&self, graph: &MachineGraph) -> bool {
        self.valves.iter().all(|(node, pairs)| {
            truth_table(graph, *node)
                .is_some_and(|table| table.exact_match(&components(pairs)).is_some())
        })
    }
}

/// Feasibility by route search over the machine tubing.
///
/// Between two consecutive mapped containers a route may cross valves whose
/// truth table links the entry and exit ports, pumps accepting the rate (in
/// their fixed orientation when unidirectional) and closed containers no
/// logical container is mapped to. Every path must cross at least one pump.
///
/// Routes are walked hop by hop, claiming valves and pumps as they go, and
/// the walk backtracks over every simple route of every segment, so a window
/// is rejected only when no combination of routes fits the machine.
#[derive(Debug, Clone, Default)]
pub struct RoutingBackend;

impl RoutingBackend {
    pub fn new() -> Self {
        Self
    }
}

/// One backtracking search over the segments of a window.
struct WindowRouter<'a> {
    graph: &'a MachineGraph,
    segments: &'a [Segment],
    assigned: &'a AHashSet<NodeId>,
}

impl WindowRouter<'_> {
    /// Routes segment `index` and every one after it on top of `usage`.
    fn route_from(&self, index: usize, usage: &Usage) -> bool {
        let Some(segment) = self.segments.get(index) else {
            return usage.valves_exact(self.graph);
        };
        let mut visited = vec![segment.from];
        self.walk(index, segment.from, None, usage, &mut visited)
    }

    fn walk(
        &self,
        index: usize,
        current: NodeId,
        arrival: Option<&Attachment>,
        usage: &Usage,
        visited: &mut Vec<NodeId>,
    ) -> bool {
        let segment = &self.segments[index];
        for attachment in self.graph.attachments(current) {
            if arrival.is_some_and(|a| a.edge == attachment.edge) {
                continue;
            }

            let mut next = usage.clone();
            if let Some(arrival) = arrival {
                let Some(hop) = cross(self.graph, current, arrival, attachment, segment.rate)
                else {
                    continue;
                };
                if !next.claim(self.graph, hop, segment) {
                    continue;
                }
            }

            let neighbour = attachment.neighbour;
            if neighbour == segment.to {
                if self.closes_path(index, &next) && self.route_from(index + 1, &next) {
                    return true;
                }
            } else if !visited.contains(&neighbour)
                && passable(self.graph, neighbour, self.assigned)
            {
                visited.push(neighbour);
                let routed = self.walk(index, neighbour, Some(attachment), &next, visited);
                visited.pop();
                if routed {
                    return true;
                }
            }
        }
        false
    }

    /// The last segment of a path may only complete once the path is pumped.
    fn closes_path(&self, index: usize, usage: &Usage) -> bool {
        let path = self.segments[index].path;
        let last = self
            .segments
            .get(index + 1)
            .is_none_or(|next| next.path != path);
        !last || usage.pumped.contains(&path)
    }
}

/// Hop through `node`, entered by `arrival` and left by `departure`.
fn cross(
    graph: &MachineGraph,
    node: NodeId,
    arrival: &Attachment,
    departure: &Attachment,
    rate: Rate,
) -> Option<Hop> {
    // `arrival` is seen from the previous node, `departure` from this one.
    let entry = arrival.neighbour_port;
    let exit = departure.port;
    match graph.node(node).ok()? {
        PhysicalNode::Valve { table, .. } => table.connects(entry, exit).then_some(Hop::Valve {
            node,
            entry,
            exit,
        }),
        PhysicalNode::Pump {
            direction, rates, ..
        } => {
            if !rates.contains(rate.value()) {
                return None;
            }
            let forward = !arrival.incoming && !departure.incoming;
            if *direction == PumpDirection::Unidirectional && !forward {
                return None;
            }
            Some(Hop::Pump { node, entry, exit })
        }
        PhysicalNode::Container { .. } => Some(Hop::Chamber),
    }
}

fn passable(graph: &MachineGraph, node: NodeId, assigned: &AHashSet<NodeId>) -> bool {
    match graph.node(node) {
        Ok(PhysicalNode::Valve { .. }) | Ok(PhysicalNode::Pump { .. }) => true,
        Ok(PhysicalNode::Container { class, .. }) => {
            *class == ContainerClass::Closed && !assigned.contains(&node)
        }
        Err(_) => false,
    }
}

impl FeasibilityBackend for RoutingBackend {
    fn check_window(
        &self,
        graph: &MachineGraph,
        relation: &RelationTable,
        window: &TimeWindow,
    ) -> bool {
        let mut segments = Vec::new();
        for (p, path) in window.paths().iter().enumerate() {
            let nodes: Option<Vec<NodeId>> =
                path.containers().iter().map(|n| relation.get(n)).collect();
            let Some(nodes) = nodes else {
                continue;
            };
            for pair in nodes.windows(2) {
                segments.push(Segment {
                    path: p,
                    from: pair[0],
                    to: pair[1],
                    rate: path.rate(),
                });
            }
        }
        if segments.is_empty() {
            return true;
        }

        let assigned: AHashSet<NodeId> = relation.nodes().collect();
        let router = WindowRouter {
            graph,
            segments: &segments,
            assigned: &assigned,
        };
        let feasible = router.route_from(0, &Usage::default());
        log::trace!("window {} under {}: {}", window, relation, feasible);
        feasible
    }
}
