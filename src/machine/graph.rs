use super::capability::{Bounds, Capability};
use super::node::{ContainerClass, NodeId, PhysicalNode, PumpDirection, TruthTable};
use crate::error::GraphError;
use ahash::AHashMap;
use std::collections::VecDeque;

/// Directed tube between two node ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MachineEdge {
    pub source: NodeId,
    pub source_port: u16,
    pub target: NodeId,
    pub target_port: u16,
}

/// One end of an edge seen from a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    pub edge: usize,
    /// Port of the node the attachment was requested for.
    pub port: u16,
    pub neighbour: NodeId,
    pub neighbour_port: u16,
    /// True when the edge points into the node.
    pub incoming: bool,
}

/// Physical topology: containers, valves and pumps joined port to port.
///
/// Node ids are dense indices handed out by the `add_*` methods and are never
/// reused.
#[derive(Debug, Clone, Default)]
pub struct MachineGraph {
    nodes: Vec<PhysicalNode>,
    edges: Vec<MachineEdge>,
    attachments: Vec<Vec<Attachment>>,
    used_ports: AHashMap<(NodeId, u16), usize>,
}

impl MachineGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_node(&mut self, node: PhysicalNode) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        self.attachments.push(Vec::new());
        id
    }

    pub fn add_container(&mut self, ports: u16, class: ContainerClass, capacity: f64) -> NodeId {
        self.push_node(PhysicalNode::Container {
            ports,
            class,
            capacity,
            capabilities: Vec::new(),
        })
    }

    pub fn add_capability(
        &mut self,
        node: NodeId,
        capability: Capability,
    ) -> Result<(), GraphError> {
        match self.nodes.get_mut(node) {
            Some(PhysicalNode::Container { capabilities, .. }) => {
                capabilities.push(capability);
                Ok(())
            }
            Some(_) => Err(GraphError::NotAContainer(node)),
            None => Err(GraphError::NodeNotFound(node)),
        }
    }

    pub fn add_pump(&mut self, ports: u16, direction: PumpDirection, rates: Bounds) -> NodeId {
        self.push_node(PhysicalNode::Pump {
            ports,
            direction,
            rates,
        })
    }

    pub fn add_valve(&mut self, ports: u16, table: TruthTable) -> Result<NodeId, GraphError> {
        table.validate(ports)?;
        Ok(self.push_node(PhysicalNode::Valve { ports, table }))
    }

    /// Connects `source:source_port -> target:target_port`.
    pub fn connect_nodes(
        &mut self,
        source: NodeId,
        target: NodeId,
        source_port: u16,
        target_port: u16,
    ) -> Result<(), GraphError> {
        if source == target {
            return Err(GraphError::SelfLoop(source));
        }
        self.check_port(source, source_port)?;
        self.check_port(target, target_port)?;

        let edge = self.edges.len();
        self.edges.push(MachineEdge {
            source,
            source_port,
            target,
            target_port,
        });
        self.used_ports.insert((source, source_port), edge);
        self.used_ports.insert((target, target_port), edge);
        self.attachments[source].push(Attachment {
            edge,
            port: source_port,
            neighbour: target,
            neighbour_port: target_port,
            incoming: false,
        });
        self.attachments[target].push(Attachment {
            edge,
            port: target_port,
            neighbour: source,
            neighbour_port: source_port,
            incoming: true,
        });
        Ok(())
    }

    fn check_port(&self, node: NodeId, port: u16) -> Result<(), GraphError> {
        let ports = self.node(node)?.ports();
        if port >= ports {
            return Err(GraphError::PortOutOfRange { node, port, ports });
        }
        if self.used_ports.contains_key(&(node, port)) {
            return Err(GraphError::PortInUse { node, port });
        }
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Result<&PhysicalNode, GraphError> {
        self.nodes.get(id).ok_or(GraphError::NodeNotFound(id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &PhysicalNode)> {
        self.nodes.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edges(&self) -> &[MachineEdge] {
        &self.edges
    }

    /// Tubes touching `node`, in connection order.
    pub fn attachments(&self, node: NodeId) -> &[Attachment] {
        self.attachments.get(node).map_or(&[], Vec::as_slice)
    }

    pub fn containers(&self) -> impl Iterator<Item = (NodeId, &PhysicalNode)> {
        self.nodes().filter(|(_, n)| n.is_container())
    }

    /// Hop distance from any of `sources` to every node, ignoring edge
    /// direction. Unreachable nodes are `None`.
    pub fn hop_distances(&self, sources: &[NodeId]) -> Vec<Option<usize>> {
        let mut distances = vec![None; self.nodes.len()];
        let mut queue = VecDeque::new();
        for &source in sources {
            if source < distances.len() && distances[source].is_none() {
                distances[source] = Some(0);
                queue.push_back(source);
            }
        }
        while let Some(current) = queue.pop_front() {
            let next = distances[current].map_or(0, |d| d + 1);
            for attachment in self.attachments(current) {
                if distances[attachment.neighbour].is_none() {
                    distances[attachment.neighbour] = Some(next);
                    queue.push_back(attachment.neighbour);
                }
            }
        }
        distances
    }
}
