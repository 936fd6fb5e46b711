use super::graph::MachineGraph;
use super::node::{NodeId, PhysicalNode};
use crate::error::GraphError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Serializable description of a machine, nodes referenced by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineDefinition {
    pub nodes: Vec<NodeDefinition>,
    #[serde(default)]
    pub edges: Vec<EdgeDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub name: String,
    #[serde(flatten)]
    pub node: PhysicalNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDefinition {
    pub source: String,
    pub source_port: u16,
    pub target: String,
    pub target_port: u16,
}

impl MachineDefinition {
    /// Node names indexed by the id they receive in the built graph.
    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name.as_str()).collect()
    }
}

/// Conversion of a user machine format into a [`MachineGraph`].
///
/// Implement it on your own structs to feed machines described in other
/// formats to the mapper; [`MachineDefinition`] is the built-in one.
pub trait IntoMachineGraph {
    fn into_machine_graph(self) -> Result<MachineGraph, GraphError>;
}

impl IntoMachineGraph for MachineDefinition {
    fn into_machine_graph(self) -> Result<MachineGraph, GraphError> {
        let mut graph = MachineGraph::new();
        let mut ids: AHashMap<String, NodeId> = AHashMap::new();

        for definition in self.nodes {
            if ids.contains_key(&definition.name) {
                return Err(GraphError::Definition(format!(
                    "duplicated node name '{}'",
                    definition.name
                )));
            }
            let id = match definition.node {
                PhysicalNode::Container {
                    ports,
                    class,
                    capacity,
                    capabilities,
                } => {
                    let id = graph.add_container(ports, class, capacity);
                    for capability in capabilities {
                        graph.add_capability(id, capability)?;
                    }
                    id
                }
                PhysicalNode::Valve { ports, table } => graph.add_valve(ports, table)?,
                PhysicalNode::Pump {
                    ports,
                    direction,
                    rates,
                } => graph.add_pump(ports, direction, rates),
            };
            ids.insert(definition.name, id);
        }

        let lookup = |name: &str| {
            ids.get(name)
                .copied()
                .ok_or_else(|| GraphError::Definition(format!("edge references unknown node '{}'", name)))
        };
        for edge in &self.edges {
            let source = lookup(&edge.source)?;
            let target = lookup(&edge.target)?;
            graph.connect_nodes(source, target, edge.source_port, edge.target_port)?;
        }

        log::debug!(
            "Built machine graph with {} nodes and {} edges",
            graph.len(),
            graph.edges().len()
        );
        Ok(graph)
    }
}
