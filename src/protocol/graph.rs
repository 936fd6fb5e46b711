use super::operation::Operation;
use crate::ast::Expression;
use crate::error::ProtocolError;
use std::collections::BTreeSet;
use std::fmt;

pub type ProtocolNodeId = usize;

/// `variable = value`, run by a computation node.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub variable: String,
    pub value: Expression,
}

impl Assignment {
    pub fn new(variable: &str, value: Expression) -> Self {
        Self {
            variable: variable.to_string(),
            value,
        }
    }
}

/// Control node payload. Block starts hand control over to `exit_targets`;
/// plain junctions follow their guarded edges.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControlNode {
    pub exit_targets: Vec<ProtocolNodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Computation(Assignment),
    Actuator(Operation),
    Control(ControlNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolNode {
    pub id: ProtocolNodeId,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolEdge {
    pub target: ProtocolNodeId,
    pub guard: Option<Expression>,
}

/// Control-flow graph of a protocol.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProtocolGraph {
    nodes: Vec<ProtocolNode>,
    edges: Vec<Vec<ProtocolEdge>>,
    start: ProtocolNodeId,
}

impl ProtocolGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, kind: NodeKind) -> ProtocolNodeId {
        let id = self.nodes.len();
        self.nodes.push(ProtocolNode { id, kind });
        self.edges.push(Vec::new());
        id
    }

    pub fn add_edge(
        &mut self,
        source: ProtocolNodeId,
        target: ProtocolNodeId,
        guard: Option<Expression>,
    ) -> Result<(), ProtocolError> {
        self.node(target)?;
        let edges = self
            .edges
            .get_mut(source)
            .ok_or(ProtocolError::NodeNotFound(source))?;
        edges.push(ProtocolEdge { target, guard });
        Ok(())
    }

    pub fn set_exit_targets(
        &mut self,
        node: ProtocolNodeId,
        targets: Vec<ProtocolNodeId>,
    ) -> Result<(), ProtocolError> {
        match self.nodes.get_mut(node).map(|n| &mut n.kind) {
            Some(NodeKind::Control(control)) => {
                control.exit_targets = targets;
                Ok(())
            }
            Some(_) => Err(ProtocolError::MissingControlMetadata {
                node_id: node,
                what: "control payload".to_string(),
            }),
            None => Err(ProtocolError::NodeNotFound(node)),
        }
    }

    pub fn set_start(&mut self, start: ProtocolNodeId) -> Result<(), ProtocolError> {
        self.node(start)?;
        self.start = start;
        Ok(())
    }

    pub fn start(&self) -> ProtocolNodeId {
        self.start
    }

    pub fn node(&self, id: ProtocolNodeId) -> Result<&ProtocolNode, ProtocolError> {
        self.nodes.get(id).ok_or(ProtocolError::NodeNotFound(id))
    }

    pub fn nodes(&self) -> &[ProtocolNode] {
        &self.nodes
    }

    pub fn successors(&self, id: ProtocolNodeId) -> &[ProtocolEdge] {
        self.edges.get(id).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every variable read or written anywhere in the graph.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for node in &self.nodes {
            match &node.kind {
                NodeKind::Computation(assignment) => {
                    names.insert(assignment.variable.clone());
                    assignment.value.collect_variables(&mut names);
                }
                NodeKind::Actuator(operation) => {
                    if let Operation::ContinuousFlow { rate, .. } = operation {
                        rate.collect_variables(&mut names);
                    }
                    if let Some(target) = operation.measurement_target() {
                        names.insert(target.to_string());
                    }
                }
                NodeKind::Control(_) => {}
            }
        }
        for guard in self.edges.iter().flatten().filter_map(|e| e.guard.as_ref()) {
            guard.collect_variables(&mut names);
        }
        names
    }
}

impl fmt::Display for ProtocolGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            match &node.kind {
                NodeKind::Computation(a) => writeln!(f, "{}: {} = {}", node.id, a.variable, a.value)?,
                NodeKind::Actuator(op) => writeln!(f, "{}: {}", node.id, op)?,
                NodeKind::Control(c) => writeln!(f, "{}: control exits {:?}", node.id, c.exit_targets)?,
            }
            for edge in self.successors(node.id) {
                match &edge.guard {
                    Some(guard) => writeln!(f, "    -> {} if {}", edge.target, guard)?,
                    None => writeln!(f, "    -> {}", edge.target)?,
                }
            }
        }
        Ok(())
    }
}
