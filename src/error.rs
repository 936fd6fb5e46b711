use crate::ast::Value;
use crate::machine::NodeId;
use thiserror::Error;

/// Errors raised while abstractly executing a protocol graph.
///
/// All of them are fatal for the simulation run: the graph handed over by the
/// protocol translator is inconsistent with the execution model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Protocol node {0} does not exist")]
    NodeNotFound(usize),

    #[error("Control node {node_id} has no {what} registered in the logic blocks")]
    MissingControlMetadata { node_id: usize, what: String },

    #[error("Variable '{0}' is not defined in the variable table")]
    UnknownVariable(String),

    #[error(
        "Type mismatch during operation '{operation}': expected {expected}, but found value '{found}'"
    )]
    TypeMismatch {
        operation: String,
        expected: String,
        found: Value,
    },

    #[error("Guard on edge {source_node} -> {target_node} cannot be resolved: {reason}")]
    UnresolvableGuard {
        source_node: usize,
        target_node: usize,
        reason: String,
    },

    #[error("Flow operation on node {node_id} needs at least two containers, got {found}")]
    ShortFlowPath { node_id: usize, found: usize },

    #[error("Simulation exceeded {0} executed nodes; the protocol does not terminate")]
    StepLimitExceeded(usize),
}

/// Contract violations while building a `MachineGraph`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Machine node {0} does not exist")]
    NodeNotFound(NodeId),

    #[error("Node {node} has {ports} ports, port {port} is out of range")]
    PortOutOfRange { node: NodeId, port: u16, ports: u16 },

    #[error("Port {port} of node {node} is already connected")]
    PortInUse { node: NodeId, port: u16 },

    #[error("Node {0} cannot be connected to itself")]
    SelfLoop(NodeId),

    #[error("Capabilities can only be attached to containers, node {0} is not one")]
    NotAContainer(NodeId),

    #[error("Truth table of a {ports}-port valve references port {port}")]
    InvalidTruthTable { ports: u16, port: u16 },

    #[error("Invalid machine definition: {0}")]
    Definition(String),
}

/// Errors surfaced by the mapping orchestrator.
///
/// An infeasible assignment is *not* an error: it is reported through
/// `SearchOutcome::Infeasible`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("No relation has been found yet, call find_relation first")]
    NoRelation,

    #[error("Logical container '{0}' is not part of the relation table")]
    NotFound(String),
}
