//! The protocol side of the mapping: a guarded control-flow graph, its
//! variables and the metadata of its `if`/`while` blocks.

pub mod blocks;
pub mod builder;
pub mod graph;
pub mod operation;
pub mod variables;

pub use blocks::{IfBlock, LogicBlock, LogicBlocks, WhileBlock};
pub use builder::{Branch, Protocol, ProtocolBuilder, Statement};
pub use graph::{
    Assignment, ControlNode, NodeKind, ProtocolEdge, ProtocolGraph, ProtocolNode, ProtocolNodeId,
};
pub use operation::{FunctionUse, Operation, Timing};
pub use variables::{TIME_VARIABLE, Variable, VariableTable};
