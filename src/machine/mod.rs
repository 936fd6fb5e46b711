pub mod capability;
pub mod definition;
pub mod graph;
pub mod node;

pub use capability::{Bounds, Capability, Dimension, Function, FunctionSet, WorkingRange};
pub use definition::{EdgeDefinition, IntoMachineGraph, MachineDefinition, NodeDefinition};
pub use graph::{Attachment, MachineEdge, MachineGraph};
pub use node::{ConfigurationId, ContainerClass, NodeId, PhysicalNode, PumpDirection, TruthTable};
