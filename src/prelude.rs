//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the fluidmap crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use fluidmap::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let definition: MachineDefinition =
//!     serde_json::from_str(&std::fs::read_to_string("path/to/machine.json")?)?;
//! let graph = definition.into_machine_graph()?;
//!
//! let protocol = ProtocolBuilder::new().build(&[])?;
//! let mut mapping = FluidicModelMapping::new(graph);
//! let outcome = mapping.find_relation(&mut FlowSimulator::new(protocol))?;
//! println!("{}", outcome);
//! # Ok(())
//! # }
//! ```

// Protocol side
pub use crate::ast::{Expression, Value};
pub use crate::protocol::{Operation, Protocol, ProtocolBuilder, Statement, Timing};
pub use crate::simulator::FlowSimulator;

// Analysis results
pub use crate::analysis::{AnalysisReport, LogicalContainer, ProtocolSimulator};
pub use crate::flow::{FlowPath, FlowSchedule, Rate, TimeWindow};

// Machine side
pub use crate::machine::{
    Bounds, Capability, ContainerClass, Dimension, Function, IntoMachineGraph, MachineDefinition,
    MachineGraph, NodeId, PumpDirection, TruthTable,
};

// Mapping
pub use crate::config::{SearchConfig, SimulationConfig};
pub use crate::feasibility::{FeasibilityBackend, RoutingBackend};
pub use crate::mapping::FluidicModelMapping;
pub use crate::search::{RelationTable, SearchOutcome};

// Error types
pub use crate::error::{GraphError, MappingError, ProtocolError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
