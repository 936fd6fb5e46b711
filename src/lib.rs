//! # fluidmap - Protocol to Machine Mapping Engine
//!
//! **fluidmap** decides where the containers of a liquid-handling protocol live
//! on a concrete fluidic machine. A protocol names logical containers and moves
//! liquid between them; a machine is a graph of physical containers, valves and
//! pumps. The engine finds an injective assignment of the former to the latter
//! such that every flow the protocol needs can actually be routed.
//!
//! ## Core Workflow
//!
//! 1.  **Describe the protocol**: Lower structured [`protocol::Statement`]s into a
//!     guarded control-flow graph with [`protocol::ProtocolBuilder`].
//! 2.  **Describe the machine**: Build a [`machine::MachineGraph`] directly, or
//!     deserialize a [`machine::MachineDefinition`] and convert it through the
//!     [`machine::IntoMachineGraph`] trait.
//! 3.  **Analyse**: A [`simulator::FlowSimulator`] walks every branch of the protocol
//!     and reports per-container requirements plus the time-ordered flow schedule.
//! 4.  **Map**: [`mapping::FluidicModelMapping`] runs an A* search over partial
//!     assignments, pruning the ones whose flows cannot be routed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fluidmap::prelude::*;
//!
//! fn main() -> Result<()> {
//!     // media -> pump -> cell -> waste
//!     let mut graph = MachineGraph::new();
//!     let media = graph.add_container(1, ContainerClass::Open, 100.0);
//!     let cell = graph.add_container(2, ContainerClass::Closed, 50.0);
//!     let waste = graph.add_container(1, ContainerClass::Open, 100.0);
//!     let pump = graph.add_pump(2, PumpDirection::Unidirectional, Bounds::new(0.0, 1000.0));
//!     graph.connect_nodes(media, pump, 0, 0)?;
//!     graph.connect_nodes(pump, cell, 1, 0)?;
//!     graph.connect_nodes(cell, waste, 1, 0)?;
//!
//!     let protocol = ProtocolBuilder::new().build(&[Statement::flow(
//!         &["media", "cell", "waste"],
//!         300.0,
//!         Timing::at(0.0, 30.0),
//!     )])?;
//!     let mut simulator = FlowSimulator::new(protocol);
//!
//!     let mut mapping = FluidicModelMapping::new(graph);
//!     match mapping.find_relation(&mut simulator)? {
//!         SearchOutcome::Found(relation) => println!("Mapped: {}", relation),
//!         SearchOutcome::Infeasible { message } => println!("No mapping: {}", message),
//!     }
//!     println!("cell lives on node {}", mapping.get_mapped_component("cell")?);
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod ast;
pub mod config;
pub mod error;
pub mod feasibility;
pub mod flow;
pub mod machine;
pub mod mapping;
pub mod prelude;
pub mod protocol;
pub mod search;
pub mod simulator;
