//! Abstract execution of a protocol graph.
//!
//! The simulator walks the graph with a LIFO worklist, evaluating assignments
//! and guards against a [`VariableTable`] and forwarding actuator operations to
//! an [`ActuatorExecutor`]. Conditional branches are explored one after the
//! other by restoring [`Snapshot`]s, and the longest running branch becomes
//! the state execution continues from.

mod control;
mod run;
pub mod snapshot;

pub use snapshot::Snapshot;

use crate::config::SimulationConfig;
use crate::error::ProtocolError;
use crate::flow::{LedgerState, Rate};
use crate::protocol::{FunctionUse, Protocol, VariableTable};
use run::Run;

/// Receives the effects of actuator operations during a simulation run.
pub trait ActuatorExecutor {
    /// Flow along `path` from `start`, until `until` or until stopped.
    fn continuous_flow(&mut self, path: &[String], rate: Rate, start: f64, until: Option<f64>);

    fn stop_flow(&mut self, path: &[String], at_time: f64);

    /// A container is asked to perform a function.
    fn use_function(&mut self, usage: &FunctionUse<'_>);

    fn flow_state(&self) -> LedgerState;

    fn restore_flow_state(&mut self, state: LedgerState);

    /// Commits every flow configuration reached before `upto`.
    fn settle(&mut self, upto: f64);

    /// Commits everything still pending, called once at the end of a run.
    fn flush(&mut self);
}

/// Drives a [`Protocol`] through an [`ActuatorExecutor`].
#[derive(Debug, Clone)]
pub struct FlowSimulator {
    protocol: Protocol,
    config: SimulationConfig,
}

impl FlowSimulator {
    pub fn new(protocol: Protocol) -> Self {
        Self {
            protocol,
            config: SimulationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Runs the protocol to completion and returns the final variable table.
    pub fn simulate(
        &self,
        executor: &mut dyn ActuatorExecutor,
    ) -> Result<VariableTable, ProtocolError> {
        log::info!(
            "Simulating protocol with {} nodes",
            self.protocol.graph.len()
        );
        let mut run = Run::new(&self.protocol, &self.config, executor);
        run.execute()?;
        log::info!("Simulation finished after {} steps", run.steps);
        Ok(run.variables)
    }
}
