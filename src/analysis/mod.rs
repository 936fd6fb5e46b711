//! Container characteristics extraction.
//!
//! Simulating a protocol through a [`CharacteristicsExecutor`] yields one
//! [`LogicalContainer`] per container name and the [`FlowSchedule`] the
//! machine will have to realize.

pub mod characteristics;
pub mod executor;

pub use characteristics::LogicalContainer;
pub use executor::CharacteristicsExecutor;

use crate::error::ProtocolError;
use crate::flow::FlowSchedule;
use crate::simulator::FlowSimulator;

/// Everything the assignment search needs to know about a protocol.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisReport {
    pub containers: Vec<LogicalContainer>,
    pub schedule: FlowSchedule,
}

impl AnalysisReport {
    pub fn container(&self, name: &str) -> Option<&LogicalContainer> {
        self.containers.iter().find(|c| c.name() == name)
    }
}

/// Source of protocol requirements for the mapping orchestrator.
pub trait ProtocolSimulator {
    fn analyse(&mut self) -> Result<AnalysisReport, ProtocolError>;
}

impl ProtocolSimulator for FlowSimulator {
    fn analyse(&mut self) -> Result<AnalysisReport, ProtocolError> {
        let mut executor = CharacteristicsExecutor::new();
        self.simulate(&mut executor)?;
        let report = executor.into_report();
        log::info!(
            "Protocol analysis found {} containers and {} time windows",
            report.containers.len(),
            report.schedule.len()
        );
        Ok(report)
    }
}
